//! The risk engine: the engine's only boundary is this call contract.
//!
//! `score` is a pure, synchronous computation once the feature vector
//! and the fitted model snapshot are in hand; any number of threads
//! may score concurrently. `refit` is the single long-running
//! operation and runs off the scoring path — a stale model during a
//! refit is acceptable, a torn one is not.

use crate::{
    combiner::ScoreCombiner,
    config::EngineConfig,
    error::ScoreResult,
    features::{FeatureExtractor, FeatureVector, FEATURE_COUNT},
    model::ModelManager,
    rules::RuleEngine,
    transaction::{AccountContext, ModelStats, RefitOutcome, RiskTier, RiskVerdict, Transaction},
};

pub struct RiskEngine {
    extractor: FeatureExtractor,
    rules: RuleEngine,
    combiner: ScoreCombiner,
    model: ModelManager,
}

impl RiskEngine {
    /// Build an engine from a validated config. Fails with
    /// `InvalidConfig` on any bad combination.
    pub fn new(config: EngineConfig) -> ScoreResult<Self> {
        config.validate()?;
        Ok(Self {
            extractor: FeatureExtractor::new(config.clone())?,
            rules: RuleEngine::new(config.clone()),
            combiner: ScoreCombiner::new(config.clone())?,
            model: ModelManager::new(config),
        })
    }

    /// The sole synchronous scoring entry point.
    pub fn score(
        &self,
        txn: &Transaction,
        ctx: &AccountContext,
    ) -> ScoreResult<RiskVerdict> {
        let features = self.extractor.extract(txn, ctx)?;
        let (anomaly_score, confidence) = self.model.anomaly_score(&features)?;
        let rules = self.rules.evaluate(txn, ctx, &features);
        let verdict = self
            .combiner
            .combine(&txn.transaction_id, anomaly_score, confidence, rules);

        match verdict.tier {
            RiskTier::High | RiskTier::Critical => log::warn!(
                "txn={} scored {:.3} ({}): {:?}",
                verdict.transaction_id,
                verdict.final_score,
                verdict.tier.as_str(),
                verdict.factors
            ),
            _ => log::debug!(
                "txn={} scored {:.3} ({})",
                verdict.transaction_id,
                verdict.final_score,
                verdict.tier.as_str()
            ),
        }
        Ok(verdict)
    }

    /// Feature extraction only — used by callers that accumulate
    /// history for later refits.
    pub fn extract_features(
        &self,
        txn: &Transaction,
        ctx: &AccountContext,
    ) -> ScoreResult<FeatureVector> {
        self.extractor.extract(txn, ctx)
    }

    /// Rebuild the anomaly model from historical feature vectors.
    /// Invoked by an external scheduler, never during scoring.
    pub fn refit(&self, samples: &[[f64; FEATURE_COUNT]]) -> ScoreResult<RefitOutcome> {
        self.model.refit(samples)
    }

    /// Read-only introspection for health/monitoring collaborators.
    pub fn model_stats(&self) -> ModelStats {
        self.model.stats()
    }
}
