//! Score combination and tier classification.
//!
//! `final = clamp(w_a * anomaly + w_r * rules, 0, 1)`, then a pure
//! threshold mapping into the ordered tier set. Identical inputs
//! always produce an identical verdict.

use crate::{
    config::EngineConfig,
    error::ScoreResult,
    rules::RuleOutcome,
    transaction::{RiskTier, RiskVerdict},
    types::TransactionId,
};

/// Factor appended when the anomaly signal alone lifts the tier above
/// Low — the verdict invariant requires at least one factor then.
const ANOMALY_FACTOR: &str = "anomalous pattern relative to account history";

pub struct ScoreCombiner {
    config: EngineConfig,
}

impl ScoreCombiner {
    /// Validates the blend weights and tier thresholds up front.
    pub fn new(config: EngineConfig) -> ScoreResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Tier is a pure function of the final score.
    pub fn tier_for(&self, score: f64) -> RiskTier {
        if score >= self.config.high_risk_threshold {
            RiskTier::Critical
        } else if score >= self.config.fraud_threshold {
            RiskTier::High
        } else if score >= self.config.medium_risk_threshold {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub fn combine(
        &self,
        transaction_id: &TransactionId,
        anomaly_score: f64,
        confidence: f64,
        rules: RuleOutcome,
    ) -> RiskVerdict {
        let final_score = (self.config.weight_anomaly * anomaly_score
            + self.config.weight_rule * rules.score)
            .clamp(0.0, 1.0);
        let tier = self.tier_for(final_score);

        // Rule factors pass through verbatim; the anomaly component
        // contributes magnitude only, except when it is the sole
        // reason the tier left Low.
        let mut factors = rules.factors;
        if tier != RiskTier::Low && factors.is_empty() {
            factors.push(ANOMALY_FACTOR.to_string());
        }

        RiskVerdict {
            transaction_id: transaction_id.clone(),
            final_score,
            tier,
            factors,
            anomaly_score,
            rule_score: rules.score,
            confidence,
        }
    }
}
