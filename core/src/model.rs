//! Model lifecycle management.
//!
//! Owns the fitted state of the anomaly scorer behind a single
//! atomically replaceable handle: scoring calls clone the current
//! `Arc` snapshot and drop the lock before touching the model, so a
//! reader observes either the old forest or the new one, never a
//! partially built one. Refits build the replacement entirely off the
//! lock and are only ever triggered externally, never by a scoring
//! call.

use crate::{
    anomaly::IsolationForest,
    config::{EngineConfig, UnfitPolicy},
    error::{ScoreError, ScoreResult},
    features::{FeatureVector, FEATURE_COUNT},
    transaction::{ModelStats, RefitOutcome},
};
use std::sync::{Arc, RwLock};

/// Anomaly value reported by the neutral fallback.
const NEUTRAL_ANOMALY_SCORE: f64 = 0.5;

pub struct ModelManager {
    slot: RwLock<Option<Arc<IsolationForest>>>,
    config: EngineConfig,
}

impl ModelManager {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            slot: RwLock::new(None),
            config,
        }
    }

    /// Replace the current model with one fitted on `samples`.
    ///
    /// The new forest is fully built before the swap; the write lock
    /// is held only for the pointer update. Fails with
    /// `InsufficientData` below the configured minimum, leaving the
    /// prior model (or the fallback) in effect.
    pub fn refit(&self, samples: &[[f64; FEATURE_COUNT]]) -> ScoreResult<RefitOutcome> {
        if samples.len() < self.config.minimum_refit_samples {
            log::warn!(
                "refit rejected: {} samples below minimum {}",
                samples.len(),
                self.config.minimum_refit_samples
            );
            return Err(ScoreError::InsufficientData {
                needed: self.config.minimum_refit_samples,
                got: samples.len(),
            });
        }

        let forest = IsolationForest::fit(
            samples,
            self.config.model_trees,
            self.config.model_subsample,
            self.config.model_seed,
        );
        let outcome = RefitOutcome {
            sample_count: forest.sample_count(),
            fit_timestamp: forest.fitted_at(),
        };
        log::info!(
            "anomaly model refit: {} samples, {} trees, calibration {:?}",
            outcome.sample_count,
            forest.tree_count(),
            forest.calibration()
        );

        *self.slot.write().expect("model slot lock poisoned") = Some(Arc::new(forest));
        Ok(outcome)
    }

    /// Snapshot of the current model, if any.
    pub fn current(&self) -> Option<Arc<IsolationForest>> {
        self.slot.read().expect("model slot lock poisoned").clone()
    }

    /// Anomaly score and confidence for one feature vector.
    ///
    /// Unfit behavior follows the configured policy: the default
    /// `NeutralFallback` answers 0.5 with confidence 0.0, `Reject`
    /// surfaces `ModelNotReady`.
    pub fn anomaly_score(&self, features: &FeatureVector) -> ScoreResult<(f64, f64)> {
        match self.current() {
            Some(forest) => {
                let point = features.as_array();
                Ok((forest.score(&point), forest.confidence()))
            }
            None => match self.config.unfit_policy {
                UnfitPolicy::NeutralFallback => Ok((NEUTRAL_ANOMALY_SCORE, 0.0)),
                UnfitPolicy::Reject => Err(ScoreError::ModelNotReady),
            },
        }
    }

    pub fn stats(&self) -> ModelStats {
        let snapshot = self.current();
        ModelStats {
            sample_count: snapshot.as_ref().map_or(0, |f| f.sample_count()),
            fit_timestamp: snapshot.as_ref().map(|f| f.fitted_at()),
            tree_count: snapshot.as_ref().map_or(0, |f| f.tree_count()),
            subsample: snapshot.as_ref().map_or(0, |f| f.subsample()),
            calibration: snapshot.as_ref().map(|f| f.calibration()),
            weight_anomaly: self.config.weight_anomaly,
            weight_rule: self.config.weight_rule,
            medium_risk_threshold: self.config.medium_risk_threshold,
            fraud_threshold: self.config.fraud_threshold,
            high_risk_threshold: self.config.high_risk_threshold,
        }
    }
}
