//! Engine configuration.
//!
//! One validated struct, built once at startup. Invalid combinations
//! (weights not summing to 1.0, non-increasing tier thresholds, a
//! business-hours window that never opens) fail with `InvalidConfig`
//! at construction — scoring calls never see a half-valid config.

use crate::error::{ScoreError, ScoreResult};
use serde::{Deserialize, Serialize};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Behavior when a scoring call arrives before any model has been fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnfitPolicy {
    /// Score with a neutral anomaly value of 0.5 and confidence 0.0.
    /// The rule component still contributes normally.
    NeutralFallback,
    /// Surface `ModelNotReady` to the caller.
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Blend weight for the anomaly score. Must sum to 1.0 with
    /// `weight_rule`.
    pub weight_anomaly: f64,
    pub weight_rule: f64,

    /// Tier boundaries over the final score, half-open intervals:
    /// `< medium` Low, `[medium, fraud)` Medium, `[fraud, high)` High,
    /// `>= high` Critical. Must be strictly increasing in (0, 1].
    pub medium_risk_threshold: f64,
    pub fraud_threshold: f64,
    pub high_risk_threshold: f64,

    /// Local business-hours window `[start, end)`, 24h clock.
    pub business_hours_start: u32,
    pub business_hours_end: u32,
    /// Weekend days numbered from Monday = 0. Friday/Saturday by
    /// default (the deployment locale, not the global Sat/Sun).
    pub weekend_days: Vec<u32>,
    /// Late-night window, inclusive on both ends. Wraps midnight when
    /// `start > end` (the default 23..=5); otherwise a plain range.
    pub late_night_start: u32,
    pub late_night_end: u32,
    /// Offset of the scoring locale from UTC, whole hours.
    pub utc_offset_hours: i32,

    pub high_value_amount_threshold: f64,
    pub max_transaction_amount: f64,
    pub new_account_day_threshold: i64,
    /// Recent-transaction count at which the velocity feature saturates.
    pub velocity_window_count: u32,
    /// Velocity score above which the velocity rule fires.
    pub velocity_threshold: f64,

    pub minimum_refit_samples: usize,
    pub model_trees: usize,
    pub model_subsample: usize,
    pub model_seed: u64,
    pub unfit_policy: UnfitPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weight_anomaly: 0.7,
            weight_rule: 0.3,
            medium_risk_threshold: 0.3,
            fraud_threshold: 0.7,
            high_risk_threshold: 0.8,
            business_hours_start: 9,
            business_hours_end: 17,
            weekend_days: vec![4, 5], // Friday, Saturday
            late_night_start: 23,
            late_night_end: 5,
            utc_offset_hours: 5,
            high_value_amount_threshold: 500_000.0,
            max_transaction_amount: 10_000_000.0,
            new_account_day_threshold: 30,
            velocity_window_count: 10,
            velocity_threshold: 0.5,
            minimum_refit_samples: 100,
            model_trees: 100,
            model_subsample: 256,
            model_seed: 42,
            unfit_policy: UnfitPolicy::NeutralFallback,
        }
    }
}

impl EngineConfig {
    /// Load and validate a config from a JSON file.
    pub fn load(path: &str) -> ScoreResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Config with defaults adjusted for unit tests: UTC local time so
    /// test timestamps read literally, and a small fast forest.
    pub fn default_test() -> Self {
        Self {
            utc_offset_hours: 0,
            model_trees: 50,
            model_subsample: 64,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ScoreResult<()> {
        let invalid = |msg: String| Err(ScoreError::InvalidConfig(msg));

        let weight_sum = self.weight_anomaly + self.weight_rule;
        if self.weight_anomaly < 0.0 || self.weight_rule < 0.0 {
            return invalid(format!(
                "weights must be non-negative, got anomaly={} rule={}",
                self.weight_anomaly, self.weight_rule
            ));
        }
        if (weight_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return invalid(format!(
                "weight_anomaly + weight_rule must equal 1.0, got {weight_sum}"
            ));
        }

        let (m, f, h) = (
            self.medium_risk_threshold,
            self.fraud_threshold,
            self.high_risk_threshold,
        );
        if !(0.0 < m && m < f && f < h && h <= 1.0) {
            return invalid(format!(
                "tier thresholds must be strictly increasing in (0, 1], \
                 got medium={m} fraud={f} high={h}"
            ));
        }

        if self.business_hours_start >= self.business_hours_end
            || self.business_hours_end > 24
        {
            return invalid(format!(
                "business hours [{}, {}) is not a valid window",
                self.business_hours_start, self.business_hours_end
            ));
        }
        if self.late_night_start > 23 || self.late_night_end > 23 {
            return invalid(format!(
                "late-night window {}..={} outside the 24h clock",
                self.late_night_start, self.late_night_end
            ));
        }
        if let Some(day) = self.weekend_days.iter().find(|d| **d > 6) {
            return invalid(format!("weekend day {day} out of range 0..=6"));
        }
        if !(-12..=14).contains(&self.utc_offset_hours) {
            return invalid(format!(
                "utc_offset_hours {} outside -12..=14",
                self.utc_offset_hours
            ));
        }

        if self.high_value_amount_threshold <= 0.0 {
            return invalid("high_value_amount_threshold must be positive".into());
        }
        if self.max_transaction_amount <= 0.0 {
            return invalid("max_transaction_amount must be positive".into());
        }
        if self.new_account_day_threshold < 0 {
            return invalid("new_account_day_threshold must be non-negative".into());
        }
        if self.velocity_window_count == 0 {
            return invalid("velocity_window_count must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.velocity_threshold) {
            return invalid(format!(
                "velocity_threshold {} outside [0, 1]",
                self.velocity_threshold
            ));
        }

        if self.minimum_refit_samples < 2 {
            return invalid("minimum_refit_samples must be at least 2".into());
        }
        if self.model_trees == 0 || self.model_subsample < 2 {
            return invalid(format!(
                "model shape invalid: trees={} subsample={}",
                self.model_trees, self.model_subsample
            ));
        }

        Ok(())
    }
}
