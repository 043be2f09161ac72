//! Feature extraction.
//!
//! Turns a `Transaction` plus its `AccountContext` into a fixed-schema
//! numeric vector. Extraction is deterministic: no randomness, no I/O,
//! no clock reads — the transaction's own timestamp is the only time
//! source. Input validation happens here, before anything downstream
//! sees the values.

use crate::{
    config::EngineConfig,
    error::{ScoreError, ScoreResult},
    transaction::{AccountContext, Transaction},
};
use chrono::{Datelike, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};

/// Width of the model input. The field order of `FeatureVector` and
/// `as_array` is a stable model contract.
pub const FEATURE_COUNT: usize = 10;

/// Risk assigned to locations the static table does not know.
const UNKNOWN_LOCATION_RISK: f64 = 0.25;

/// Fixed ordered feature set. Ephemeral: recomputed per scoring call,
/// never persisted by the engine itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub amount: f64,
    /// Hour of day in the configured local timezone, 0..=23.
    pub hour: f64,
    /// Day of week, Monday = 0 .. Sunday = 6.
    pub day_of_week: f64,
    pub is_weekend: f64,
    pub is_business_hours: f64,
    pub amount_to_balance_ratio: f64,
    pub velocity_score: f64,
    pub location_risk: f64,
    pub time_risk: f64,
    pub txn_type_encoded: f64,
}

impl FeatureVector {
    /// Model-input ordering. Must match the struct field order above.
    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.amount,
            self.hour,
            self.day_of_week,
            self.is_weekend,
            self.is_business_hours,
            self.amount_to_balance_ratio,
            self.velocity_score,
            self.location_risk,
            self.time_risk,
            self.txn_type_encoded,
        ]
    }
}

pub struct FeatureExtractor {
    config: EngineConfig,
    local_offset: FixedOffset,
}

impl FeatureExtractor {
    pub fn new(config: EngineConfig) -> ScoreResult<Self> {
        let local_offset = FixedOffset::east_opt(config.utc_offset_hours * 3600)
            .ok_or_else(|| {
                ScoreError::InvalidConfig(format!(
                    "utc_offset_hours {} is not a valid offset",
                    config.utc_offset_hours
                ))
            })?;
        Ok(Self {
            config,
            local_offset,
        })
    }

    /// Extract the feature vector, rejecting malformed inputs.
    pub fn extract(
        &self,
        txn: &Transaction,
        ctx: &AccountContext,
    ) -> ScoreResult<FeatureVector> {
        self.validate(txn, ctx)?;

        let local = txn.timestamp.with_timezone(&self.local_offset);
        let hour = local.hour();
        let day_of_week = local.weekday().num_days_from_monday();

        let is_weekend = self.config.weekend_days.contains(&day_of_week);
        let is_business_hours = hour >= self.config.business_hours_start
            && hour < self.config.business_hours_end;

        // Guard against zero balances: ratio denominator floors at 1.
        let amount_to_balance_ratio = txn.amount / ctx.balance.max(1.0);

        let velocity_score = (f64::from(ctx.recent_txn_count)
            / f64::from(self.config.velocity_window_count))
        .min(1.0);

        let location_risk = location_risk(txn.location.as_deref());
        let time_risk = self.time_risk(hour, is_weekend, is_business_hours);

        Ok(FeatureVector {
            amount: txn.amount,
            hour: f64::from(hour),
            day_of_week: f64::from(day_of_week),
            is_weekend: if is_weekend { 1.0 } else { 0.0 },
            is_business_hours: if is_business_hours { 1.0 } else { 0.0 },
            amount_to_balance_ratio,
            velocity_score,
            location_risk,
            time_risk,
            txn_type_encoded: f64::from(txn.txn_type.encoded()),
        })
    }

    fn validate(&self, txn: &Transaction, ctx: &AccountContext) -> ScoreResult<()> {
        if !txn.amount.is_finite() || txn.amount <= 0.0 {
            return Err(ScoreError::InvalidInput(format!(
                "amount must be positive, got {}",
                txn.amount
            )));
        }
        if txn.amount > self.config.max_transaction_amount {
            return Err(ScoreError::InvalidInput(format!(
                "amount {} exceeds maximum {}",
                txn.amount, self.config.max_transaction_amount
            )));
        }
        if ctx.account_age_days < 0 {
            return Err(ScoreError::InvalidInput(format!(
                "account_age_days must be non-negative, got {}",
                ctx.account_age_days
            )));
        }
        if !ctx.balance.is_finite() {
            return Err(ScoreError::InvalidInput(format!(
                "balance must be finite, got {}",
                ctx.balance
            )));
        }
        if !ctx.avg_txn_amount.is_finite() || ctx.avg_txn_amount < 0.0 {
            return Err(ScoreError::InvalidInput(format!(
                "avg_txn_amount must be non-negative, got {}",
                ctx.avg_txn_amount
            )));
        }
        Ok(())
    }

    /// Elevated outside business hours, further bumped in the
    /// late-night window. Capped at 1.0.
    fn time_risk(&self, hour: u32, is_weekend: bool, is_business_hours: bool) -> f64 {
        let mut risk: f64 = 0.0;
        if !is_business_hours {
            risk += 0.3;
        }
        if is_weekend {
            risk += 0.2;
        }
        // The window wraps midnight when start > end (default 23..=5).
        let (start, end) = (self.config.late_night_start, self.config.late_night_end);
        let late_night = if start <= end {
            (start..=end).contains(&hour)
        } else {
            hour >= start || hour <= end
        };
        if late_night {
            risk += 0.4;
        }
        risk.min(1.0)
    }
}

/// Static location risk table keyed by province/city. Hostile markers
/// dominate; anything unrecognized (or missing) gets a mid-level
/// default rather than a free pass.
pub fn location_risk(location: Option<&str>) -> f64 {
    let Some(location) = location else {
        return UNKNOWN_LOCATION_RISK;
    };
    let location = location.trim().to_lowercase();
    if location.is_empty() {
        return UNKNOWN_LOCATION_RISK;
    }

    for marker in ["offshore", "international", "foreign", "unknown"] {
        if location.contains(marker) {
            return 0.60;
        }
    }

    match location.as_str() {
        "punjab" | "lahore" | "islamabad" => 0.05,
        "sindh" | "karachi" => 0.10,
        "gilgit-baltistan" | "ajk" | "azad kashmir" => 0.15,
        "kpk" | "khyber pakhtunkhwa" | "peshawar" => 0.20,
        "balochistan" | "quetta" => 0.30,
        _ => UNKNOWN_LOCATION_RISK,
    }
}
