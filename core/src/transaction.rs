//! Input and output data types for the scoring contract.
//!
//! `Transaction` and `AccountContext` are supplied by the external
//! transaction service; `RiskVerdict` is the engine's answer. All are
//! immutable once created.

use crate::types::{AccountId, TransactionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of supported transaction channels.
///
/// `encoded()` values are a stable wire/model contract — append new
/// variants at the end, never reorder or reassign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Transfer,
    BillPayment,
    MobileBanking,
    Atm,
    Online,
    Cheque,
}

impl TransactionType {
    /// Stable integer index fed to the model as a feature.
    pub fn encoded(&self) -> u8 {
        match self {
            Self::Deposit => 0,
            Self::Withdrawal => 1,
            Self::Transfer => 2,
            Self::BillPayment => 3,
            Self::MobileBanking => 4,
            Self::Atm => 5,
            Self::Online => 6,
            Self::Cheque => 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub account_id: AccountId,
    pub txn_type: TransactionType,
    /// Positive, currency-denominated amount.
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub timestamp: DateTime<Utc>,
    /// Province or city, when the channel reports one.
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub counterparty: Option<String>,
}

fn default_currency() -> String {
    "PKR".into()
}

/// Read-only account snapshot taken by the transaction service at
/// scoring time. The engine never refreshes or owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountContext {
    pub account_age_days: i64,
    pub balance: f64,
    /// Transactions in the trailing velocity window.
    pub recent_txn_count: u32,
    pub avg_txn_amount: f64,
}

/// Ordered risk category. Each tier is a half-open interval over the
/// final score; the mapping lives in [`crate::combiner::ScoreCombiner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Final answer for one scoring call. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskVerdict {
    pub transaction_id: TransactionId,
    /// Blended score in [0, 1].
    pub final_score: f64,
    pub tier: RiskTier,
    /// Human-readable contributing factors, rule order preserved.
    /// Non-empty whenever `tier` is above Low.
    pub factors: Vec<String>,
    pub anomaly_score: f64,
    pub rule_score: f64,
    /// Model confidence in [0, 1]; 0.0 when the neutral fallback
    /// answered instead of a fitted model.
    pub confidence: f64,
}

/// Calibration parameters captured at fit time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Median raw score over the training window; maps to 0.
    pub center: f64,
    /// Maximum raw score over the training window; maps to 1.
    pub max: f64,
}

/// Read-only model introspection for health/monitoring collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStats {
    pub sample_count: usize,
    pub fit_timestamp: Option<DateTime<Utc>>,
    pub tree_count: usize,
    pub subsample: usize,
    pub calibration: Option<Calibration>,
    pub weight_anomaly: f64,
    pub weight_rule: f64,
    pub medium_risk_threshold: f64,
    pub fraud_threshold: f64,
    pub high_risk_threshold: f64,
}

/// Result of a successful refit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefitOutcome {
    pub sample_count: usize,
    pub fit_timestamp: DateTime<Utc>,
}
