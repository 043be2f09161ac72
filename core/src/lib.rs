//! riskscore-core: fraud risk scoring engine for banking transactions.
//!
//! A transaction plus an account-context snapshot goes in; a
//! [`transaction::RiskVerdict`] (blended score, tier, contributing
//! factors, model confidence) comes out. The blend combines an
//! isolation-forest anomaly signal with deterministic domain rules.
//!
//! The engine owns no storage and no transport. Callers supply the
//! transaction and context, an external scheduler drives refits, and
//! [`history::FeatureHistory`] is only the plumbing that accumulates
//! feature vectors between refits.

pub mod anomaly;
pub mod combiner;
pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod history;
pub mod model;
pub mod rng;
pub mod rules;
pub mod transaction;
pub mod types;
