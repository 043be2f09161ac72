//! Shared primitive types used across the engine.

/// Caller-assigned unique transaction identifier.
pub type TransactionId = String;

/// Account identifier as issued by the upstream transaction service.
pub type AccountId = String;
