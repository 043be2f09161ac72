use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoreError {
    /// Malformed or out-of-range transaction/context fields.
    /// Rejected before feature extraction, never coerced.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Bad configuration combination. Rejected at construction,
    /// never mid-scoring.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// No fitted anomaly model and the unfit policy is `Reject`.
    #[error("anomaly model not fitted")]
    ModelNotReady,

    /// Refit requested with too few samples; prior model retained.
    #[error("insufficient refit data: need {needed} samples, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ScoreResult<T> = Result<T, ScoreError>;
