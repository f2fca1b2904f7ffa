use thiserror::Error;

/// Targeting engine error types.
///
/// Errors only surface at the configuration boundary (parsing a published
/// payload, validating a test's allocation). Evaluation itself is
/// infallible: malformed inputs degrade to permissive defaults instead of
/// propagating.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("Invalid allocation for test {test_id}: percentages total {total}, expected 100")]
    InvalidAllocation { test_id: String, total: f64 },

    #[error("Negative percentage in test {test_id}: {percentage}")]
    NegativePercentage { test_id: String, percentage: f64 },
}

pub type Result<T> = std::result::Result<T, EngineError>;
