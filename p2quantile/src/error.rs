use thiserror::Error;

#[derive(Debug, Error)]
pub enum EstimatorError {
    #[error("probability must lie strictly between 0 and 1, got {0}")]
    InvalidProbability(f64),

    #[error("could not serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}
