use thiserror::Error;

/// Errors raised while training, decoding or scoring.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or misaligned training/decoding input.
    #[error("invalid input: {0}")]
    InputFormat(String),

    /// No state is reachable at the last observation.
    #[error("no path found through the model for a sequence of {len} observations")]
    NoPathFound { len: usize },

    /// Predicted and reference sequences differ in length.
    #[error("cannot compare {predicted} predicted labels against {reference} reference labels")]
    ComparisonLength { predicted: usize, reference: usize },

    #[error("invalid parameter {name}={value:?}")]
    InvalidParameter { name: String, value: String },

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
