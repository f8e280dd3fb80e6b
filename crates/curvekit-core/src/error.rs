use thiserror::Error;

/// Failures reported by curve construction, configuration and flattening.
///
/// All three are local to a single call; nothing here is retried internally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    /// Malformed input to a constructor or setter.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A structural precondition of `append_to` does not hold.
    #[error("Invalid curve state: {0}")]
    InvalidCurveState(String),

    /// Evaluation produced NaN or infinity while flattening.
    #[error("Degenerate evaluation: {0}")]
    DegenerateEvaluation(String),
}

impl CurveError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidCurveState(msg.into())
    }

    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::DegenerateEvaluation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, CurveError>;
