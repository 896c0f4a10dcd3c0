use thiserror::Error;

/// Failure produced while resolving a submitted prompt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RequestError {
    pub message: String,
}

impl RequestError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PlaygroundError {
    /// Rejected submission: empty prompt or a request already in flight.
    #[error("invalid submission: {0}")]
    Validation(String),
    #[error("request failed: {0}")]
    Request(#[from] RequestError),
    /// Key-value storage could not be read or written.
    #[error("storage error: {0}")]
    Persistence(String),
    /// Clipboard or export failure.
    #[error("side effect failed: {0}")]
    SideEffect(String),
}

impl PlaygroundError {
    pub fn persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn side_effect(err: impl std::fmt::Display) -> Self {
        Self::SideEffect(err.to_string())
    }
}

pub type Result<T, E = PlaygroundError> = std::result::Result<T, E>;
