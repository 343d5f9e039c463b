//! Error types for actor runs.

use scrappa::ScrappaError;
use thiserror::Error;

/// Errors that end an actor run.
#[derive(Debug, Error)]
pub enum ActorError {
    /// Input is missing a required field or has an unusable value.
    #[error("{0}")]
    InvalidInput(String),

    /// The Scrappa call failed.
    #[error(transparent)]
    Upstream(#[from] ScrappaError),

    /// The API answered 2xx but reported `success: false`.
    #[error("{0}")]
    Rejected(String),

    /// Dataset or key-value store write failed.
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ActorError {
    /// The underlying client error, if the run failed on the API call.
    #[must_use]
    pub fn upstream(&self) -> Option<&ScrappaError> {
        match self {
            Self::Upstream(e) => Some(e),
            _ => None,
        }
    }
}
