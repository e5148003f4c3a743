//! Protocol error types.

use thiserror::Error;

/// Protocol-level errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed.
    #[error("deserialization error: {0}")]
    Deserialization(String),
}

impl Error {
    pub(crate) fn decode(err: serde_json::Error) -> Self {
        Error::Deserialization(err.to_string())
    }

    pub(crate) fn encode(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
