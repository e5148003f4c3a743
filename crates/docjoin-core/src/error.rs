//! Core error types.

use docjoin_proto::{ClauseValue, Operator};
use thiserror::Error;

/// Core errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A where clause uses an operator the translator does not handle.
    #[error("unhandled where clause: {field} {operator} {value}")]
    UnsupportedOperator {
        field: String,
        operator: Operator,
        value: ClauseValue,
    },

    /// Root model not registered.
    #[error("unknown model '{0}'")]
    UnknownModel(String),

    /// A model declares the same association alias twice.
    #[error("duplicate association alias '{alias}' on model '{model}'")]
    DuplicateAlias { model: String, alias: String },

    /// Schema definition could not be decoded.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// Protocol error.
    #[error("protocol error: {0}")]
    Protocol(#[from] docjoin_proto::Error),
}
