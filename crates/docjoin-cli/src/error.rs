//! CLI error types.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors surfaced by the command-line client.
#[derive(Debug, Error)]
pub enum CliError {
    /// An input file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Compiler configuration could not be decoded.
    #[error("invalid config: {0}")]
    Config(#[source] serde_json::Error),

    /// Schema or compilation error.
    #[error(transparent)]
    Core(#[from] docjoin_core::Error),

    /// Filter spec decoding or pipeline rendering error.
    #[error(transparent)]
    Proto(#[from] docjoin_proto::Error),
}

/// Read a UTF-8 input file.
pub fn read_input(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}
