//! Error types for converter invocation

use std::path::PathBuf;

use thiserror::Error;

/// Errors from one conversion attempt
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Failed to launch converter '{binary}': {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Converter exited with status {code:?}: {stderr}")]
    ConverterFailed {
        code: Option<i32>,
        stderr: String,
    },

    #[error("Conversion timeout after {0}ms")]
    Timeout(u64),

    #[error("Converter produced no output at {0}")]
    MissingOutput(PathBuf),

    #[error("Input path has no base name: {0}")]
    InvalidInput(PathBuf),
}
