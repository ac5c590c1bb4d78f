//! Error types for tangle-jsonl operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The error type for tangle-jsonl operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred while reading or writing.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A line could not be decoded while reading strictly.
    #[error("line {line_number}: {source}")]
    Line {
        /// 1-based line number of the offending line.
        line_number: usize,
        /// The underlying decode failure.
        #[source]
        source: serde_json::Error,
    },

    /// A record file could not be opened.
    #[error("cannot open {path}: {source}")]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// The underlying IO failure.
        #[source]
        source: io::Error,
    },
}

/// A specialized Result type for tangle-jsonl operations.
pub type Result<T> = std::result::Result<T, Error>;
