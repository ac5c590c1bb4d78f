//! Error types for tangle.
//!
//! ## Error Philosophy
//!
//! The analysis engine itself is infallible once it has a validated
//! configuration: empty or partially malformed input produces an empty but
//! valid report, and hitting a search cap is reported as a completeness
//! caveat rather than an error. Errors therefore come from the edges of the
//! system:
//!
//! - **Configuration**: unknown severity names, non-positive caps, inverted
//!   thresholds and bad glob patterns are rejected before analysis starts.
//! - **Input loading**: files that cannot be opened or records that cannot be
//!   written.
//! - **Invalid requests**: a change set that names no modules.

use thiserror::Error;

/// Errors that can occur in tangle operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Record loading or persistence error.
    #[error("record error: {0}")]
    Jsonl(#[from] tangle_jsonl::Error),

    /// Configuration rejected before analysis.
    #[error("configuration error: {0}")]
    Config(String),

    /// A request the engine cannot act on.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for tangle operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_message_is_prefixed() {
        let err = Error::Config("max_cycle_length must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "configuration error: max_cycle_length must be positive"
        );
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "edges.jsonl");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn jsonl_errors_keep_their_source() {
        let inner = tangle_jsonl::Error::Io(std::io::Error::other("disk full"));
        let err: Error = inner.into();
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("disk full"));
    }
}
