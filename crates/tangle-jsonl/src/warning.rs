//! Warnings produced while loading JSONL records resiliently.
//!
//! Resilient loading never fails on a bad line. Instead, each problem is
//! recorded as a [`Warning`] carrying the 1-based line number, and loading
//! continues with the next line. Callers decide whether warnings are fatal.

use std::sync::{Arc, Mutex, PoisonError};

/// A non-fatal problem encountered on a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// The line was not valid JSON for the expected record type.
    MalformedJson {
        /// 1-based line number.
        line_number: usize,
        /// Decoder message.
        error: String,
    },

    /// The line decoded but was rejected by a record validator.
    SkippedLine {
        /// 1-based line number.
        line_number: usize,
        /// Why the record was rejected.
        reason: String,
    },

    /// Reading stopped early because the underlying reader failed.
    ReadFailed {
        /// Line number reached before the failure.
        line_number: usize,
        /// IO error message.
        error: String,
    },
}

impl Warning {
    /// Returns the line number the warning refers to.
    ///
    /// # Examples
    ///
    /// ```
    /// use tangle_jsonl::warning::Warning;
    ///
    /// let warning = Warning::SkippedLine {
    ///     line_number: 7,
    ///     reason: "self dependency".to_string(),
    /// };
    /// assert_eq!(warning.line_number(), 7);
    /// ```
    #[must_use]
    pub fn line_number(&self) -> usize {
        match self {
            Self::MalformedJson { line_number, .. }
            | Self::SkippedLine { line_number, .. }
            | Self::ReadFailed { line_number, .. } => *line_number,
        }
    }

    /// Returns a stable identifier for the warning kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedJson { .. } => "malformed_json",
            Self::SkippedLine { .. } => "skipped_line",
            Self::ReadFailed { .. } => "read_failed",
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedJson { line_number, error } => {
                write!(f, "line {line_number}: malformed JSON: {error}")
            }
            Self::SkippedLine {
                line_number,
                reason,
            } => write!(f, "line {line_number}: skipped: {reason}"),
            Self::ReadFailed { line_number, error } => {
                write!(f, "line {line_number}: read failed: {error}")
            }
        }
    }
}

impl std::error::Error for Warning {}

/// Shared, cloneable sink for warnings.
///
/// Clones share the same underlying list, so a collector can be handed to a
/// stream and inspected after the stream has been drained. A poisoned lock is
/// recovered rather than propagated.
#[derive(Debug, Clone, Default)]
pub struct WarningCollector {
    inner: Arc<Mutex<Vec<Warning>>>,
}

impl WarningCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning.
    pub fn add(&self, warning: Warning) {
        tracing::debug!(line = warning.line_number(), kind = warning.kind(), "JSONL warning");
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(warning);
    }

    /// Returns a snapshot of the collected warnings.
    #[must_use]
    pub fn warnings(&self) -> Vec<Warning> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Takes all collected warnings, leaving the collector empty.
    #[must_use]
    pub fn take(&self) -> Vec<Warning> {
        std::mem::take(&mut *self.inner.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Number of collected warnings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true when nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_list() {
        let collector = WarningCollector::new();
        let handle = collector.clone();

        handle.add(Warning::MalformedJson {
            line_number: 3,
            error: "expected value".to_string(),
        });

        assert_eq!(collector.len(), 1);
        assert_eq!(collector.warnings()[0].kind(), "malformed_json");
    }

    #[test]
    fn take_drains_the_collector() {
        let collector = WarningCollector::new();
        collector.add(Warning::SkippedLine {
            line_number: 1,
            reason: "empty module path".to_string(),
        });

        let taken = collector.take();

        assert_eq!(taken.len(), 1);
        assert!(collector.is_empty());
    }

    #[test]
    fn display_includes_line_and_reason() {
        let warning = Warning::ReadFailed {
            line_number: 12,
            error: "stream did not contain valid UTF-8".to_string(),
        };

        let text = warning.to_string();

        assert!(text.starts_with("line 12:"), "unexpected text: {text}");
        assert!(text.contains("valid UTF-8"));
    }
}
