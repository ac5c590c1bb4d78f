//! Module metadata records.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ModuleId;

/// A unit of code identified by its path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Module {
    /// Unique repository-relative path.
    pub path: ModuleId,

    /// Language tag (`go`, `python`, ...).
    pub language: String,

    /// Files belonging to the module.
    #[serde(default)]
    pub files: Vec<String>,

    /// Approximate size in lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Test coverage ratio in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_coverage: Option<f64>,

    /// Last modification time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

impl Module {
    /// Creates a module with no metadata beyond its language.
    pub fn new(path: impl Into<ModuleId>, language: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            language: language.into(),
            files: Vec::new(),
            size: None,
            test_coverage: None,
            last_modified: None,
        }
    }

    /// Sets the coverage ratio.
    #[must_use]
    pub fn with_coverage(mut self, coverage: f64) -> Self {
        self.test_coverage = Some(coverage);
        self
    }

    /// Sets the last-modified time.
    #[must_use]
    pub fn with_last_modified(mut self, at: DateTime<Utc>) -> Self {
        self.last_modified = Some(at);
        self
    }
}
