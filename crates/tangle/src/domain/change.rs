//! Change sets: the input to impact analysis.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ModuleId;
use crate::error::{Error, Result};

/// Files touched beyond this count are treated as a refactor.
const REFACTOR_FILE_COUNT: usize = 10;

/// Directory prefixes stripped when mapping a file to its module.
const MODULE_PREFIXES: [&str; 3] = ["./", "src/", "lib/"];

/// What kind of change is being made.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// New code
    Addition,
    /// Edits to existing code
    #[default]
    Modification,
    /// Removed code
    Deletion,
    /// Restructuring without intended behavior change
    Refactor,
}

impl ChangeKind {
    /// Scales impact scores: deletions hurt most, additions least.
    #[must_use]
    pub fn impact_multiplier(self) -> f64 {
        match self {
            Self::Deletion => 1.5,
            Self::Addition => 0.8,
            Self::Modification => 1.0,
            Self::Refactor => 0.9,
        }
    }

    /// Historical risk sub-score for this kind of change.
    #[must_use]
    pub fn historical_risk(self) -> f64 {
        match self {
            Self::Deletion => 8.0,
            Self::Modification => 5.0,
            Self::Refactor => 4.0,
            Self::Addition => 3.0,
        }
    }

    /// Scales the estimated test effort.
    #[must_use]
    pub fn test_effort_multiplier(self) -> f64 {
        match self {
            Self::Deletion => 1.5,
            Self::Modification => 1.0,
            Self::Addition => 0.8,
            Self::Refactor => 1.2,
        }
    }

    /// Lowercase label used in reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Addition => "addition",
            Self::Modification => "modification",
            Self::Deletion => "deletion",
            Self::Refactor => "refactor",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChangeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "addition" => Ok(Self::Addition),
            "modification" => Ok(Self::Modification),
            "deletion" => Ok(Self::Deletion),
            "refactor" => Ok(Self::Refactor),
            other => Err(Error::InvalidInput(format!(
                "unknown change kind '{other}' (expected addition, modification, deletion or refactor)"
            ))),
        }
    }
}

/// A proposed change whose blast radius is to be measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChangeSet {
    /// Identifier of the change.
    pub id: String,

    /// Modules directly changed.
    pub changed_modules: Vec<ModuleId>,

    /// Kind of change.
    #[serde(alias = "change_type")]
    pub change_kind: ChangeKind,

    /// Author, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Commit hash, when known.
    #[serde(default, alias = "commit_hash", skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,

    /// When the change was made.
    pub timestamp: DateTime<Utc>,

    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Files touched by the change.
    #[serde(default)]
    pub changed_files: Vec<String>,

    /// Primary language of the change.
    #[serde(default)]
    pub language: String,
}

impl ChangeSet {
    /// Creates a change set over explicit modules.
    pub fn new<I, M>(id: impl Into<String>, modules: I, kind: ChangeKind, at: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<ModuleId>,
    {
        Self {
            id: id.into(),
            changed_modules: modules.into_iter().map(Into::into).collect(),
            change_kind: kind,
            author: None,
            commit: None,
            timestamp: at,
            description: None,
            changed_files: Vec::new(),
            language: String::new(),
        }
    }

    /// Builds a change set from a commit's list of changed files.
    ///
    /// Each file maps to its directory with `./`, `src/` and `lib/`
    /// stripped. More than 10 files is a refactor; otherwise any non-test
    /// file whose path mentions "new" or "add" makes it an addition. The
    /// primary language is the most common by extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `files` is empty or no file lies
    /// inside a module directory.
    pub fn from_changed_files(
        commit: &str,
        author: Option<String>,
        files: &[String],
        at: DateTime<Utc>,
    ) -> Result<Self> {
        if files.is_empty() {
            return Err(Error::InvalidInput(
                "change set needs at least one changed file".to_string(),
            ));
        }

        let modules: BTreeSet<ModuleId> = files.iter().filter_map(|f| module_of_file(f)).collect();
        if modules.is_empty() {
            return Err(Error::InvalidInput(
                "no changed file lies inside a module directory".to_string(),
            ));
        }

        let short: String = commit.chars().take(8).collect();
        Ok(Self {
            id: format!("changeset-{short}"),
            changed_modules: modules.into_iter().collect(),
            change_kind: infer_change_kind(files),
            author,
            commit: Some(commit.to_string()),
            timestamp: at,
            description: Some(format!("Change set from commit {short}")),
            changed_files: files.to_vec(),
            language: primary_language(files),
        })
    }
}

fn module_of_file(file: &str) -> Option<ModuleId> {
    let dir = Path::new(file).parent()?.to_str()?;
    let mut module = dir;
    for prefix in MODULE_PREFIXES {
        module = module.strip_prefix(prefix).unwrap_or(module);
    }
    if module.is_empty() || module == "." {
        None
    } else {
        Some(ModuleId::from(module))
    }
}

fn infer_change_kind(files: &[String]) -> ChangeKind {
    if files.len() > REFACTOR_FILE_COUNT {
        return ChangeKind::Refactor;
    }
    let adds = files
        .iter()
        .filter(|f| !f.contains("test"))
        .any(|f| f.contains("new") || f.contains("add"));
    if adds {
        ChangeKind::Addition
    } else {
        ChangeKind::Modification
    }
}

fn language_of_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "go" => Some("go"),
        "js" | "jsx" => Some("javascript"),
        "ts" | "tsx" => Some("typescript"),
        "py" => Some("python"),
        "java" => Some("java"),
        "rb" => Some("ruby"),
        "php" => Some("php"),
        "cs" => Some("csharp"),
        _ => None,
    }
}

/// Most frequent language by extension; ties go to the alphabetically first.
fn primary_language(files: &[String]) -> String {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for file in files {
        let lang = Path::new(file)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .and_then(|e| language_of_extension(&e));
        if let Some(lang) = lang {
            *counts.entry(lang).or_default() += 1;
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (lang, count) in counts {
        if best.is_none_or(|(_, n)| count > n) {
            best = Some((lang, count));
        }
    }
    best.map_or_else(|| "unknown".to_string(), |(lang, _)| lang.to_string())
}
