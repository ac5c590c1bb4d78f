//! Where dependency data comes from.
//!
//! The engine never reads files itself. A [`DependencySource`] produces a
//! fully materialized [`DependencySnapshot`] up front; analyzers then look
//! up per-module metadata through [`MetadataLookup`].
//!
//! [`JsonlSource`] is the stock source: a directory holding `edges.jsonl`
//! and, optionally, `modules.jsonl`, as written by the language parsers.
//! Lines that fail to decode or that describe an impossible record are
//! skipped and reported as warnings.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tangle_jsonl::{JsonlReader, Warning};

use crate::domain::{DependencyEdge, Module, ModuleId};
use crate::error::Result;
use crate::trend::HistorySample;

/// Edge records file inside a source directory.
pub const EDGES_FILE: &str = "edges.jsonl";
/// Module records file inside a source directory.
pub const MODULES_FILE: &str = "modules.jsonl";

/// Per-module metadata needed by impact analysis.
pub trait MetadataLookup {
    /// Test coverage ratio in `[0, 1]`, if measured.
    fn test_coverage(&self, module: &ModuleId) -> Option<f64>;
    /// Last modification time, if known.
    fn last_modified(&self, module: &ModuleId) -> Option<DateTime<Utc>>;
    /// Language tag, if known.
    fn language(&self, module: &ModuleId) -> Option<&str>;
}

/// Everything a source produced for one analysis run.
#[derive(Debug, Clone, Default)]
pub struct DependencySnapshot {
    modules: Vec<Module>,
    edges: Vec<DependencyEdge>,
    warnings: Vec<Warning>,
    index: HashMap<ModuleId, usize>,
}

impl DependencySnapshot {
    /// Bundles loaded records. When two module records share a path the
    /// first one wins.
    #[must_use]
    pub fn new(modules: Vec<Module>, edges: Vec<DependencyEdge>, warnings: Vec<Warning>) -> Self {
        let mut index = HashMap::with_capacity(modules.len());
        for (i, module) in modules.iter().enumerate() {
            index.entry(module.path.clone()).or_insert(i);
        }
        Self {
            modules,
            edges,
            warnings,
            index,
        }
    }

    /// Module records.
    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Edge records.
    #[must_use]
    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    /// Lines skipped while loading.
    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Record for `path`, if one was supplied.
    #[must_use]
    pub fn module(&self, path: &ModuleId) -> Option<&Module> {
        self.index.get(path).map(|&i| &self.modules[i])
    }
}

impl MetadataLookup for DependencySnapshot {
    fn test_coverage(&self, module: &ModuleId) -> Option<f64> {
        self.module(module)?.test_coverage
    }

    fn last_modified(&self, module: &ModuleId) -> Option<DateTime<Utc>> {
        self.module(module)?.last_modified
    }

    fn language(&self, module: &ModuleId) -> Option<&str> {
        self.module(module).map(|m| m.language.as_str())
    }
}

/// Produces dependency data.
#[async_trait]
pub trait DependencySource: Send + Sync {
    /// Loads every module and edge.
    ///
    /// # Errors
    ///
    /// Returns an error only when the data cannot be read at all; bad
    /// records become warnings.
    async fn load(&self) -> Result<DependencySnapshot>;
}

/// Reads `edges.jsonl` and `modules.jsonl` from a directory.
#[derive(Debug, Clone)]
pub struct JsonlSource {
    edges: PathBuf,
    modules: PathBuf,
}

impl JsonlSource {
    /// Source over the standard file names inside `dir`.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            edges: dir.join(EDGES_FILE),
            modules: dir.join(MODULES_FILE),
        }
    }

    /// Source over explicit file paths.
    #[must_use]
    pub fn from_files(edges: impl Into<PathBuf>, modules: impl Into<PathBuf>) -> Self {
        Self {
            edges: edges.into(),
            modules: modules.into(),
        }
    }
}

#[async_trait]
impl DependencySource for JsonlSource {
    async fn load(&self) -> Result<DependencySnapshot> {
        tracing::debug!(edges = %self.edges.display(), "Loading dependency records");
        let (edges, mut warnings) =
            load_records(&self.edges, DependencyEdge::rejection_reason).await?;

        let modules = if tokio::fs::try_exists(&self.modules).await.unwrap_or(false) {
            let (modules, module_warnings) = load_records(&self.modules, |m: &Module| {
                m.path.as_str().is_empty().then(|| "module path is empty".to_string())
            })
            .await?;
            warnings.extend(module_warnings);
            modules
        } else {
            tracing::debug!(path = %self.modules.display(), "No module records, using edge endpoints");
            Vec::new()
        };

        if !warnings.is_empty() {
            tracing::warn!(skipped = warnings.len(), "Skipped unusable dependency records");
        }
        tracing::info!(
            modules = modules.len(),
            edges = edges.len(),
            "Loaded dependency records"
        );
        Ok(DependencySnapshot::new(modules, edges, warnings))
    }
}

/// Decodes every line of `path`, skipping lines that fail to decode or
/// that `reject` explains away.
async fn load_records<T, F>(path: &Path, reject: F) -> Result<(Vec<T>, Vec<Warning>)>
where
    T: DeserializeOwned,
    F: Fn(&T) -> Option<String>,
{
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|source| tangle_jsonl::Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
    let mut reader = JsonlReader::new(file);
    let mut records = Vec::new();
    let mut warnings = Vec::new();
    loop {
        match reader.read_value::<T>().await {
            Ok(Some(record)) => match reject(&record) {
                Some(reason) => warnings.push(Warning::SkippedLine {
                    line_number: reader.line_number(),
                    reason,
                }),
                None => records.push(record),
            },
            Ok(None) => break,
            Err(tangle_jsonl::Error::Line { line_number, source }) => {
                warnings.push(Warning::MalformedJson {
                    line_number,
                    error: source.to_string(),
                });
            }
            Err(e) => {
                warnings.push(Warning::ReadFailed {
                    line_number: reader.line_number(),
                    error: e.to_string(),
                });
                break;
            }
        }
    }
    Ok((records, warnings))
}

/// Loads a quality history, one [`HistorySample`] per line.
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
pub async fn load_history(path: &Path) -> Result<(Vec<HistorySample>, Vec<Warning>)> {
    let (samples, warnings) = tangle_jsonl::read_jsonl_resilient(path).await?;
    Ok((samples, warnings))
}

/// Persists a report as pretty JSON, replacing `path` atomically.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub async fn write_report<T: Serialize + ?Sized>(path: &Path, report: &T) -> Result<()> {
    tangle_jsonl::write_json_atomic(path, report).await?;
    tracing::info!(path = %path.display(), "Wrote report");
    Ok(())
}
