//! Tangle - dependency-graph analysis for multi-language repositories.
//!
//! This crate provides both a CLI application and a library that answers
//! three questions about a codebase's module dependency graph:
//!
//! - **Where are the cycles?** [`CircularAnalyzer`] detects elementary
//!   circular dependencies, classifies and explains them, and suggests
//!   where to cut.
//! - **What does this change touch?** [`ImpactAnalyzer`] propagates a
//!   [`ChangeSet`] through the graph, scores every affected module and
//!   assesses the overall risk.
//! - **Is quality regressing?** [`TrendAnalyzer`] checks a history of
//!   quality samples for threshold breaches, trends and outliers.
//!
//! Input arrives through a [`DependencySource`]; the stock [`JsonlSource`]
//! reads line-delimited JSON records written by language parsers.
//!
//! # Example
//!
//! ```
//! use tangle::{CircularAnalyzer, CycleConfig, DependencyEdge, DependencyKind, DependencyStrength};
//!
//! let edges = vec![
//!     DependencyEdge::new("a", "b", DependencyKind::Import, DependencyStrength::Strong, "go"),
//!     DependencyEdge::new("b", "a", DependencyKind::Import, DependencyStrength::Strong, "go"),
//! ];
//! let config = CycleConfig::default();
//! let report = CircularAnalyzer::new(&config)?.analyze(&[], &edges);
//! assert_eq!(report.summary.total_cycles, 1);
//! # Ok::<(), tangle::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod cycles;
pub mod domain;
pub mod enrich;
pub mod error;
pub mod graph;
pub mod ids;
pub mod impact;
pub mod risk;
pub mod source;
pub mod trend;

// CLI and output formatting (needed by binary)
pub mod cli;
pub mod output;

pub use config::{AnalysisConfig, CycleConfig, ImpactConfig, RiskThresholds, TrendThresholds};
pub use domain::{
    ChangeKind, ChangeSet, DependencyEdge, DependencyKind, DependencyStrength, Module, ModuleId,
    Severity,
};
pub use enrich::{CircularAnalyzer, CircularDependencyReport, Cycle};
pub use error::{Error, Result};
pub use impact::{ImpactAnalysisReport, ImpactAnalyzer, analyze_batch};
pub use risk::RiskAssessment;
pub use source::{DependencySnapshot, DependencySource, JsonlSource, MetadataLookup};
pub use trend::{HistorySample, TrendAnalyzer, TrendReport};
