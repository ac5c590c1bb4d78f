//! CLI value enums and domain type conversions.

use clap::ValueEnum;

use crate::domain::{ChangeKind, Severity};

/// Cycle severity for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityArg {
    /// Minor organisational issue
    Low,
    /// Harder to understand and test
    Medium,
    /// Significantly reduces maintainability
    High,
    /// May cause build failures or deadlocks
    Critical,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Low => Severity::Low,
            SeverityArg::Medium => Severity::Medium,
            SeverityArg::High => Severity::High,
            SeverityArg::Critical => Severity::Critical,
        }
    }
}

/// Change kind for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKindArg {
    /// New code
    Addition,
    /// Edits to existing code
    Modification,
    /// Removed code
    Deletion,
    /// Restructuring without intended behavior change
    Refactor,
}

impl From<ChangeKindArg> for ChangeKind {
    fn from(arg: ChangeKindArg) -> Self {
        match arg {
            ChangeKindArg::Addition => ChangeKind::Addition,
            ChangeKindArg::Modification => ChangeKind::Modification,
            ChangeKindArg::Deletion => ChangeKind::Deletion,
            ChangeKindArg::Refactor => ChangeKind::Refactor,
        }
    }
}

/// Input record whose JSON Schema `tangle schema` prints
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaTarget {
    /// One line of `edges.jsonl`
    Edge,
    /// One line of `modules.jsonl`
    Module,
    /// One line of a quality history file
    Sample,
    /// A change set, as accepted by `impact --changes`
    ChangeSet,
}
