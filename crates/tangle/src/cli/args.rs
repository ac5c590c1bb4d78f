//! CLI argument structs for all commands.

use std::path::PathBuf;

use clap::{Args, Parser};

use super::types::{ChangeKindArg, SchemaTarget, SeverityArg};

/// Where dependency records are read from.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Directory holding `edges.jsonl` and optionally `modules.jsonl`
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Edge records file (overrides `<DIR>/edges.jsonl`)
    #[arg(long)]
    pub edges: Option<PathBuf>,

    /// Module records file (overrides `<DIR>/modules.jsonl`)
    #[arg(long, id = "modules_file")]
    pub modules: Option<PathBuf>,
}

/// Arguments for the `cycles` command
#[derive(Parser, Debug, Clone)]
pub struct CyclesArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Report only cycles at or above this severity
    #[arg(long, value_enum)]
    pub min_severity: Option<SeverityArg>,

    /// Longest cycle to report, in edges
    #[arg(long)]
    pub max_length: Option<usize>,

    /// Follow edges to external packages
    #[arg(long)]
    pub include_external: bool,

    /// Exit with status 1 when a cycle at or above this severity is found
    #[arg(long, value_enum)]
    pub fail_on: Option<SeverityArg>,
}

/// Arguments for the `impact` command
#[derive(Parser, Debug, Clone)]
pub struct ImpactArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Changed modules (comma-separated or repeated)
    #[arg(short, long = "module", value_delimiter = ',')]
    pub modules: Vec<String>,

    /// Changed files; modules and change kind are inferred from them
    #[arg(short, long, value_delimiter = ',', conflicts_with = "modules")]
    pub files: Vec<String>,

    /// Commit the changed files belong to
    #[arg(long, default_value = "HEAD", requires = "files")]
    pub commit: String,

    /// Kind of change (ignored with --files)
    #[arg(short, long, value_enum, default_value = "modification")]
    pub kind: ChangeKindArg,

    /// Identifier for the change set
    #[arg(long, default_value = "changeset")]
    pub id: String,

    /// JSONL file of change sets to analyze together
    #[arg(long, conflicts_with_all = ["modules", "files"])]
    pub changes: Option<PathBuf>,

    /// Maximum propagation depth
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Minimum impact score for a module to be reported
    #[arg(long)]
    pub threshold: Option<f64>,
}

/// Arguments for the `trend` command
#[derive(Parser, Debug, Clone)]
pub struct TrendArgs {
    /// JSONL file of quality samples
    pub history: PathBuf,

    /// Only consider samples for this repository
    #[arg(short, long)]
    pub repository: Option<String>,
}

/// Arguments for the `schema` command
#[derive(Parser, Debug, Clone)]
pub struct SchemaArgs {
    /// Record type
    #[arg(value_enum)]
    pub target: SchemaTarget,
}
