//! Command execution logic.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::Serialize;

use super::args::{CyclesArgs, ImpactArgs, InputArgs, SchemaArgs, TrendArgs};
use super::types::SchemaTarget;
use crate::config::AnalysisConfig;
use crate::domain::{ChangeSet, DependencyEdge, Module, Severity};
use crate::enrich::CircularAnalyzer;
use crate::output::{self, OutputMode};
use crate::source::{self, DependencySnapshot, DependencySource, JsonlSource};
use crate::trend::{HistorySample, TrendAnalyzer};

/// Shared state for one command run.
pub struct Session {
    /// Validated configuration.
    pub config: AnalysisConfig,
    /// How to print.
    pub mode: OutputMode,
    /// Where to persist the report, if anywhere.
    pub output: Option<PathBuf>,
}

impl Session {
    async fn persist<T: Serialize + ?Sized>(&self, report: &T) -> Result<()> {
        if let Some(path) = &self.output {
            source::write_report(path, report)
                .await
                .with_context(|| format!("failed to write report to {}", path.display()))?;
        }
        Ok(())
    }
}

async fn load_snapshot(input: &InputArgs) -> Result<DependencySnapshot> {
    let dir = &input.dir;
    let edges = input
        .edges
        .clone()
        .unwrap_or_else(|| dir.join(source::EDGES_FILE));
    let modules = input
        .modules
        .clone()
        .unwrap_or_else(|| dir.join(source::MODULES_FILE));
    let snapshot = JsonlSource::from_files(&edges, modules)
        .load()
        .await
        .with_context(|| format!("failed to load dependency records from {}", edges.display()))?;
    for warning in snapshot.warnings() {
        tracing::warn!(line = warning.line_number(), kind = warning.kind(), "{warning}");
    }
    Ok(snapshot)
}

/// Execute the cycles command
pub async fn execute_cycles(ctx: &Session, args: &CyclesArgs) -> Result<ExitCode> {
    let mut config = ctx.config.cycles.clone();
    if let Some(severity) = args.min_severity {
        config.min_severity = severity.into();
    }
    if let Some(max) = args.max_length {
        config.max_cycle_length = max;
    }
    config.include_external |= args.include_external;
    let analyzer = CircularAnalyzer::new(&config)?;

    let snapshot = load_snapshot(&args.input).await?;
    let report = analyzer.analyze(snapshot.modules(), snapshot.edges());

    output::print_circular_report(&report, ctx.mode)?;
    ctx.persist(&report).await?;

    let gate = args.fail_on.map(Severity::from);
    let failed = gate.is_some_and(|gate| report.cycles().any(|c| c.severity >= gate));
    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

async fn load_change_sets(path: &Path) -> Result<Vec<ChangeSet>> {
    let (changes, warnings) = tangle_jsonl::read_jsonl_resilient::<ChangeSet, _>(path)
        .await
        .with_context(|| format!("failed to read change sets from {}", path.display()))?;
    for warning in &warnings {
        tracing::warn!(line = warning.line_number(), "{warning}");
    }
    if changes.is_empty() {
        bail!("{} holds no usable change sets", path.display());
    }
    Ok(changes)
}

fn change_sets(args: &ImpactArgs) -> Result<Vec<ChangeSet>> {
    let now = Utc::now();
    if !args.files.is_empty() {
        return Ok(vec![ChangeSet::from_changed_files(
            &args.commit,
            None,
            &args.files,
            now,
        )?]);
    }
    if args.modules.is_empty() {
        bail!("name the changed modules with --module, --files or --changes");
    }
    Ok(vec![ChangeSet::new(
        args.id.clone(),
        args.modules.iter().map(String::as_str),
        args.kind.into(),
        now,
    )])
}

/// Execute the impact command
pub async fn execute_impact(ctx: &Session, args: &ImpactArgs) -> Result<ExitCode> {
    let mut checked = ctx.config.clone();
    if let Some(depth) = args.max_depth {
        checked.impact.max_depth = depth;
    }
    if let Some(threshold) = args.threshold {
        checked.impact.impact_threshold = threshold;
    }
    checked.validate()?;

    let changes = match &args.changes {
        Some(path) => load_change_sets(path).await?,
        None => change_sets(args)?,
    };
    let snapshot = load_snapshot(&args.input).await?;
    let reports = crate::impact::analyze_batch(&snapshot, &changes, &checked.impact, Utc::now())?;

    output::print_impact_reports(&reports, ctx.mode)?;
    match reports.as_slice() {
        [single] => ctx.persist(single).await?,
        many => ctx.persist(many).await?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Execute the trend command
pub async fn execute_trend(ctx: &Session, args: &TrendArgs) -> Result<ExitCode> {
    let (mut samples, warnings) = source::load_history(&args.history)
        .await
        .with_context(|| format!("failed to read history from {}", args.history.display()))?;
    for warning in &warnings {
        tracing::warn!(line = warning.line_number(), "{warning}");
    }
    if let Some(repository) = &args.repository {
        samples.retain(|s: &HistorySample| &s.repository == repository);
    }

    let report = TrendAnalyzer::new(&ctx.config.trend).analyze(&samples);
    output::print_trend_report(&report, ctx.mode)?;
    ctx.persist(&report).await?;
    Ok(ExitCode::SUCCESS)
}

/// Execute the schema command
pub fn execute_schema(args: &SchemaArgs) -> Result<ExitCode> {
    let schema = match args.target {
        SchemaTarget::Edge => schemars::schema_for!(DependencyEdge),
        SchemaTarget::Module => schemars::schema_for!(Module),
        SchemaTarget::Sample => schemars::schema_for!(HistorySample),
        SchemaTarget::ChangeSet => schemars::schema_for!(ChangeSet),
    };
    output::print_json(&schema)?;
    Ok(ExitCode::SUCCESS)
}
