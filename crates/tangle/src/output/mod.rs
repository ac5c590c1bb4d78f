//! Output formatting for CLI commands.
//!
//! Every report prints either as human-readable text or as pretty JSON.
//!
//! Submodules:
//! - [`color`]: semantic color helpers

pub mod color;

use std::env;
use std::io::{self, Write};

use serde::Serialize;

use crate::enrich::CircularDependencyReport;
use crate::impact::ImpactAnalysisReport;
use crate::trend::TrendReport;
use color::{
    bold, colorize_level, colorize_overall, colorize_risk, colorize_severity, cyan, dimmed,
    success, warning,
};

// ============================================================================
// Output Configuration
// ============================================================================

const DEFAULT_TERMINAL_WIDTH: u16 = 80;
const DEFAULT_MAX_CONTENT_WIDTH: usize = 100;

/// Settings that control text output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum content width for text wrapping.
    pub max_width: usize,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new `OutputConfig` with explicit values.
    #[must_use]
    pub fn new(max_width: usize, use_colors: bool) -> Self {
        Self {
            max_width,
            use_colors,
        }
    }

    /// Create an `OutputConfig` from the environment.
    ///
    /// Reads:
    /// - `TANGLE_MAX_WIDTH`: maximum content width (default: 100)
    /// - `NO_COLOR`: any value disables colors
    /// - `TANGLE_COLOR`: "0" or "false" disables colors
    #[must_use]
    pub fn from_env() -> Self {
        let max_width = match env::var("TANGLE_MAX_WIDTH") {
            Ok(s) if !s.is_empty() => s.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    env_var = "TANGLE_MAX_WIDTH",
                    value = %s,
                    default = DEFAULT_MAX_CONTENT_WIDTH,
                    "Invalid value, using default"
                );
                DEFAULT_MAX_CONTENT_WIDTH
            }),
            _ => DEFAULT_MAX_CONTENT_WIDTH,
        };

        // https://no-color.org/
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("TANGLE_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            max_width,
            use_colors,
        }
    }

    fn content_width(&self) -> usize {
        terminal_width().min(self.max_width)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONTENT_WIDTH, true)
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map_or(usize::from(DEFAULT_TERMINAL_WIDTH), |(w, _)| usize::from(w.0))
}

fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    textwrap::wrap(text, max_width.max(20))
        .into_iter()
        .map(std::borrow::Cow::into_owned)
        .collect()
}

/// Writes `items` as a bulleted list, wrapping each item under its bullet.
fn print_bullets<W: Write>(w: &mut W, items: &[String], indent: usize, width: usize) -> io::Result<()> {
    let pad = " ".repeat(indent);
    for item in items {
        for (i, line) in wrap_text(item, width.saturating_sub(indent + 2)).iter().enumerate() {
            let bullet = if i == 0 { "- " } else { "  " };
            writeln!(w, "{pad}{bullet}{line}")?;
        }
    }
    Ok(())
}

fn print_heading<W: Write>(w: &mut W, title: &str, config: &OutputConfig) -> io::Result<()> {
    writeln!(w)?;
    writeln!(w, "{}", bold(title, config))
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print a JSON-formatted result for any serializable value
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(handle, "{json}")
}

/// Print a circular dependency report in the specified format
pub fn print_circular_report(report: &CircularDependencyReport, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(report),
        OutputMode::Text => {
            let stdout = io::stdout();
            write_circular_text(&mut stdout.lock(), report, &OutputConfig::from_env())
        }
    }
}

/// Print impact reports in the specified format
pub fn print_impact_reports(reports: &[ImpactAnalysisReport], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => match reports {
            [single] => print_json(single),
            _ => print_json(reports),
        },
        OutputMode::Text => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            let config = OutputConfig::from_env();
            for report in reports {
                write_impact_text(&mut handle, report, &config)?;
            }
            Ok(())
        }
    }
}

/// Print a trend report in the specified format
pub fn print_trend_report(report: &TrendReport, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(report),
        OutputMode::Text => {
            let stdout = io::stdout();
            write_trend_text(&mut stdout.lock(), report, &OutputConfig::from_env())
        }
    }
}

// ============================================================================
// Text Formatting
// ============================================================================

fn write_circular_text<W: Write>(
    w: &mut W,
    report: &CircularDependencyReport,
    config: &OutputConfig,
) -> io::Result<()> {
    let width = config.content_width();
    let summary = &report.summary;

    if summary.total_cycles == 0 {
        writeln!(w, "{}", success("No circular dependencies found.", config))?;
    } else {
        writeln!(
            w,
            "Found {} circular dependenc{} across {} module(s)",
            bold(&summary.total_cycles.to_string(), config),
            if summary.total_cycles == 1 { "y" } else { "ies" },
            summary.affected_nodes
        )?;
        writeln!(
            w,
            "{} {}  {} {}  {} {:.1}  {} {}",
            dimmed("Critical:", config),
            summary.critical_cycles,
            dimmed("High:", config),
            summary.high_severity_cycles,
            dimmed("Avg length:", config),
            summary.average_cycle_length,
            dimmed("Max length:", config),
            summary.max_cycle_length
        )?;
    }

    if report.completeness.truncated {
        let caps: Vec<String> = report
            .completeness
            .caps_hit
            .iter()
            .map(|c| format!("{c:?}"))
            .collect();
        writeln!(
            w,
            "{}",
            warning(
                &format!("Search was cut short ({}); more cycles may exist.", caps.join(", ")),
                config
            )
        )?;
    }

    for cycle in report.cycles() {
        writeln!(w)?;
        writeln!(
            w,
            "{} {} [{}]",
            cyan(&cycle.id, config),
            colorize_severity(cycle.severity, config),
            cycle.languages.join(", ")
        )?;
        for line in wrap_text(&cycle.description, width.saturating_sub(2)) {
            writeln!(w, "  {line}")?;
        }
        if let Some(best) = cycle.breaking_points.first() {
            writeln!(
                w,
                "  {} {} -> {} ({:?}, {} effort)",
                dimmed("Cut:", config),
                best.from_node,
                best.to_node,
                best.strategy,
                best.effort
            )?;
        }
    }

    let impact = &report.impact_analysis;
    if summary.total_cycles > 0 {
        print_heading(w, "System health", config)?;
        writeln!(
            w,
            "  {} {:.1}/10  {} {:.1}/10  {} {:.1}/10",
            dimmed("Complexity:", config),
            impact.system_complexity,
            dimmed("Testability:", config),
            impact.testability_score,
            dimmed("Maintainability:", config),
            impact.maintainability_score
        )?;
    }

    if !report.recommendations.is_empty() {
        print_heading(w, "Recommendations", config)?;
        print_bullets(w, &report.recommendations, 2, width)?;
    }
    Ok(())
}

fn write_impact_text<W: Write>(
    w: &mut W,
    report: &ImpactAnalysisReport,
    config: &OutputConfig,
) -> io::Result<()> {
    let width = config.content_width();
    let summary = &report.summary;

    writeln!(
        w,
        "{} {} ({})",
        bold("Change", config),
        cyan(&report.change_set.id, config),
        report.change_set.change_kind.as_str()
    )?;
    writeln!(
        w,
        "{} {}  {} {}  {} {}  {} {}",
        dimmed("Risk:", config),
        colorize_overall(summary.overall_risk_level, config),
        dimmed("Affected:", config),
        summary.total_affected_modules,
        dimmed("Depth:", config),
        summary.max_impact_depth,
        dimmed("Effort:", config),
        colorize_level(summary.estimated_effort, config)
    )?;

    if !report.affected_modules.is_empty() {
        print_heading(w, "Affected modules", config)?;
        for module in &report.affected_modules {
            writeln!(
                w,
                "  {:>5.2}  {:<8} {} {}",
                module.impact_score,
                colorize_risk(module.risk_level, config),
                cyan(module.module_path.as_str(), config),
                dimmed(&format!("(distance {})", module.distance_from_change), config)
            )?;
        }
    }

    let factors = &report.risk_assessment.risk_factors;
    if !factors.is_empty() {
        print_heading(w, "Risk factors", config)?;
        print_bullets(w, factors, 2, width)?;
    }

    if !report.recommendations.is_empty() {
        print_heading(w, "Recommendations", config)?;
        print_bullets(w, &report.recommendations, 2, width)?;
    }

    if let Some(first) = report.mitigation_strategies.first() {
        print_heading(w, "Top mitigation", config)?;
        writeln!(w, "  {}: {}", bold(&first.name, config), first.description)?;
    }
    writeln!(w)
}

fn write_trend_text<W: Write>(w: &mut W, report: &TrendReport, config: &OutputConfig) -> io::Result<()> {
    let width = config.content_width();

    writeln!(
        w,
        "{} {} ({} sample(s))",
        bold("Trend for", config),
        cyan(&report.repository, config),
        report.sample_count
    )?;

    if report.alerts.is_empty() {
        writeln!(w, "{}", success("No alerts.", config))?;
    } else {
        print_heading(w, "Alerts", config)?;
        for alert in &report.alerts {
            writeln!(
                w,
                "  {} {} {}",
                colorize_severity(alert.severity, config),
                dimmed(alert.alert_type.as_str(), config),
                alert.message
            )?;
            print_bullets(w, &alert.suggestions, 4, width)?;
        }
    }

    if !report.predictions.is_empty() {
        print_heading(w, "Predictions", config)?;
        for p in &report.predictions {
            writeln!(
                w,
                "  {:<15} {:>8.2}  {:<10} {:>5.1}% confidence",
                p.metric.as_str(),
                p.trend.predicted,
                format!("{:?}", p.trend.direction).to_lowercase(),
                p.trend.confidence
            )?;
        }
    }
    Ok(())
}
