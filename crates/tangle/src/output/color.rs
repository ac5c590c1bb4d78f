//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Critical:  red bold  (critical severity and risk)
//!   - High:      red       (high severity, high-risk modules, errors)
//!   - Medium:    yellow    (medium severity, warnings)
//!   - Low:       green     (low severity, healthy scores)
//!   - Reference: cyan      (module paths, IDs, arrows)
//!   - Muted:     dimmed    (field labels)
//!   - Emphasis:  bold      (section headers)

use colored::Colorize;

use super::OutputConfig;
use crate::domain::{Level, OverallRisk, RiskLevel, Severity};

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Colorize a module path or identifier (cyan).
pub(crate) fn cyan(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

/// Apply dimmed style to text (for labels/field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

/// Position on a four-step scale, 0 being the mildest.
fn by_rank(text: String, rank: u8, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text;
    }
    match rank {
        0 => text.green().to_string(),
        1 => text.yellow().to_string(),
        2 => text.red().to_string(),
        _ => text.red().bold().to_string(),
    }
}

pub(crate) fn colorize_severity(severity: Severity, config: &OutputConfig) -> String {
    let rank = match severity {
        Severity::Low => 0,
        Severity::Medium => 1,
        Severity::High => 2,
        Severity::Critical => 3,
    };
    by_rank(severity.to_string(), rank, config)
}

pub(crate) fn colorize_overall(risk: OverallRisk, config: &OutputConfig) -> String {
    let rank = match risk {
        OverallRisk::Low => 0,
        OverallRisk::Medium => 1,
        OverallRisk::High => 2,
        OverallRisk::Critical => 3,
    };
    by_rank(risk.to_string(), rank, config)
}

pub(crate) fn colorize_risk(level: RiskLevel, config: &OutputConfig) -> String {
    let text = level.to_string();
    if !config.use_colors {
        return text;
    }
    match level {
        RiskLevel::Minimal => text.dimmed().to_string(),
        RiskLevel::Low => text.green().to_string(),
        RiskLevel::Medium => text.yellow().to_string(),
        RiskLevel::High => text.red().to_string(),
    }
}

pub(crate) fn colorize_level(level: Level, config: &OutputConfig) -> String {
    let rank = match level {
        Level::Low => 0,
        Level::Medium => 1,
        Level::High => 2,
    };
    by_rank(level.to_string(), rank, config)
}
