//! Configuration management for tangle.
//!
//! Configuration is an explicit value: defaults are applied once, when the
//! CLI builds or loads an [`AnalysisConfig`], and the analyzers read it
//! without substituting anything. A YAML file may override any subset of
//! fields:
//!
//! ```yaml
//! cycles:
//!   max_cycle_length: 8
//!   min_severity: medium
//! impact:
//!   exclude_patterns: ["test_*", "vendor/*"]
//! ```

use std::path::Path;

use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::domain::Severity;
use crate::error::{Error, Result};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "tangle.yaml";

/// Longest cycle reported.
pub const DEFAULT_MAX_CYCLE_LENGTH: usize = 10;
/// Maximum DFS stack depth during cycle search.
pub const DEFAULT_DETECTION_DEPTH: usize = 20;
/// Cycles extracted from a single strongly connected component.
pub const DEFAULT_MAX_CYCLES_PER_SCC: usize = 10;
/// Cycles enumerated across the whole graph.
pub const DEFAULT_MAX_TOTAL_CYCLES: usize = 100;
/// Cycles this short or shorter are critical.
pub const DEFAULT_CRITICAL_CYCLE_LENGTH: usize = 2;
/// Cycles this short or shorter are high severity.
pub const DEFAULT_HIGH_CYCLE_LENGTH: usize = 3;
/// Cycles this short or shorter are medium severity.
pub const DEFAULT_MEDIUM_CYCLE_LENGTH: usize = 5;
/// Long cycles lighter than this are low severity.
pub const DEFAULT_WEAK_CYCLE_WEIGHT: f64 = 0.5;

/// Hops followed from a changed module.
pub const DEFAULT_IMPACT_MAX_DEPTH: usize = 10;
/// Affected modules scoring below this are dropped.
pub const DEFAULT_IMPACT_THRESHOLD: f64 = 0.1;
/// Modules never recorded nor traversed by impact analysis.
pub const DEFAULT_EXCLUDE_PATTERNS: [&str; 3] = ["test_*", "*_test.*", "mock_*"];
/// Impact score at or above which a module is high risk.
pub const DEFAULT_HIGH_RISK: f64 = 7.0;
/// Impact score at or above which a module is medium risk.
pub const DEFAULT_MEDIUM_RISK: f64 = 4.0;
/// Impact score at or above which a module is low risk.
pub const DEFAULT_LOW_RISK: f64 = 1.0;

/// Samples required before anomaly detection runs.
pub const DEFAULT_MIN_ANOMALY_SAMPLES: usize = 10;
/// |z| above which the latest sample is anomalous.
pub const DEFAULT_ANOMALY_Z_SCORE: f64 = 3.0;

/// Top-level configuration for every analyzer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Circular dependency detection.
    pub cycles: CycleConfig,
    /// Change impact analysis.
    pub impact: ImpactConfig,
    /// Quality trend alerting.
    pub trend: TrendThresholds,
}

/// Settings for cycle detection and enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Cycles with more edges than this are dropped.
    pub max_cycle_length: usize,
    /// Cycles below this severity are not reported.
    pub min_severity: Severity,
    /// Whether edges into external modules take part.
    pub include_external: bool,
    /// Maximum DFS stack depth.
    pub detection_depth: usize,
    /// Whether weak edges take part. Optional edges always do.
    pub analyze_weak_cycles: bool,
    /// Cycles extracted per strongly connected component.
    pub max_cycles_per_scc: usize,
    /// Cycles enumerated across the graph.
    pub max_total_cycles: usize,
    /// Length and weight cut-offs for severity.
    pub severity_thresholds: SeverityThresholds,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            max_cycle_length: DEFAULT_MAX_CYCLE_LENGTH,
            min_severity: Severity::Low,
            include_external: false,
            detection_depth: DEFAULT_DETECTION_DEPTH,
            analyze_weak_cycles: true,
            max_cycles_per_scc: DEFAULT_MAX_CYCLES_PER_SCC,
            max_total_cycles: DEFAULT_MAX_TOTAL_CYCLES,
            severity_thresholds: SeverityThresholds::default(),
        }
    }
}

/// Severity policy: length decides first, weight second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityThresholds {
    /// `length <= this` is critical.
    pub critical_cycle_length: usize,
    /// `length <= this` is high.
    pub high_cycle_length: usize,
    /// `length <= this` is medium.
    pub medium_cycle_length: usize,
    /// Longer cycles lighter than this are low.
    pub weak_cycle_weight: f64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            critical_cycle_length: DEFAULT_CRITICAL_CYCLE_LENGTH,
            high_cycle_length: DEFAULT_HIGH_CYCLE_LENGTH,
            medium_cycle_length: DEFAULT_MEDIUM_CYCLE_LENGTH,
            weak_cycle_weight: DEFAULT_WEAK_CYCLE_WEIGHT,
        }
    }
}

/// Settings for change impact analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    /// Maximum hop distance from a changed module.
    pub max_depth: usize,
    /// Affected modules scoring below this are dropped.
    pub impact_threshold: f64,
    /// Whether weak edges propagate impact. Optional edges always do.
    pub consider_weak_deps: bool,
    /// Whether edges into external modules propagate impact.
    pub include_external: bool,
    /// Whether the report includes a test impact section.
    pub analyze_test_impact: bool,
    /// Glob patterns for modules to skip.
    pub exclude_patterns: Vec<String>,
    /// Score cut-offs for module risk levels.
    pub risk_levels: RiskThresholds,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_IMPACT_MAX_DEPTH,
            impact_threshold: DEFAULT_IMPACT_THRESHOLD,
            consider_weak_deps: true,
            include_external: false,
            analyze_test_impact: true,
            exclude_patterns: DEFAULT_EXCLUDE_PATTERNS.iter().map(ToString::to_string).collect(),
            risk_levels: RiskThresholds::default(),
        }
    }
}

impl ImpactConfig {
    /// Compiles the exclusion globs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first invalid pattern.
    pub fn compiled_exclusions(&self) -> Result<Vec<Pattern>> {
        self.exclude_patterns
            .iter()
            .map(|raw| {
                Pattern::new(raw)
                    .map_err(|e| Error::Config(format!("invalid exclusion pattern '{raw}': {e}")))
            })
            .collect()
    }
}

/// Impact score cut-offs for module risk levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// High risk at or above.
    pub high: f64,
    /// Medium risk at or above.
    pub medium: f64,
    /// Low risk at or above.
    pub low: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high: DEFAULT_HIGH_RISK,
            medium: DEFAULT_MEDIUM_RISK,
            low: DEFAULT_LOW_RISK,
        }
    }
}

/// Alerting thresholds for quality history.
///
/// Scores and coverage are percentages (0-100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendThresholds {
    /// Percentage drop in quality vs the previous sample.
    pub quality_drop_percent: f64,
    /// Quality below this is critical.
    pub min_quality_score: f64,
    /// Average complexity above this alerts.
    pub max_complexity: f64,
    /// Percentage complexity growth across the window.
    pub complexity_increase_percent: f64,
    /// Samples spanned by the complexity growth check.
    pub complexity_window: usize,
    /// Coverage below this alerts.
    pub min_coverage: f64,
    /// Coverage below this alerts with high severity.
    pub severe_coverage: f64,
    /// Coverage points lost vs the previous sample.
    pub coverage_drop_points: f64,
    /// Debt ratio above this alerts.
    pub max_debt_ratio: f64,
    /// Percentage debt growth vs the mean of the two previous samples.
    pub debt_increase_percent: f64,
    /// Security score below this is critical.
    pub min_security_score: f64,
    /// Critical security issues tolerated.
    pub max_critical_issues: u32,
    /// |z| above which a value is anomalous.
    pub anomaly_z_score: f64,
    /// Samples needed for anomaly detection.
    pub min_anomaly_samples: usize,
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self {
            quality_drop_percent: 10.0,
            min_quality_score: 60.0,
            max_complexity: 15.0,
            complexity_increase_percent: 20.0,
            complexity_window: 5,
            min_coverage: 70.0,
            severe_coverage: 50.0,
            coverage_drop_points: 10.0,
            max_debt_ratio: 50.0,
            debt_increase_percent: 30.0,
            min_security_score: 80.0,
            max_critical_issues: 0,
            anomaly_z_score: DEFAULT_ANOMALY_Z_SCORE,
            min_anomaly_samples: DEFAULT_MIN_ANOMALY_SAMPLES,
        }
    }
}

impl AnalysisConfig {
    /// Parses YAML, filling unspecified fields with defaults, and validates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for malformed YAML (including unknown
    /// severity names) or values rejected by [`AnalysisConfig::validate`].
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a YAML config file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise as
    /// [`AnalysisConfig::from_yaml_str`].
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Loads `path` when given, else [`DEFAULT_CONFIG_FILE`] when present,
    /// else defaults.
    ///
    /// # Errors
    ///
    /// As [`AnalysisConfig::load`].
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    tracing::debug!(path = DEFAULT_CONFIG_FILE, "Using config from working directory");
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Writes the config as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if serialization fails or [`Error::Io`] if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self).map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Rejects values the analyzers cannot work with.
    ///
    /// Nothing is clamped: the first problem found is reported.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the offending field.
    pub fn validate(&self) -> Result<()> {
        self.cycles.validate()?;
        self.impact.validate()?;
        self.trend.validate()
    }
}

impl CycleConfig {
    /// Rejects caps and thresholds detection cannot honor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.max_cycle_length < 2 {
            return Err(Error::Config(format!(
                "cycles.max_cycle_length must be at least 2, got {}",
                self.max_cycle_length
            )));
        }
        positive("cycles.detection_depth", self.detection_depth)?;
        positive("cycles.max_cycles_per_scc", self.max_cycles_per_scc)?;
        positive("cycles.max_total_cycles", self.max_total_cycles)?;

        let t = &self.severity_thresholds;
        positive("cycles.severity_thresholds.critical_cycle_length", t.critical_cycle_length)?;
        if !(t.critical_cycle_length <= t.high_cycle_length
            && t.high_cycle_length <= t.medium_cycle_length)
        {
            return Err(Error::Config(format!(
                "severity thresholds must satisfy critical <= high <= medium, got {} / {} / {}",
                t.critical_cycle_length, t.high_cycle_length, t.medium_cycle_length
            )));
        }
        non_negative("cycles.severity_thresholds.weak_cycle_weight", t.weak_cycle_weight)
    }
}

impl ImpactConfig {
    /// Rejects depths, thresholds and patterns propagation cannot honor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the offending field.
    pub fn validate(&self) -> Result<()> {
        positive("impact.max_depth", self.max_depth)?;
        non_negative("impact.impact_threshold", self.impact_threshold)?;

        let r = &self.risk_levels;
        non_negative("impact.risk_levels.low", r.low)?;
        if !(r.low <= r.medium && r.medium <= r.high) {
            return Err(Error::Config(format!(
                "risk levels must satisfy low <= medium <= high, got {} / {} / {}",
                r.low, r.medium, r.high
            )));
        }
        self.compiled_exclusions().map(|_| ())
    }
}

impl TrendThresholds {
    /// Rejects windows and thresholds the trend checks cannot use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.min_anomaly_samples < 2 {
            return Err(Error::Config(format!(
                "trend.min_anomaly_samples must be at least 2, got {}",
                self.min_anomaly_samples
            )));
        }
        if self.complexity_window < 2 {
            return Err(Error::Config(format!(
                "trend.complexity_window must be at least 2, got {}",
                self.complexity_window
            )));
        }
        if !(self.anomaly_z_score.is_finite() && self.anomaly_z_score > 0.0) {
            return Err(Error::Config(format!(
                "trend.anomaly_z_score must be positive, got {}",
                self.anomaly_z_score
            )));
        }
        if self.severe_coverage > self.min_coverage {
            return Err(Error::Config(format!(
                "trend.severe_coverage ({}) must not exceed trend.min_coverage ({})",
                self.severe_coverage, self.min_coverage
            )));
        }
        for (name, value) in [
            ("trend.quality_drop_percent", self.quality_drop_percent),
            ("trend.complexity_increase_percent", self.complexity_increase_percent),
            ("trend.coverage_drop_points", self.coverage_drop_points),
            ("trend.debt_increase_percent", self.debt_increase_percent),
        ] {
            non_negative(name, value)?;
        }
        Ok(())
    }
}

fn positive(name: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(Error::Config(format!("{name} must be positive")));
    }
    Ok(())
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::Config(format!(
            "{name} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_are_valid() {
        AnalysisConfig::default().validate().unwrap();
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = AnalysisConfig::default();
        assert_eq!(config.cycles.max_cycle_length, 10);
        assert_eq!(config.cycles.detection_depth, 20);
        assert_eq!(config.cycles.min_severity, Severity::Low);
        assert!(!config.cycles.include_external);
        assert!(config.cycles.analyze_weak_cycles);
        assert!(!config.impact.include_external);
        assert_eq!(config.impact.max_depth, 10);
        assert!((config.impact.impact_threshold - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.impact.exclude_patterns, vec!["test_*", "*_test.*", "mock_*"]);
        assert_eq!(config.trend.min_anomaly_samples, 10);
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = AnalysisConfig::from_yaml_str(
            "cycles:\n  max_cycle_length: 6\n  min_severity: high\n",
        )
        .unwrap();

        assert_eq!(config.cycles.max_cycle_length, 6);
        assert_eq!(config.cycles.min_severity, Severity::High);
        assert_eq!(config.cycles.detection_depth, DEFAULT_DETECTION_DEPTH);
        assert_eq!(config.impact, ImpactConfig::default());
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(AnalysisConfig::from_yaml_str("  \n").unwrap(), AnalysisConfig::default());
    }

    #[rstest]
    #[case::unknown_severity("cycles:\n  min_severity: urgent\n")]
    #[case::short_max_length("cycles:\n  max_cycle_length: 1\n")]
    #[case::zero_depth("cycles:\n  detection_depth: 0\n")]
    #[case::zero_scc_cap("cycles:\n  max_cycles_per_scc: 0\n")]
    #[case::inverted_lengths(
        "cycles:\n  severity_thresholds:\n    critical_cycle_length: 4\n    high_cycle_length: 3\n"
    )]
    #[case::negative_weight("cycles:\n  severity_thresholds:\n    weak_cycle_weight: -1.0\n")]
    #[case::zero_impact_depth("impact:\n  max_depth: 0\n")]
    #[case::inverted_risk("impact:\n  risk_levels:\n    high: 2.0\n    medium: 4.0\n")]
    #[case::bad_glob("impact:\n  exclude_patterns: [\"[unclosed\"]\n")]
    #[case::tiny_anomaly_window("trend:\n  min_anomaly_samples: 1\n")]
    #[case::zero_z("trend:\n  anomaly_z_score: 0.0\n")]
    fn invalid_config_is_rejected(#[case] yaml: &str) {
        let err = AnalysisConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "expected config error, got {err:?}");
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tangle.yaml");
        let mut config = AnalysisConfig::default();
        config.impact.exclude_patterns = vec!["vendor/*".to_string()];
        config.trend.max_complexity = 12.5;

        config.save(&path).unwrap();
        let loaded = AnalysisConfig::load(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn load_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "cycles:\n  detection_depth: 0\n").unwrap();

        let err = AnalysisConfig::load(&path).unwrap_err();

        assert!(err.to_string().contains("bad.yaml"));
    }

    #[test]
    fn discover_with_explicit_missing_file_is_io_error() {
        let err = AnalysisConfig::discover(Some(Path::new("/nonexistent/tangle.yaml"))).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
