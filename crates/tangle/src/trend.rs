//! Trend and anomaly analysis over a history of quality samples.
//!
//! Every check is a pure function of the series. Alert IDs and timestamps
//! come from the newest sample, so the same history always produces the
//! same report.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::TrendThresholds;
use crate::domain::Severity;
use crate::ids::content_id;

/// Slopes closer to zero than this count as stable.
pub const SLOPE_DEADBAND: f64 = 0.1;

/// One historical quality summary of a repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HistorySample {
    /// When the sample was taken.
    pub timestamp: DateTime<Utc>,
    /// Repository the sample describes.
    #[serde(default)]
    pub repository: String,
    /// Overall quality score, 0 to 100.
    pub quality_score: f64,
    /// Average cyclomatic complexity.
    pub avg_complexity: f64,
    /// Test coverage percentage, 0 to 100.
    pub test_coverage: f64,
    /// Technical debt ratio.
    pub debt_ratio: f64,
    /// Security score, 0 to 100.
    pub security_score: f64,
    /// Open critical security issues.
    #[serde(default)]
    pub critical_security_issues: u32,
}

/// A tracked sample metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// [`HistorySample::quality_score`]
    QualityScore,
    /// [`HistorySample::avg_complexity`]
    Complexity,
    /// [`HistorySample::test_coverage`]
    Coverage,
    /// [`HistorySample::debt_ratio`]
    DebtRatio,
    /// [`HistorySample::security_score`]
    SecurityScore,
}

impl Metric {
    /// Every metric, in report order.
    pub const ALL: [Metric; 5] = [
        Metric::QualityScore,
        Metric::Complexity,
        Metric::Coverage,
        Metric::DebtRatio,
        Metric::SecurityScore,
    ];

    /// Snake-case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::QualityScore => "quality_score",
            Self::Complexity => "complexity",
            Self::Coverage => "coverage",
            Self::DebtRatio => "debt_ratio",
            Self::SecurityScore => "security_score",
        }
    }

    /// Reads this metric from a sample.
    #[must_use]
    pub fn of(self, sample: &HistorySample) -> f64 {
        match self {
            Self::QualityScore => sample.quality_score,
            Self::Complexity => sample.avg_complexity,
            Self::Coverage => sample.test_coverage,
            Self::DebtRatio => sample.debt_ratio,
            Self::SecurityScore => sample.security_score,
        }
    }

    /// The metric's value in every sample.
    #[must_use]
    pub fn series(self, samples: &[HistorySample]) -> Vec<f64> {
        samples.iter().map(|s| self.of(s)).collect()
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an alert is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    /// Quality score too low or falling fast.
    QualityDrop,
    /// Complexity too high or rising fast.
    ComplexityHigh,
    /// Coverage too low or falling fast.
    CoverageLow,
    /// Debt too high or rising fast.
    DebtIncrease,
    /// Security score too low or critical issues open.
    SecurityIssue,
    /// Newest value is a statistical outlier.
    TrendAnomaly,
}

impl AlertType {
    /// Snake-case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::QualityDrop => "quality_drop",
            Self::ComplexityHigh => "complexity_high",
            Self::CoverageLow => "coverage_low",
            Self::DebtIncrease => "debt_increase",
            Self::SecurityIssue => "security_issue",
            Self::TrendAnomaly => "trend_anomaly",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A regression worth telling someone about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Content-derived identifier.
    pub id: String,
    /// Kind of regression.
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    /// How urgent it is.
    pub severity: Severity,
    /// Timestamp of the sample that raised it.
    pub timestamp: DateTime<Utc>,
    /// Repository of that sample.
    pub repository: String,
    /// Human-readable summary.
    pub message: String,
    /// Values behind the alert.
    pub details: BTreeMap<String, Value>,
    /// What to do about it.
    pub suggestions: Vec<String>,
}

/// Direction of a fitted trend line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    /// Slope above the deadband.
    Increasing,
    /// Slope below the negative deadband.
    Decreasing,
    /// Slope within the deadband.
    Stable,
    /// Fewer than two samples.
    Unknown,
}

/// Ordinary least squares fit of a series against its index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearTrend {
    /// Points fitted.
    pub samples: usize,
    /// Change per sample.
    pub slope: f64,
    /// Value at index 0.
    pub intercept: f64,
    /// Extrapolated value at index `samples`.
    pub predicted: f64,
    /// Sign of the slope.
    pub direction: TrendDirection,
    /// R² as a percentage.
    pub confidence: f64,
}

/// The fitted trend of one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Metric fitted.
    pub metric: Metric,
    /// Fit.
    #[serde(flatten)]
    pub trend: LinearTrend,
}

/// Outcome of analyzing one history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    /// Repository of the newest sample.
    pub repository: String,
    /// Samples analyzed.
    pub sample_count: usize,
    /// Oldest sample time.
    pub window_start: Option<DateTime<Utc>>,
    /// Newest sample time.
    pub window_end: Option<DateTime<Utc>>,
    /// Raised alerts, in check order.
    pub alerts: Vec<Alert>,
    /// One fit per metric.
    pub predictions: Vec<Prediction>,
}

/// True when the newest value is below `floor`.
#[must_use]
pub fn breaches_floor(series: &[f64], floor: f64) -> bool {
    series.last().is_some_and(|&v| v < floor)
}

/// Percentage change from `previous` to `current`, or `None` when
/// `previous` is zero.
#[must_use]
pub fn percent_change(previous: f64, current: f64) -> Option<f64> {
    (previous != 0.0).then(|| (current - previous) / previous * 100.0)
}

/// Percentage by which the newest value fell below the one before it.
/// Negative when it rose.
#[must_use]
pub fn drop_percent(series: &[f64]) -> Option<f64> {
    match series {
        [.., previous, current] => percent_change(*previous, *current).map(|c| -c),
        _ => None,
    }
}

/// Fits `series[i]` against `i`.
///
/// Fewer than two points give an unknown direction with zero confidence.
/// A constant series fits perfectly.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn linear_trend(series: &[f64]) -> LinearTrend {
    let samples = series.len();
    if samples < 2 {
        let value = series.first().copied().unwrap_or(0.0);
        return LinearTrend {
            samples,
            slope: 0.0,
            intercept: value,
            predicted: value,
            direction: TrendDirection::Unknown,
            confidence: 0.0,
        };
    }

    let n = samples as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);
    for (i, &y) in series.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }
    let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_x2 - sum_x * sum_x);
    let intercept = (sum_y - slope * sum_x) / n;

    let mean = sum_y / n;
    let (mut ss_total, mut ss_residual) = (0.0, 0.0);
    for (i, &y) in series.iter().enumerate() {
        let fitted = slope * i as f64 + intercept;
        ss_total += (y - mean).powi(2);
        ss_residual += (y - fitted).powi(2);
    }
    let r_squared = if ss_total == 0.0 {
        1.0
    } else {
        (1.0 - ss_residual / ss_total).clamp(0.0, 1.0)
    };

    let direction = if slope.abs() < SLOPE_DEADBAND {
        TrendDirection::Stable
    } else if slope > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    };

    LinearTrend {
        samples,
        slope,
        intercept,
        predicted: slope * n + intercept,
        direction,
        confidence: r_squared * 100.0,
    }
}

/// Population mean and standard deviation.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean_and_std_dev(series: &[f64]) -> (f64, f64) {
    if series.is_empty() {
        return (0.0, 0.0);
    }
    let n = series.len() as f64;
    let mean = series.iter().sum::<f64>() / n;
    let variance = series.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// |z| of the newest value against the whole series, or `None` when the
/// series is empty or constant.
#[must_use]
pub fn latest_z_score(series: &[f64]) -> Option<f64> {
    let &current = series.last()?;
    let (mean, std_dev) = mean_and_std_dev(series);
    (std_dev > 0.0).then(|| (current - mean).abs() / std_dev)
}

/// |z| of the newest value when it exceeds `threshold` and the series has
/// at least `min_samples` points.
#[must_use]
pub fn latest_anomaly(series: &[f64], threshold: f64, min_samples: usize) -> Option<f64> {
    if series.len() < min_samples {
        return None;
    }
    latest_z_score(series).filter(|&z| z > threshold)
}

fn details<const N: usize>(pairs: [(&str, Value); N]) -> BTreeMap<String, Value> {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn suggestions(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

/// Runs every check against a history.
#[derive(Debug, Clone, Copy)]
pub struct TrendAnalyzer<'a> {
    thresholds: &'a TrendThresholds,
}

impl<'a> TrendAnalyzer<'a> {
    /// Analyzer using `thresholds`.
    #[must_use]
    pub fn new(thresholds: &'a TrendThresholds) -> Self {
        Self { thresholds }
    }

    /// Sorts `samples` by time and checks the newest one against the rest.
    #[must_use]
    pub fn analyze(&self, samples: &[HistorySample]) -> TrendReport {
        let mut history = samples.to_vec();
        history.sort_by_key(|s| s.timestamp);

        let Some(latest) = history.last() else {
            return TrendReport {
                repository: String::new(),
                sample_count: 0,
                window_start: None,
                window_end: None,
                alerts: Vec::new(),
                predictions: Vec::new(),
            };
        };

        let checks = [
            self.check_quality(&history),
            self.check_complexity(&history),
            self.check_coverage(&history),
            self.check_debt(&history),
            self.check_security(latest),
        ];
        let mut alerts: Vec<Alert> = checks.into_iter().flatten().collect();
        alerts.extend(self.detect_anomalies(&history));

        for alert in &alerts {
            tracing::debug!(
                id = %alert.id,
                kind = %alert.alert_type,
                severity = %alert.severity,
                "Raised trend alert"
            );
        }
        tracing::info!(
            samples = history.len(),
            alerts = alerts.len(),
            repository = %latest.repository,
            "Analyzed quality trend"
        );

        TrendReport {
            repository: latest.repository.clone(),
            sample_count: history.len(),
            window_start: history.first().map(|s| s.timestamp),
            window_end: Some(latest.timestamp),
            predictions: Metric::ALL
                .iter()
                .map(|&metric| Prediction {
                    metric,
                    trend: linear_trend(&metric.series(&history)),
                })
                .collect(),
            alerts,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn alert(
        latest: &HistorySample,
        alert_type: AlertType,
        metric: Metric,
        severity: Severity,
        message: String,
        details: BTreeMap<String, Value>,
        suggestions: Vec<String>,
    ) -> Alert {
        let key = format!(
            "{}|{alert_type}|{metric}|{}",
            latest.repository,
            latest.timestamp.to_rfc3339()
        );
        Alert {
            id: content_id("alert", &key),
            alert_type,
            severity,
            timestamp: latest.timestamp,
            repository: latest.repository.clone(),
            message,
            details,
            suggestions,
        }
    }

    fn check_quality(&self, history: &[HistorySample]) -> Option<Alert> {
        let latest = history.last()?;
        let series = Metric::QualityScore.series(history);
        let t = self.thresholds;

        if breaches_floor(&series, t.min_quality_score) {
            return Some(Self::alert(
                latest,
                AlertType::QualityDrop,
                Metric::QualityScore,
                Severity::Critical,
                format!(
                    "Quality score critically low: {:.1} (minimum: {:.1})",
                    latest.quality_score, t.min_quality_score
                ),
                details([
                    ("current_score", json!(latest.quality_score)),
                    ("minimum_score", json!(t.min_quality_score)),
                ]),
                suggestions(&[
                    "Immediately address critical and major issues",
                    "Focus on reducing code complexity",
                    "Improve test coverage for critical components",
                ]),
            ));
        }

        let drop = drop_percent(&series).filter(|&d| d > t.quality_drop_percent)?;
        let previous = series[series.len() - 2];
        Some(Self::alert(
            latest,
            AlertType::QualityDrop,
            Metric::QualityScore,
            Severity::High,
            format!(
                "Quality score dropped by {drop:.1}% (from {previous:.1} to {:.1})",
                latest.quality_score
            ),
            details([
                ("previous_score", json!(previous)),
                ("current_score", json!(latest.quality_score)),
                ("drop_percentage", json!(drop)),
            ]),
            suggestions(&[
                "Review recent code changes for quality issues",
                "Run full code review on recent commits",
                "Check if new technical debt was introduced",
            ]),
        ))
    }

    fn check_complexity(&self, history: &[HistorySample]) -> Option<Alert> {
        let latest = history.last()?;
        let t = self.thresholds;

        if latest.avg_complexity > t.max_complexity {
            return Some(Self::alert(
                latest,
                AlertType::ComplexityHigh,
                Metric::Complexity,
                Severity::High,
                format!(
                    "Code complexity too high: {:.1} (maximum: {:.1})",
                    latest.avg_complexity, t.max_complexity
                ),
                details([
                    ("current_complexity", json!(latest.avg_complexity)),
                    ("max_complexity", json!(t.max_complexity)),
                ]),
                suggestions(&[
                    "Refactor complex functions into smaller units",
                    "Apply SOLID principles to reduce complexity",
                    "Consider extracting complex logic into separate modules",
                ]),
            ));
        }

        if t.complexity_window == 0 || history.len() < t.complexity_window {
            return None;
        }
        let start = history[history.len() - t.complexity_window].avg_complexity;
        let increase = percent_change(start, latest.avg_complexity)
            .filter(|&i| i > t.complexity_increase_percent)?;
        Some(Self::alert(
            latest,
            AlertType::ComplexityHigh,
            Metric::Complexity,
            Severity::Medium,
            format!("Complexity increasing rapidly: {increase:.1}% increase"),
            details([
                ("start_complexity", json!(start)),
                ("current_complexity", json!(latest.avg_complexity)),
                ("increase_rate", json!(increase)),
            ]),
            suggestions(&[
                "Review architectural decisions",
                "Consider code simplification sprint",
                "Implement complexity budget for new features",
            ]),
        ))
    }

    fn check_coverage(&self, history: &[HistorySample]) -> Option<Alert> {
        let latest = history.last()?;
        let t = self.thresholds;

        if latest.test_coverage < t.min_coverage {
            let severity = if latest.test_coverage < t.severe_coverage {
                Severity::High
            } else {
                Severity::Medium
            };
            return Some(Self::alert(
                latest,
                AlertType::CoverageLow,
                Metric::Coverage,
                severity,
                format!(
                    "Test coverage below minimum: {:.1}% (minimum: {:.1}%)",
                    latest.test_coverage, t.min_coverage
                ),
                details([
                    ("current_coverage", json!(latest.test_coverage)),
                    ("minimum_coverage", json!(t.min_coverage)),
                ]),
                suggestions(&[
                    "Add unit tests for uncovered code",
                    "Focus on testing critical business logic",
                    "Set up coverage gates in CI/CD pipeline",
                ]),
            ));
        }

        let [.., previous, _] = history else {
            return None;
        };
        let drop = previous.test_coverage - latest.test_coverage;
        (drop > t.coverage_drop_points).then(|| {
            Self::alert(
                latest,
                AlertType::CoverageLow,
                Metric::Coverage,
                Severity::Medium,
                format!("Test coverage dropped by {drop:.1} points"),
                details([
                    ("previous_coverage", json!(previous.test_coverage)),
                    ("current_coverage", json!(latest.test_coverage)),
                    ("coverage_drop", json!(drop)),
                ]),
                suggestions(&[
                    "Ensure new code includes tests",
                    "Review if tests were accidentally removed",
                    "Add tests for recently added features",
                ]),
            )
        })
    }

    fn check_debt(&self, history: &[HistorySample]) -> Option<Alert> {
        let latest = history.last()?;
        let t = self.thresholds;

        if latest.debt_ratio > t.max_debt_ratio {
            return Some(Self::alert(
                latest,
                AlertType::DebtIncrease,
                Metric::DebtRatio,
                Severity::High,
                format!(
                    "Technical debt ratio too high: {:.1} (maximum: {:.1})",
                    latest.debt_ratio, t.max_debt_ratio
                ),
                details([
                    ("current_debt_ratio", json!(latest.debt_ratio)),
                    ("max_debt_ratio", json!(t.max_debt_ratio)),
                ]),
                suggestions(&[
                    "Schedule technical debt reduction sprint",
                    "Prioritize fixing high-severity issues",
                    "Allocate time for refactoring in each sprint",
                ]),
            ));
        }

        let [.., first, second, _] = history else {
            return None;
        };
        let average = (first.debt_ratio + second.debt_ratio) / 2.0;
        let increase = percent_change(average, latest.debt_ratio)
            .filter(|&i| average > 0.0 && i > t.debt_increase_percent)?;
        Some(Self::alert(
            latest,
            AlertType::DebtIncrease,
            Metric::DebtRatio,
            Severity::Medium,
            format!("Technical debt increasing rapidly: {increase:.1}% increase"),
            details([
                ("average_debt", json!(average)),
                ("current_debt", json!(latest.debt_ratio)),
                ("increase_rate", json!(increase)),
            ]),
            suggestions(&[
                "Review development practices",
                "Implement stricter code review process",
                "Consider debt ceiling policy",
            ]),
        ))
    }

    fn check_security(&self, latest: &HistorySample) -> Option<Alert> {
        let t = self.thresholds;

        if latest.security_score < t.min_security_score {
            return Some(Self::alert(
                latest,
                AlertType::SecurityIssue,
                Metric::SecurityScore,
                Severity::Critical,
                format!(
                    "Security score below threshold: {:.1} (minimum: {:.1})",
                    latest.security_score, t.min_security_score
                ),
                details([
                    ("security_score", json!(latest.security_score)),
                    ("critical_issues", json!(latest.critical_security_issues)),
                ]),
                suggestions(&[
                    "Immediately fix critical security vulnerabilities",
                    "Run security audit on the codebase",
                    "Update dependencies with known vulnerabilities",
                ]),
            ));
        }

        (latest.critical_security_issues > t.max_critical_issues).then(|| {
            Self::alert(
                latest,
                AlertType::SecurityIssue,
                Metric::SecurityScore,
                Severity::Critical,
                format!(
                    "Critical security issues found: {}",
                    latest.critical_security_issues
                ),
                details([("critical_count", json!(latest.critical_security_issues))]),
                suggestions(&[
                    "Fix critical security issues immediately",
                    "Review security best practices",
                    "Consider security-focused code review",
                ]),
            )
        })
    }

    fn detect_anomalies(&self, history: &[HistorySample]) -> Vec<Alert> {
        let Some(latest) = history.last() else {
            return Vec::new();
        };
        let t = self.thresholds;
        Metric::ALL
            .iter()
            .filter_map(|&metric| {
                let series = metric.series(history);
                let z = latest_anomaly(&series, t.anomaly_z_score, t.min_anomaly_samples)?;
                let (mean, std_dev) = mean_and_std_dev(&series);
                let current = metric.of(latest);
                Some(Self::alert(
                    latest,
                    AlertType::TrendAnomaly,
                    metric,
                    Severity::Medium,
                    format!("Anomaly detected in {metric}: {current:.2} (z-score: {z:.2})"),
                    details([
                        ("metric", json!(metric.as_str())),
                        ("current_value", json!(current)),
                        ("mean", json!(mean)),
                        ("std_dev", json!(std_dev)),
                        ("z_score", json!(z)),
                    ]),
                    suggestions(&[
                        "Investigate recent changes that might have caused the anomaly",
                        "Review if this is an expected change or an error",
                        "Check for data collection issues",
                    ]),
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    const SERIES: [f64; 15] = [
        88.0, 90.0, 87.0, 91.0, 89.0, 86.0, 92.0, 88.0, 90.0, 85.0, 89.0, 91.0, 87.0, 90.0, 50.0,
    ];

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    fn sample(day: i64, quality: f64) -> HistorySample {
        HistorySample {
            timestamp: base() + Duration::days(day),
            repository: "acme/api".to_string(),
            quality_score: quality,
            avg_complexity: 8.0,
            test_coverage: 80.0,
            debt_ratio: 20.0,
            security_score: 95.0,
            critical_security_issues: 0,
        }
    }

    #[test]
    fn outlier_after_stable_run_is_anomalous() {
        let z = latest_anomaly(&SERIES, 3.0, 10).unwrap();
        assert!((z - 3.671).abs() < 1e-3, "z = {z}");
    }

    #[test]
    fn no_prefix_of_the_stable_run_is_anomalous() {
        for end in 1..SERIES.len() {
            assert_eq!(latest_anomaly(&SERIES[..end], 3.0, 10), None, "prefix {end}");
        }
    }

    #[test]
    fn constant_series_never_flags() {
        assert_eq!(latest_z_score(&[5.0; 12]), None);
        assert_eq!(latest_z_score(&[]), None);
    }

    #[rstest]
    #[case(&[1.0, 2.0, 3.0, 4.0], TrendDirection::Increasing, 5.0, 100.0)]
    #[case(&[4.0, 3.0, 2.0, 1.0], TrendDirection::Decreasing, 0.0, 100.0)]
    #[case(&[7.0, 7.0, 7.0], TrendDirection::Stable, 7.0, 100.0)]
    #[case(&[3.0], TrendDirection::Unknown, 3.0, 0.0)]
    fn linear_fit(
        #[case] series: &[f64],
        #[case] direction: TrendDirection,
        #[case] predicted: f64,
        #[case] confidence: f64,
    ) {
        let got = linear_trend(series);
        assert_eq!(got.direction, direction);
        assert!((got.predicted - predicted).abs() < 1e-9);
        assert!((got.confidence - confidence).abs() < 1e-9);
    }

    #[test]
    fn slope_inside_deadband_is_stable() {
        let got = linear_trend(&[10.0, 10.05, 10.1, 10.15]);
        assert!((got.slope - 0.05).abs() < 1e-9);
        assert_eq!(got.direction, TrendDirection::Stable);
    }

    #[test]
    fn noisy_fit_has_partial_confidence() {
        let got = linear_trend(&[1.0, 3.0, 2.0, 4.0]);
        // slope 0.8, R² = 0.64
        assert!((got.confidence - 64.0).abs() < 1e-9);
    }

    #[rstest]
    #[case(&[80.0, 70.0], Some(12.5))]
    #[case(&[40.0, 50.0], Some(-25.0))]
    #[case(&[0.0, 50.0], None)]
    #[case(&[50.0], None)]
    fn drop_is_relative_to_previous(#[case] series: &[f64], #[case] expected: Option<f64>) {
        assert_eq!(drop_percent(series), expected);
    }

    #[test]
    fn anomalous_quality_raises_critical_floor_and_anomaly_alerts() {
        let history: Vec<HistorySample> = SERIES
            .iter()
            .enumerate()
            .map(|(day, &q)| sample(i64::try_from(day).unwrap(), q))
            .rev()
            .collect();
        let thresholds = TrendThresholds::default();

        let report = TrendAnalyzer::new(&thresholds).analyze(&history);
        let kinds: Vec<(AlertType, Severity)> = report
            .alerts
            .iter()
            .map(|a| (a.alert_type, a.severity))
            .collect();

        assert_eq!(
            kinds,
            vec![
                (AlertType::QualityDrop, Severity::Critical),
                (AlertType::TrendAnomaly, Severity::Medium),
            ]
        );
        assert_eq!(report.sample_count, 15);
        assert_eq!(report.window_end, Some(base() + Duration::days(14)));
        assert_eq!(report.alerts[1].details["metric"], json!("quality_score"));
        assert!(report.alerts.iter().all(|a| a.timestamp == base() + Duration::days(14)));
    }

    #[test]
    fn alert_ids_are_stable_and_distinct() {
        let history = vec![sample(0, 90.0), sample(1, 40.0)];
        let mut insecure = history.clone();
        insecure[1].security_score = 10.0;
        let thresholds = TrendThresholds::default();
        let analyzer = TrendAnalyzer::new(&thresholds);

        let a = analyzer.analyze(&insecure);
        let b = analyzer.analyze(&insecure);

        assert_eq!(a, b);
        assert_eq!(a.alerts.len(), 2);
        assert_ne!(a.alerts[0].id, a.alerts[1].id);
        assert!(a.alerts[0].id.starts_with("alert-"));
    }

    #[test]
    fn relative_checks_use_earlier_samples() {
        let mut history: Vec<HistorySample> = (0..5).map(|d| sample(d, 90.0)).collect();
        history[4].quality_score = 78.0;
        history[4].avg_complexity = 10.0;
        history[4].test_coverage = 71.0;
        history[4].debt_ratio = 27.0;

        let thresholds = TrendThresholds::default();
        let report = TrendAnalyzer::new(&thresholds).analyze(&history);
        let kinds: Vec<(AlertType, Severity)> = report
            .alerts
            .iter()
            .map(|a| (a.alert_type, a.severity))
            .collect();

        assert_eq!(
            kinds,
            vec![
                (AlertType::QualityDrop, Severity::High),
                (AlertType::ComplexityHigh, Severity::Medium),
                (AlertType::DebtIncrease, Severity::Medium),
            ]
        );
    }

    #[test]
    fn empty_history_is_quiet() {
        let thresholds = TrendThresholds::default();
        let report = TrendAnalyzer::new(&thresholds).analyze(&[]);
        assert!(report.alerts.is_empty());
        assert!(report.predictions.is_empty());
    }
}
