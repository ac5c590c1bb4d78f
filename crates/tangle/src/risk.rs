//! Risk scoring for a change set.
//!
//! Five sub-scores, each in `[0, 10]`, are combined with fixed weights:
//!
//! | Sub-score          | Weight | Source                                   |
//! |--------------------|--------|------------------------------------------|
//! | change complexity  | 0.2    | changed modules × 1.5                    |
//! | impact scope       | 0.3    | affected modules × 0.5                   |
//! | test coverage risk | 0.2    | (1 − mean coverage) × 10                 |
//! | dependency risk    | 0.2    | longest path + mean path weight × 0.5    |
//! | historical risk    | 0.1    | by change kind                           |
//!
//! The overall score is classified critical at 8, high at 6 and medium
//! at 3.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RiskThresholds;
use crate::domain::{ChangeKind, ChangeSet, ModuleId, OverallRisk, RiskLevel};
use crate::impact::{AffectedModule, ImpactPath};

/// Modules modified within this many days count as fresh.
const RECENT_DAYS: i64 = 30;

/// The five sub-scores and their combination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// How large the change itself is.
    pub change_complexity: f64,
    /// How far the change reaches.
    pub impact_scope: f64,
    /// Risk from missing tests.
    pub test_coverage_risk: f64,
    /// Risk from long or heavy paths.
    pub dependency_risk: f64,
    /// Risk typical of the change kind.
    pub historical_risk: f64,
    /// Weighted combination in `[0, 10]`.
    pub overall_risk_score: f64,
}

/// Overall risk of a change set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Class of the overall score.
    pub overall_risk: OverallRisk,
    /// Conditions raising risk.
    pub risk_factors: Vec<String>,
    /// Conditions lowering risk.
    pub mitigating_factors: Vec<String>,
    /// Affected modules at high risk.
    pub high_risk_modules: Vec<ModuleId>,
    /// IDs of impact paths at or above the high threshold.
    pub critical_paths: Vec<String>,
    /// Sub-scores.
    pub risk_metrics: RiskMetrics,
}

/// Classifies an overall risk score.
#[must_use]
pub fn classify(score: f64) -> OverallRisk {
    if score >= 8.0 {
        OverallRisk::Critical
    } else if score >= 6.0 {
        OverallRisk::High
    } else if score >= 3.0 {
        OverallRisk::Medium
    } else {
        OverallRisk::Low
    }
}

#[allow(clippy::cast_precision_loss)]
fn metrics(change: &ChangeSet, affected: &[AffectedModule], paths: &[ImpactPath]) -> RiskMetrics {
    let change_complexity = (change.changed_modules.len() as f64 * 1.5).min(10.0);
    let impact_scope = (affected.len() as f64 * 0.5).min(10.0);

    let test_coverage_risk = if affected.is_empty() {
        0.0
    } else {
        let mean = affected.iter().map(|m| m.test_coverage).sum::<f64>() / affected.len() as f64;
        (1.0 - mean) * 10.0
    };

    let longest = paths.iter().map(|p| p.path_length).max().unwrap_or(0);
    let mut dependency_risk = longest as f64;
    if !paths.is_empty() {
        let mean_weight = paths.iter().map(|p| p.total_weight).sum::<f64>() / paths.len() as f64;
        dependency_risk += mean_weight * 0.5;
    }
    let dependency_risk = dependency_risk.min(10.0);

    let historical_risk = change.change_kind.historical_risk();
    let overall = change_complexity * 0.2
        + impact_scope * 0.3
        + test_coverage_risk * 0.2
        + dependency_risk * 0.2
        + historical_risk * 0.1;

    RiskMetrics {
        change_complexity,
        impact_scope,
        test_coverage_risk,
        dependency_risk,
        historical_risk,
        overall_risk_score: overall.clamp(0.0, 10.0),
    }
}

fn risk_factors(change: &ChangeSet, affected: &[AffectedModule], paths: &[ImpactPath]) -> Vec<String> {
    let mut factors = Vec::new();
    if change.changed_modules.len() > 5 {
        factors.push("Large number of changed modules".to_string());
    }
    if change.change_kind == ChangeKind::Deletion {
        factors.push("Deletion changes have higher risk of breaking dependencies".to_string());
    }

    let high = affected.iter().filter(|m| m.risk_level == RiskLevel::High).count();
    if high > 3 {
        factors.push(format!("{high} modules at high risk"));
    }
    let poor = affected.iter().filter(|m| m.test_coverage < 0.5).count();
    if poor > 2 {
        factors.push(format!("{poor} modules with poor test coverage"));
    }
    let complex = paths.iter().filter(|p| p.path_length > 4).count();
    if complex > 0 {
        factors.push(format!("{complex} complex dependency paths"));
    }
    let languages: BTreeSet<&str> = affected.iter().map(|m| m.language.as_str()).collect();
    if languages.len() > 1 {
        factors.push("Cross-language dependencies increase complexity".to_string());
    }
    factors
}

fn mitigating_factors(change: &ChangeSet, affected: &[AffectedModule], at: DateTime<Utc>) -> Vec<String> {
    let mut factors = Vec::new();
    let good = affected.iter().filter(|m| m.test_coverage > 0.8).count();
    if good > 0 {
        factors.push(format!("{good} modules have good test coverage"));
    }
    if change.change_kind == ChangeKind::Addition {
        factors.push("Addition changes are generally safer".to_string());
    }
    let fresh = affected
        .iter()
        .filter_map(|m| m.last_modified)
        .filter(|&t| t <= at && at - t < Duration::days(RECENT_DAYS))
        .count();
    if fresh > affected.len() / 2 {
        factors.push("Many affected modules were recently modified (code is fresh)".to_string());
    }
    factors
}

/// Assesses the risk of `change` given what it affects.
///
/// `at` anchors the freshness check; nothing reads the clock.
#[must_use]
pub fn assess(
    change: &ChangeSet,
    affected: &[AffectedModule],
    paths: &[ImpactPath],
    thresholds: &RiskThresholds,
    at: DateTime<Utc>,
) -> RiskAssessment {
    let risk_metrics = metrics(change, affected, paths);
    let overall_risk = classify(risk_metrics.overall_risk_score);
    tracing::debug!(
        score = risk_metrics.overall_risk_score,
        risk = %overall_risk,
        "Assessed change risk"
    );
    RiskAssessment {
        overall_risk,
        risk_factors: risk_factors(change, affected, paths),
        mitigating_factors: mitigating_factors(change, affected, at),
        high_risk_modules: affected
            .iter()
            .filter(|m| m.risk_level == RiskLevel::High)
            .map(|m| m.module_path.clone())
            .collect(),
        critical_paths: paths
            .iter()
            .filter(|p| p.risk_score >= thresholds.high)
            .map(|p| p.id.clone())
            .collect(),
        risk_metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impact::{ImpactDirection, PathType};
    use rstest::rstest;

    fn module(path: &str, coverage: f64, level: RiskLevel, language: &str) -> AffectedModule {
        AffectedModule {
            module_path: path.into(),
            language: language.to_string(),
            impact_score: 5.0,
            risk_level: level,
            impact_type: Vec::new(),
            distance_from_change: 1,
            direction: ImpactDirection::Forward,
            dependency_type: None,
            dependency_strength: None,
            reason_for_impact: String::new(),
            affected_features: Vec::new(),
            test_coverage: coverage,
            last_modified: None,
        }
    }

    fn path(id: &str, length: usize, weight: f64, risk: f64) -> ImpactPath {
        ImpactPath {
            id: id.to_string(),
            source_module: "a".into(),
            target_module: "b".into(),
            path: Vec::new(),
            path_length: length,
            total_weight: weight,
            risk_score: risk,
            path_type: PathType::Transitive,
            within_cycle: false,
            direction: ImpactDirection::Forward,
            critical_edges: Vec::new(),
            breaking_points: Vec::new(),
        }
    }

    #[rstest]
    #[case(8.0, OverallRisk::Critical)]
    #[case(7.99, OverallRisk::High)]
    #[case(6.0, OverallRisk::High)]
    #[case(3.0, OverallRisk::Medium)]
    #[case(2.99, OverallRisk::Low)]
    fn classification_bands(#[case] score: f64, #[case] expected: OverallRisk) {
        assert_eq!(classify(score), expected);
    }

    #[test]
    fn sub_scores_combine_with_fixed_weights() {
        let change = ChangeSet::new("c", ["a", "b"], ChangeKind::Deletion, Utc::now());
        let affected = vec![
            module("a", 0.2, RiskLevel::High, "go"),
            module("b", 0.6, RiskLevel::Low, "go"),
        ];
        let paths = vec![path("path-1", 2, 6.0, 8.0), path("path-2", 1, 2.0, 1.0)];

        let got = assess(&change, &affected, &paths, &RiskThresholds::default(), Utc::now());
        let m = &got.risk_metrics;

        assert!((m.change_complexity - 3.0).abs() < 1e-9);
        assert!((m.impact_scope - 1.0).abs() < 1e-9);
        assert!((m.test_coverage_risk - 6.0).abs() < 1e-9);
        assert!((m.dependency_risk - 4.0).abs() < 1e-9);
        assert!((m.historical_risk - 8.0).abs() < 1e-9);
        assert!((m.overall_risk_score - 3.7).abs() < 1e-9);
        assert_eq!(got.overall_risk, OverallRisk::Medium);
        assert_eq!(got.critical_paths, vec!["path-1"]);
        assert_eq!(got.high_risk_modules, vec![ModuleId::from("a")]);
        assert_eq!(
            got.risk_factors,
            vec!["Deletion changes have higher risk of breaking dependencies"]
        );
    }

    #[test]
    fn empty_impact_only_carries_change_risk() {
        let change = ChangeSet::new("c", Vec::<&str>::new(), ChangeKind::Addition, Utc::now());

        let got = assess(&change, &[], &[], &RiskThresholds::default(), Utc::now());

        assert!((got.risk_metrics.overall_risk_score - 0.3).abs() < 1e-9);
        assert_eq!(got.overall_risk, OverallRisk::Low);
        assert_eq!(got.mitigating_factors, vec!["Addition changes are generally safer"]);
    }

    #[test]
    fn freshness_is_measured_from_the_analysis_time() {
        let at = Utc::now();
        let change = ChangeSet::new("c", ["a"], ChangeKind::Modification, at);
        let mut fresh = module("a", 0.9, RiskLevel::Low, "go");
        fresh.last_modified = Some(at - Duration::days(3));
        let mut stale = module("b", 0.9, RiskLevel::Low, "python");
        stale.last_modified = Some(at - Duration::days(90));
        let mut also_fresh = module("c", 0.9, RiskLevel::Low, "go");
        also_fresh.last_modified = Some(at - Duration::days(29));

        let got = assess(
            &change,
            &[fresh, stale, also_fresh],
            &[],
            &RiskThresholds::default(),
            at,
        );

        assert_eq!(
            got.mitigating_factors,
            vec![
                "3 modules have good test coverage",
                "Many affected modules were recently modified (code is fresh)",
            ]
        );
        assert_eq!(
            got.risk_factors,
            vec!["Cross-language dependencies increase complexity"]
        );
    }

    #[test]
    fn future_timestamps_are_not_fresh() {
        let at = Utc::now();
        let change = ChangeSet::new("c", ["a"], ChangeKind::Modification, at);
        let mut ahead = module("a", 0.5, RiskLevel::Low, "go");
        ahead.last_modified = Some(at + Duration::days(5));
        let mut also_ahead = module("b", 0.5, RiskLevel::Low, "go");
        also_ahead.last_modified = Some(at + Duration::days(400));

        let got = assess(
            &change,
            &[ahead, also_ahead],
            &[],
            &RiskThresholds::default(),
            at,
        );

        assert!(got.mitigating_factors.is_empty(), "{:?}", got.mitigating_factors);
    }
}
