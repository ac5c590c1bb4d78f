//! The impact analysis report and its derived sections.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::features::test_suite_name;
use super::{AffectedModule, ImpactPath, ImpactType};
use crate::domain::{ChangeKind, ChangeSet, Level, ModuleId, OverallRisk, RiskLevel};
use crate::risk::RiskAssessment;

const PERFORMANCE_KEYWORDS: [&str; 8] = [
    "cache", "database", "network", "algorithm", "loop", "query", "index", "memory",
];

/// Headline figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactSummary {
    /// Affected modules, changed ones included.
    pub total_affected_modules: usize,
    /// Traced paths.
    pub total_impact_paths: usize,
    /// Largest distance from the change.
    pub max_impact_depth: usize,
    /// Modules at high risk.
    pub high_risk_modules: usize,
    /// Modules at medium risk.
    pub medium_risk_modules: usize,
    /// Modules at low risk.
    pub low_risk_modules: usize,
    /// More than one language affected.
    pub cross_language_impact: bool,
    /// Affected modules per language.
    pub language_breakdown: BTreeMap<String, usize>,
    /// Affected modules per distance.
    pub impact_by_depth: BTreeMap<usize, usize>,
    /// Expected work.
    pub estimated_effort: Level,
    /// Overall risk class.
    pub overall_risk_level: OverallRisk,
}

/// Consequences for the test suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestImpact {
    /// Conventional suite names of affected modules.
    pub affected_test_suites: Vec<String>,
    /// Expected test work.
    pub estimated_test_effort: Level,
    /// Affected modules below 70% coverage.
    pub test_coverage_gaps: Vec<ModuleId>,
    /// Tests to run, by impact type.
    pub recommended_tests: Vec<String>,
}

/// Consequences for runtime performance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceImpact {
    /// Affected modules whose path suggests performance-sensitive code.
    pub affected_components: Vec<ModuleId>,
    /// Overall performance risk.
    pub performance_risk: Level,
    /// Benchmarks to run.
    pub recommended_benchmarks: Vec<String>,
    /// High-risk modules close to the change.
    pub potential_bottlenecks: Vec<ModuleId>,
}

/// A way to reduce the risk of shipping the change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigationStrategy {
    /// `strategy-N`, numbered after sorting.
    pub id: String,
    /// Display name.
    pub name: String,
    /// One-line summary.
    pub description: String,
    /// Higher first, 1 to 10.
    pub priority: u8,
    /// Effort to apply.
    pub effort: Level,
    /// Expected payoff.
    pub effectiveness: Level,
    /// Risk tags addressed.
    pub applicable_risks: Vec<String>,
    /// Ordered steps.
    pub steps: Vec<String>,
}

/// Everything known about the blast radius of a change set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactAnalysisReport {
    /// The analyzed change.
    pub change_set: ChangeSet,
    /// Headline figures.
    pub summary: ImpactSummary,
    /// Affected modules, highest score first.
    pub affected_modules: Vec<AffectedModule>,
    /// Traced paths, riskiest first.
    pub impact_paths: Vec<ImpactPath>,
    /// Overall risk.
    pub risk_assessment: RiskAssessment,
    /// Present when test impact analysis is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_impact: Option<TestImpact>,
    /// Performance section.
    pub performance_impact: PerformanceImpact,
    /// Top-level advice.
    pub recommendations: Vec<String>,
    /// Risk reduction, highest priority first.
    pub mitigation_strategies: Vec<MitigationStrategy>,
    /// Analysis time.
    pub generated_at: DateTime<Utc>,
}

pub(crate) fn build(
    change: &ChangeSet,
    affected: Vec<AffectedModule>,
    impact_paths: Vec<ImpactPath>,
    risk_assessment: RiskAssessment,
    analyze_test_impact: bool,
    at: DateTime<Utc>,
) -> ImpactAnalysisReport {
    ImpactAnalysisReport {
        summary: summarize(&affected, impact_paths.len(), risk_assessment.overall_risk),
        test_impact: analyze_test_impact.then(|| test_impact(change.change_kind, &affected)),
        performance_impact: performance_impact(&affected),
        recommendations: recommendations(change.change_kind, &affected, risk_assessment.overall_risk),
        mitigation_strategies: mitigation_strategies(&risk_assessment, &affected),
        change_set: change.clone(),
        affected_modules: affected,
        impact_paths,
        risk_assessment,
        generated_at: at,
    }
}

fn count_level(affected: &[AffectedModule], level: RiskLevel) -> usize {
    affected.iter().filter(|m| m.risk_level == level).count()
}

fn languages(affected: &[AffectedModule]) -> BTreeSet<&str> {
    affected.iter().map(|m| m.language.as_str()).collect()
}

fn poor_coverage(affected: &[AffectedModule]) -> usize {
    affected.iter().filter(|m| m.test_coverage < 0.5).count()
}

fn summarize(affected: &[AffectedModule], paths: usize, overall: OverallRisk) -> ImpactSummary {
    let mut language_breakdown = BTreeMap::new();
    let mut impact_by_depth = BTreeMap::new();
    for module in affected {
        *language_breakdown.entry(module.language.clone()).or_default() += 1;
        *impact_by_depth.entry(module.distance_from_change).or_default() += 1;
    }
    ImpactSummary {
        total_affected_modules: affected.len(),
        total_impact_paths: paths,
        max_impact_depth: affected.iter().map(|m| m.distance_from_change).max().unwrap_or(0),
        high_risk_modules: count_level(affected, RiskLevel::High),
        medium_risk_modules: count_level(affected, RiskLevel::Medium),
        low_risk_modules: count_level(affected, RiskLevel::Low),
        cross_language_impact: language_breakdown.len() > 1,
        language_breakdown,
        impact_by_depth,
        estimated_effort: overall_effort(affected, overall),
        overall_risk_level: overall,
    }
}

fn overall_effort(affected: &[AffectedModule], overall: OverallRisk) -> Level {
    #[allow(clippy::cast_precision_loss)]
    let mut score = affected.len() as f64 * 0.5;
    score += affected
        .iter()
        .map(|m| match m.risk_level {
            RiskLevel::High => 3.0,
            RiskLevel::Medium => 1.5,
            RiskLevel::Low => 0.5,
            RiskLevel::Minimal => 0.0,
        })
        .sum::<f64>();
    score *= match overall {
        OverallRisk::Critical => 2.0,
        OverallRisk::High => 1.5,
        OverallRisk::Medium => 1.2,
        OverallRisk::Low => 1.0,
    };
    if score > 50.0 {
        Level::High
    } else if score > 20.0 {
        Level::Medium
    } else {
        Level::Low
    }
}

/// Keeps the first occurrence of each item.
fn dedup<T: Clone + Eq + std::hash::Hash>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|i| seen.insert(i.clone())).collect()
}

fn recommended_test(module: &ModuleId, impact: ImpactType) -> Option<String> {
    match impact {
        ImpactType::Compile => Some(format!("Run compilation tests for {module}")),
        ImpactType::Runtime => Some(format!("Run integration tests for {module}")),
        ImpactType::Interface => Some(format!("Run contract tests for {module}")),
        ImpactType::Behavior => Some(format!("Run behavioral tests for {module}")),
        ImpactType::Breaking => {
            Some(format!("Run full test suite for {module} - breaking changes detected"))
        }
        _ => None,
    }
}

fn test_impact(change: ChangeKind, affected: &[AffectedModule]) -> TestImpact {
    let suites = affected
        .iter()
        .map(|m| test_suite_name(&m.module_path, &m.language))
        .collect();
    let gaps = affected
        .iter()
        .filter(|m| m.test_coverage < 0.7)
        .map(|m| m.module_path.clone())
        .collect();
    let tests = affected
        .iter()
        .flat_map(|m| {
            m.impact_type
                .iter()
                .filter_map(|&t| recommended_test(&m.module_path, t))
        })
        .collect();

    #[allow(clippy::cast_precision_loss)]
    let adjusted = affected.len() as f64 * change.test_effort_multiplier();
    let high = count_level(affected, RiskLevel::High);
    let estimated_test_effort = if adjusted > 20.0 || high > 5 {
        Level::High
    } else if adjusted > 10.0 || high > 2 {
        Level::Medium
    } else {
        Level::Low
    };

    TestImpact {
        affected_test_suites: dedup(suites),
        estimated_test_effort,
        test_coverage_gaps: dedup(gaps),
        recommended_tests: dedup(tests),
    }
}

fn performance_impact(affected: &[AffectedModule]) -> PerformanceImpact {
    let mut components = Vec::new();
    let mut benchmarks = Vec::new();
    let mut bottlenecks = Vec::new();
    for module in affected {
        let lower = module.module_path.as_str().to_lowercase();
        if PERFORMANCE_KEYWORDS.iter().any(|k| lower.contains(k)) {
            components.push(module.module_path.clone());
            benchmarks.push(format!("Benchmark {} performance", module.module_path));
        }
        if module.risk_level == RiskLevel::High && module.distance_from_change <= 2 {
            bottlenecks.push(module.module_path.clone());
        }
    }

    let performance_risk = if components.len() > 5 || bottlenecks.len() > 3 {
        Level::High
    } else if components.len() > 2 || bottlenecks.len() > 1 {
        Level::Medium
    } else {
        Level::Low
    };

    PerformanceImpact {
        affected_components: dedup(components),
        performance_risk,
        recommended_benchmarks: dedup(benchmarks),
        potential_bottlenecks: dedup(bottlenecks),
    }
}

fn recommendations(change: ChangeKind, affected: &[AffectedModule], overall: OverallRisk) -> Vec<String> {
    let mut out: Vec<String> = match overall {
        OverallRisk::Critical => vec![
            "Critical risk detected - Consider breaking changes into smaller parts",
            "Require senior engineer review before deployment",
            "Implement comprehensive rollback plan",
        ],
        OverallRisk::High => vec![
            "High risk - Thorough testing and staged rollout recommended",
            "Consider feature flags for safer deployment",
        ],
        OverallRisk::Medium => vec!["Moderate risk - Standard testing and review processes apply"],
        OverallRisk::Low => vec!["Low risk - Standard deployment procedures sufficient"],
    }
    .into_iter()
    .map(ToString::to_string)
    .collect();

    if affected.len() > 20 {
        out.push("Large impact scope - Consider phased deployment".to_string());
    }
    let poor = poor_coverage(affected);
    if poor > 3 {
        out.push(format!(
            "{poor} modules have poor test coverage - Prioritize test improvements"
        ));
    }
    if languages(affected).len() > 1 {
        out.push("Cross-language impact detected - Ensure integration testing".to_string());
    }
    match change {
        ChangeKind::Deletion => {
            out.push("Deletion changes - Verify no breaking dependencies remain".to_string());
        }
        ChangeKind::Refactor => {
            out.push("Refactoring changes - Ensure behavior equivalence through testing".to_string());
        }
        ChangeKind::Addition | ChangeKind::Modification => {}
    }
    out
}

struct Mitigation {
    name: &'static str,
    description: &'static str,
    priority: u8,
    effort: Level,
    effectiveness: Level,
    risk: &'static str,
    steps: &'static [&'static str],
}

const MONITORING: Mitigation = Mitigation {
    name: "High-Risk Module Monitoring",
    description: "Implement enhanced monitoring for high-risk modules",
    priority: 9,
    effort: Level::Medium,
    effectiveness: Level::High,
    risk: "high_risk_modules",
    steps: &[
        "Set up detailed logging for high-risk modules",
        "Implement health checks and alerts",
        "Create rollback procedures",
        "Schedule post-deployment monitoring",
    ],
};

const COVERAGE: Mitigation = Mitigation {
    name: "Test Coverage Improvement",
    description: "Improve test coverage for affected modules",
    priority: 7,
    effort: Level::High,
    effectiveness: Level::High,
    risk: "poor_test_coverage",
    steps: &[
        "Identify critical paths in affected modules",
        "Write unit tests for core functionality",
        "Add integration tests for module interactions",
        "Implement mutation testing to verify test quality",
    ],
};

const PATH_PROTECTION: Mitigation = Mitigation {
    name: "Critical Path Protection",
    description: "Protect critical dependency paths from failures",
    priority: 8,
    effort: Level::Medium,
    effectiveness: Level::High,
    risk: "critical_paths",
    steps: &[
        "Implement circuit breakers for critical paths",
        "Add redundancy where possible",
        "Create fallback mechanisms",
        "Monitor path health continuously",
    ],
};

const INTEGRATION: Mitigation = Mitigation {
    name: "Cross-Language Integration Testing",
    description: "Ensure proper integration across different programming languages",
    priority: 6,
    effort: Level::Medium,
    effectiveness: Level::Medium,
    risk: "cross_language_complexity",
    steps: &[
        "Set up end-to-end test environments",
        "Test API contracts between languages",
        "Verify data serialization/deserialization",
        "Monitor inter-service communication",
    ],
};

const STAGED: Mitigation = Mitigation {
    name: "Staged Deployment",
    description: "Deploy changes in stages to minimize risk",
    priority: 10,
    effort: Level::Low,
    effectiveness: Level::High,
    risk: "overall_high_risk",
    steps: &[
        "Deploy to development environment first",
        "Run comprehensive test suite",
        "Deploy to staging with production-like data",
        "Monitor for 24 hours before production deployment",
        "Deploy to production during low-traffic periods",
    ],
};

fn mitigation_strategies(assessment: &RiskAssessment, affected: &[AffectedModule]) -> Vec<MitigationStrategy> {
    let candidates = [
        (&MONITORING, !assessment.high_risk_modules.is_empty()),
        (&COVERAGE, poor_coverage(affected) > 0),
        (&PATH_PROTECTION, !assessment.critical_paths.is_empty()),
        (&INTEGRATION, languages(affected).len() > 1),
        (
            &STAGED,
            matches!(assessment.overall_risk, OverallRisk::Critical | OverallRisk::High),
        ),
    ];
    let mut chosen: Vec<&Mitigation> = candidates
        .into_iter()
        .filter_map(|(m, applies)| applies.then_some(m))
        .collect();
    chosen.sort_by(|a, b| b.priority.cmp(&a.priority));

    chosen
        .into_iter()
        .enumerate()
        .map(|(n, m)| MitigationStrategy {
            id: format!("strategy-{}", n + 1),
            name: m.name.to_string(),
            description: m.description.to_string(),
            priority: m.priority,
            effort: m.effort,
            effectiveness: m.effectiveness,
            applicable_risks: vec![m.risk.to_string()],
            steps: m.steps.iter().map(ToString::to_string).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impact::ImpactDirection;
    use crate::risk::RiskMetrics;
    use rstest::rstest;

    fn module(path: &str, level: RiskLevel, distance: usize, coverage: f64) -> AffectedModule {
        AffectedModule {
            module_path: path.into(),
            language: "go".to_string(),
            impact_score: 5.0,
            risk_level: level,
            impact_type: vec![ImpactType::Immediate, ImpactType::Compile, ImpactType::Breaking],
            distance_from_change: distance,
            direction: ImpactDirection::Forward,
            dependency_type: None,
            dependency_strength: None,
            reason_for_impact: String::new(),
            affected_features: Vec::new(),
            test_coverage: coverage,
            last_modified: None,
        }
    }

    fn assessment(overall: OverallRisk, high: &[&str], critical_paths: &[&str]) -> RiskAssessment {
        RiskAssessment {
            overall_risk: overall,
            risk_factors: Vec::new(),
            mitigating_factors: Vec::new(),
            high_risk_modules: high.iter().map(|h| ModuleId::from(*h)).collect(),
            critical_paths: critical_paths.iter().map(ToString::to_string).collect(),
            risk_metrics: RiskMetrics::default(),
        }
    }

    #[test]
    fn test_impact_lists_suites_gaps_and_deduplicated_tests() {
        let affected = vec![
            module("pkg/cache", RiskLevel::High, 1, 0.6),
            module("pkg/cache", RiskLevel::High, 1, 0.6),
            module("pkg/api", RiskLevel::Low, 2, 0.9),
        ];

        let got = test_impact(ChangeKind::Deletion, &affected);

        assert_eq!(got.affected_test_suites, vec!["cache_test", "api_test"]);
        assert_eq!(got.test_coverage_gaps, vec![ModuleId::from("pkg/cache")]);
        assert_eq!(
            got.recommended_tests,
            vec![
                "Run compilation tests for pkg/cache",
                "Run full test suite for pkg/cache - breaking changes detected",
                "Run compilation tests for pkg/api",
                "Run full test suite for pkg/api - breaking changes detected",
            ]
        );
        assert_eq!(got.estimated_test_effort, Level::Low);
    }

    #[test]
    fn performance_flags_keywords_and_close_high_risk_modules() {
        let affected = vec![
            module("db/query", RiskLevel::High, 1, 0.8),
            module("svc/Cache", RiskLevel::High, 2, 0.8),
            module("web/ui", RiskLevel::High, 3, 0.8),
        ];

        let got = performance_impact(&affected);

        assert_eq!(
            got.affected_components,
            vec![ModuleId::from("db/query"), ModuleId::from("svc/Cache")]
        );
        assert_eq!(got.recommended_benchmarks[0], "Benchmark db/query performance");
        assert_eq!(got.potential_bottlenecks.len(), 2);
        assert_eq!(got.performance_risk, Level::Medium);
    }

    #[rstest]
    #[case(OverallRisk::Low, 1)]
    #[case(OverallRisk::Medium, 1)]
    #[case(OverallRisk::High, 2)]
    #[case(OverallRisk::Critical, 3)]
    fn recommendation_count_per_risk(#[case] overall: OverallRisk, #[case] expected: usize) {
        let affected = vec![module("a", RiskLevel::Low, 1, 0.8)];
        assert_eq!(
            recommendations(ChangeKind::Modification, &affected, overall).len(),
            expected
        );
    }

    #[test]
    fn deletion_and_poor_coverage_add_recommendations() {
        let affected: Vec<AffectedModule> = (0..4)
            .map(|i| module(&format!("m{i}"), RiskLevel::Low, 1, 0.1))
            .collect();

        let got = recommendations(ChangeKind::Deletion, &affected, OverallRisk::Low);

        assert_eq!(
            got,
            vec![
                "Low risk - Standard deployment procedures sufficient",
                "4 modules have poor test coverage - Prioritize test improvements",
                "Deletion changes - Verify no breaking dependencies remain",
            ]
        );
    }

    #[test]
    fn strategies_are_sorted_by_priority_and_numbered() {
        let affected = vec![module("a", RiskLevel::High, 1, 0.3)];
        let risk = assessment(OverallRisk::High, &["a"], &["path-1"]);

        let got = mitigation_strategies(&risk, &affected);
        let names: Vec<(&str, &str, u8)> = got
            .iter()
            .map(|s| (s.id.as_str(), s.name.as_str(), s.priority))
            .collect();

        assert_eq!(
            names,
            vec![
                ("strategy-1", "Staged Deployment", 10),
                ("strategy-2", "High-Risk Module Monitoring", 9),
                ("strategy-3", "Critical Path Protection", 8),
                ("strategy-4", "Test Coverage Improvement", 7),
            ]
        );
        assert_eq!(got[0].steps.len(), 5);
    }

    #[test]
    fn effort_scales_with_risk() {
        let affected: Vec<AffectedModule> = (0..8)
            .map(|i| module(&format!("m{i}"), RiskLevel::High, 1, 0.8))
            .collect();

        // 8 × 0.5 + 8 × 3 = 28
        assert_eq!(overall_effort(&affected, OverallRisk::Low), Level::Medium);
        assert_eq!(overall_effort(&affected, OverallRisk::Critical), Level::High);
    }
}
