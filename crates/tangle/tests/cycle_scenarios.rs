//! End-to-end circular dependency analysis.

use std::collections::BTreeSet;

use proptest::prelude::*;
use rstest::rstest;
use tangle::enrich::CycleType;
use tangle::{CircularAnalyzer, CycleConfig, DependencyEdge, DependencyKind, DependencyStrength, Severity};

mod common;
use common::{strong, weak};

fn analyze(edges: &[DependencyEdge]) -> tangle::CircularDependencyReport {
    let config = CycleConfig::default();
    CircularAnalyzer::new(&config).unwrap().analyze(&[], edges)
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn direct_cycle_is_critical() {
    let report = analyze(&[strong("A", "B", "go"), strong("B", "A", "go")]);
    let cycles: Vec<_> = report.cycles().collect();

    assert_eq!(cycles.len(), 1);
    let cycle = cycles[0];
    assert_eq!(cycle.length, 2);
    assert_eq!(cycle.cycle_type, CycleType::Direct);
    assert_eq!(cycle.severity, Severity::Critical);
    assert_eq!(cycle.cycle.first(), cycle.cycle.last());
    assert!(cycle.id.starts_with("cycle-"));
}

#[test]
fn cross_language_cycle_lists_both_languages() {
    let report = analyze(&[strong("A", "B", "go"), strong("B", "A", "python")]);
    let cycles: Vec<_> = report.cycles().collect();

    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].cycle_type, CycleType::CrossLanguage);
    assert_eq!(cycles[0].languages, vec!["go", "python"]);
    assert!(cycles[0].is_cross_language());
    assert_eq!(report.summary.language_breakdown.get("go"), Some(&1));
    assert_eq!(report.summary.language_breakdown.get("python"), Some(&1));
}

#[test]
fn acyclic_graph_reports_nothing() {
    let report = analyze(&[strong("A", "B", "go"), strong("B", "C", "go")]);

    assert_eq!(report.summary.total_cycles, 0);
    assert!(report.cycles().next().is_none());
    assert!(!report.completeness.truncated);
    assert!(report.recommendations[0].starts_with("No circular dependencies detected"));
}

#[test]
fn empty_input_is_a_valid_empty_report() {
    let report = analyze(&[]);
    assert_eq!(report.summary.total_cycles, 0);
    assert!((report.impact_analysis.testability_score - 10.0).abs() < f64::EPSILON);
}

#[rstest]
#[case(2, Severity::Critical)]
#[case(3, Severity::High)]
#[case(5, Severity::Medium)]
#[case(6, Severity::Low)]
fn ring_severity_follows_length(#[case] len: usize, #[case] expected: Severity) {
    let edges: Vec<DependencyEdge> = (0..len)
        .map(|i| strong(&format!("m{i}"), &format!("m{}", (i + 1) % len), "go"))
        .collect();

    let report = analyze(&edges);
    let cycles: Vec<_> = report.cycles().collect();

    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].severity, expected);
}

#[test]
fn weak_edges_are_skipped_unless_weak_cycles_are_analyzed() {
    let edges = [strong("A", "B", "go"), weak("B", "A", "go")];
    let mut config = CycleConfig::default();
    config.analyze_weak_cycles = false;

    let strict = CircularAnalyzer::new(&config).unwrap().analyze(&[], &edges);
    assert_eq!(strict.summary.total_cycles, 0);

    config.analyze_weak_cycles = true;
    let lenient = CircularAnalyzer::new(&config).unwrap().analyze(&[], &edges);
    assert_eq!(lenient.summary.total_cycles, 1);
}

#[test]
fn dense_graph_truncation_is_observable() {
    let n = 8;
    let mut edges = Vec::new();
    for a in 0..n {
        for b in 0..n {
            if a != b {
                edges.push(strong(&format!("m{a}"), &format!("m{b}"), "go"));
            }
        }
    }

    let report = analyze(&edges);

    assert!(report.completeness.truncated);
    assert!(!report.completeness.caps_hit.is_empty());
    let config = CycleConfig::default();
    assert!(report.summary.total_cycles <= config.max_total_cycles + config.max_cycles_per_scc);
}

// ============================================================================
// Properties
// ============================================================================

fn arb_edges() -> impl Strategy<Value = Vec<DependencyEdge>> {
    let kinds = prop_oneof![
        Just(DependencyKind::Import),
        Just(DependencyKind::Call),
        Just(DependencyKind::Inherit),
    ];
    let strengths = prop_oneof![
        Just(DependencyStrength::Strong),
        Just(DependencyStrength::Weak),
        Just(DependencyStrength::Optional),
    ];
    let langs = prop_oneof![Just("go"), Just("python")];
    prop::collection::vec((0..7u8, 0..7u8, kinds, strengths, langs), 0..24).prop_map(|raw| {
        raw.into_iter()
            .filter(|(a, b, ..)| a != b)
            .map(|(a, b, kind, strength, lang)| {
                DependencyEdge::new(format!("m{a}"), format!("m{b}"), kind, strength, lang)
            })
            .collect()
    })
}

fn keys(report: &tangle::CircularDependencyReport) -> BTreeSet<String> {
    report.cycles().map(|c| c.id.clone()).collect()
}

proptest! {
    #[test]
    fn reported_cycles_are_closed_and_real(edges in arb_edges()) {
        let report = analyze(&edges);
        let declared: BTreeSet<(String, String)> = edges
            .iter()
            .map(|e| (e.from.to_string(), e.to.to_string()))
            .collect();

        for cycle in report.cycles() {
            prop_assert_eq!(cycle.cycle.first(), cycle.cycle.last());
            prop_assert_eq!(cycle.length, cycle.cycle.len() - 1);
            prop_assert!(cycle.length >= 2);
            let members: BTreeSet<_> = cycle.members().collect();
            prop_assert_eq!(members.len(), cycle.length);
            for hop in cycle.cycle.windows(2) {
                prop_assert!(declared.contains(&(hop[0].to_string(), hop[1].to_string())));
            }
            for point in &cycle.breaking_points {
                prop_assert!((0.0..=1.0).contains(&point.confidence));
            }
        }
    }

    #[test]
    fn detection_ignores_input_order(edges in arb_edges()) {
        let mut reversed = edges.clone();
        reversed.reverse();

        let a = analyze(&edges);
        let b = analyze(&reversed);

        prop_assert_eq!(keys(&a), keys(&b));
        prop_assert_eq!(keys(&a), keys(&analyze(&edges)));
    }

    #[test]
    fn system_scores_stay_in_range(edges in arb_edges()) {
        let impact = analyze(&edges).impact_analysis;
        prop_assert!((0.0..=10.0).contains(&impact.system_complexity));
        prop_assert!((0.0..=10.0).contains(&impact.testability_score));
        prop_assert!((0.0..=10.0).contains(&impact.maintainability_score));
    }
}
