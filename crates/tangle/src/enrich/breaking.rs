//! Breaking points: which edge of a cycle to cut, and how.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::CycleEdge;
use crate::domain::{DependencyKind, DependencyStrength, Level, ModuleId};

/// A technique for removing one dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Put an interface between the two modules.
    Interface,
    /// Inject the dependency instead of referencing it.
    Injection,
    /// Move shared code into a new module.
    Extract,
    /// Fold the two modules together.
    Merge,
    /// Replace the call with an event.
    Event,
    /// Anything else.
    Refactor,
}

/// Strategy dispatch. The first row matching the edge's kind, and its
/// strength when the row names one, wins.
const STRATEGY_TABLE: &[(DependencyKind, Option<DependencyStrength>, Strategy)] = &[
    (DependencyKind::Inherit, None, Strategy::Interface),
    (DependencyKind::Require, Some(DependencyStrength::Weak), Strategy::Injection),
    (DependencyKind::Import, Some(DependencyStrength::Weak), Strategy::Injection),
    (DependencyKind::Require, None, Strategy::Extract),
    (DependencyKind::Import, None, Strategy::Extract),
    (DependencyKind::Include, None, Strategy::Merge),
    (DependencyKind::Call, None, Strategy::Event),
];

impl Strategy {
    /// Looks up the strategy for an edge.
    #[must_use]
    pub fn for_edge(kind: DependencyKind, strength: DependencyStrength) -> Self {
        STRATEGY_TABLE
            .iter()
            .find(|(k, s, _)| *k == kind && s.is_none_or(|s| s == strength))
            .map_or(Self::Refactor, |(_, _, strategy)| *strategy)
    }

    /// Effort needed to apply the strategy.
    #[must_use]
    pub fn effort(self) -> Level {
        match self {
            Self::Merge => Level::Low,
            Self::Interface | Self::Injection | Self::Refactor => Level::Medium,
            Self::Extract | Self::Event => Level::High,
        }
    }

    /// Human-readable advice for cutting `from → to`.
    #[must_use]
    pub fn describe(self, from: &ModuleId, to: &ModuleId) -> String {
        match self {
            Self::Interface => format!("Introduce an interface between {from} and {to}"),
            Self::Injection => format!("Use dependency injection to inject {to} into {from}"),
            Self::Extract => format!("Extract common functionality from {from} and {to}"),
            Self::Merge => format!("Consider merging {from} and {to} if closely related"),
            Self::Event => "Replace direct call with event-based communication".to_string(),
            Self::Refactor => format!("Refactor the dependency between {from} and {to}"),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Interface => "interface",
            Self::Injection => "injection",
            Self::Extract => "extract",
            Self::Merge => "merge",
            Self::Event => "event",
            Self::Refactor => "refactor",
        })
    }
}

/// A candidate edge to cut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakingPoint {
    /// Depending module.
    pub from_node: ModuleId,
    /// Module depended upon.
    pub to_node: ModuleId,
    /// How good a cut this is, in `[0, 1]`.
    pub confidence: f64,
    /// How disruptive the cut is.
    pub impact: Level,
    /// Suggested technique.
    pub strategy: Strategy,
    /// Advice text.
    pub description: String,
    /// Effort of the technique.
    pub effort: Level,
    /// Why this edge.
    pub rationale: String,
}

/// Scores every edge of a cycle, best cut first.
#[must_use]
pub fn breaking_points(edges: &[CycleEdge], length: usize, cross_language: bool) -> Vec<BreakingPoint> {
    let mut points: Vec<BreakingPoint> = edges
        .iter()
        .map(|edge| {
            let strategy = Strategy::for_edge(edge.kind, edge.strength);
            BreakingPoint {
                from_node: edge.from.clone(),
                to_node: edge.to.clone(),
                confidence: confidence(edge, cross_language),
                impact: impact(edge.strength, length),
                strategy,
                description: strategy.describe(&edge.from, &edge.to),
                effort: strategy.effort(),
                rationale: rationale(edge, cross_language),
            }
        })
        .collect();
    points.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    points
}

fn confidence(edge: &CycleEdge, cross_language: bool) -> f64 {
    let mut confidence = 0.5;
    confidence += match edge.strength {
        DependencyStrength::Optional => 0.4,
        DependencyStrength::Weak => 0.2,
        DependencyStrength::Strong => -0.1,
    };
    confidence += match edge.kind {
        DependencyKind::Include => 0.2,
        DependencyKind::Call => 0.1,
        DependencyKind::Inherit => -0.2,
        DependencyKind::Import | DependencyKind::Require | DependencyKind::Compose => 0.0,
    };
    if cross_language {
        confidence += 0.1;
    }
    f64::clamp(confidence, 0.0, 1.0)
}

fn impact(strength: DependencyStrength, length: usize) -> Level {
    match strength {
        DependencyStrength::Optional => Level::Low,
        DependencyStrength::Weak => Level::Medium,
        DependencyStrength::Strong if length <= 3 => Level::High,
        DependencyStrength::Strong => Level::Medium,
    }
}

fn rationale(edge: &CycleEdge, cross_language: bool) -> String {
    let mut reasons = Vec::new();
    if edge.strength != DependencyStrength::Strong {
        reasons.push("weak dependency makes breaking easier");
    }
    if edge.kind == DependencyKind::Include {
        reasons.push("include dependencies are often refactorable");
    }
    if cross_language {
        reasons.push("cross-language boundary provides natural breaking point");
    }
    if reasons.is_empty() {
        "Breaking this dependency would help resolve the circular dependency".to_string()
    } else {
        reasons.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn edge(kind: DependencyKind, strength: DependencyStrength) -> CycleEdge {
        CycleEdge {
            from: "a".into(),
            to: "b".into(),
            kind,
            strength,
            weight: 1.0,
            language: "go".to_string(),
            location: None,
        }
    }

    #[rstest]
    #[case(DependencyKind::Inherit, DependencyStrength::Strong, Strategy::Interface)]
    #[case(DependencyKind::Inherit, DependencyStrength::Weak, Strategy::Interface)]
    #[case(DependencyKind::Import, DependencyStrength::Weak, Strategy::Injection)]
    #[case(DependencyKind::Require, DependencyStrength::Weak, Strategy::Injection)]
    #[case(DependencyKind::Import, DependencyStrength::Strong, Strategy::Extract)]
    #[case(DependencyKind::Require, DependencyStrength::Optional, Strategy::Extract)]
    #[case(DependencyKind::Include, DependencyStrength::Strong, Strategy::Merge)]
    #[case(DependencyKind::Call, DependencyStrength::Weak, Strategy::Event)]
    #[case(DependencyKind::Compose, DependencyStrength::Strong, Strategy::Refactor)]
    fn strategy_table(
        #[case] kind: DependencyKind,
        #[case] strength: DependencyStrength,
        #[case] expected: Strategy,
    ) {
        assert_eq!(Strategy::for_edge(kind, strength), expected);
    }

    #[rstest]
    #[case(Strategy::Injection, Level::Medium)]
    #[case(Strategy::Interface, Level::Medium)]
    #[case(Strategy::Extract, Level::High)]
    #[case(Strategy::Merge, Level::Low)]
    #[case(Strategy::Event, Level::High)]
    #[case(Strategy::Refactor, Level::Medium)]
    fn effort_per_strategy(#[case] strategy: Strategy, #[case] effort: Level) {
        assert_eq!(strategy.effort(), effort);
    }

    #[rstest]
    #[case(DependencyKind::Import, DependencyStrength::Strong, false, 0.4)]
    #[case(DependencyKind::Include, DependencyStrength::Optional, true, 1.0)]
    #[case(DependencyKind::Inherit, DependencyStrength::Strong, false, 0.2)]
    #[case(DependencyKind::Call, DependencyStrength::Weak, true, 0.9)]
    fn confidence_adjustments(
        #[case] kind: DependencyKind,
        #[case] strength: DependencyStrength,
        #[case] cross_language: bool,
        #[case] expected: f64,
    ) {
        let got = confidence(&edge(kind, strength), cross_language);
        assert!((got - expected).abs() < 1e-9, "got {got}");
    }

    #[test]
    fn points_are_sorted_by_confidence() {
        let edges = vec![
            edge(DependencyKind::Inherit, DependencyStrength::Strong),
            edge(DependencyKind::Include, DependencyStrength::Optional),
        ];

        let points = breaking_points(&edges, 2, false);

        assert_eq!(points[0].strategy, Strategy::Merge);
        assert_eq!(points[0].impact, Level::Low);
        assert_eq!(
            points[0].rationale,
            "weak dependency makes breaking easier; include dependencies are often refactorable"
        );
        assert_eq!(points[1].impact, Level::High);
        assert_eq!(
            points[1].rationale,
            "Breaking this dependency would help resolve the circular dependency"
        );
    }

    #[test]
    fn injection_names_target_first() {
        let text = Strategy::Injection.describe(&"api".into(), &"store".into());
        assert_eq!(text, "Use dependency injection to inject store into api");
    }
}
