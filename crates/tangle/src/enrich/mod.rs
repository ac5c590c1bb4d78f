//! Cycle enrichment: metrics, severity, type, advice.
//!
//! Turns a [`DetectedCycle`] node sequence into a reportable [`Cycle`]
//! by looking up the edge behind each hop (the heaviest parallel edge) and
//! deriving everything else from those edges.

pub mod breaking;
pub mod report;
pub mod strategies;

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use breaking::{BreakingPoint, Strategy};
pub use report::{CircularAnalyzer, CircularDependencyReport};
pub use strategies::BreakingStrategy;

use crate::config::SeverityThresholds;
use crate::cycles::DetectedCycle;
use crate::domain::{DependencyKind, DependencyStrength, ModuleId, Severity, SourceLocation};
use crate::graph::DependencyGraph;

/// Shape of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CycleType {
    /// Two modules depending on each other.
    Direct,
    /// Three or more modules, one language.
    Indirect,
    /// Edges declared in more than one language.
    CrossLanguage,
}

impl CycleType {
    fn title(self) -> &'static str {
        match self {
            Self::Direct => "Direct",
            Self::Indirect => "Indirect",
            Self::CrossLanguage => "Cross-Language",
        }
    }

    fn suggestions(self) -> [&'static str; 4] {
        match self {
            Self::Direct => [
                "Extract common functionality into a separate module",
                "Use dependency injection to invert the dependency",
                "Consider merging the modules if they are tightly coupled",
                "Introduce an interface to break the direct dependency",
            ],
            Self::Indirect => [
                "Analyze the dependency chain to find the weakest link",
                "Extract shared functionality into a common module",
                "Use events or messaging to decouple modules",
                "Apply the mediator pattern to coordinate interactions",
            ],
            Self::CrossLanguage => [
                "Use language-specific dependency injection frameworks",
                "Implement service interfaces for cross-language communication",
                "Consider API-based communication instead of direct dependencies",
                "Use shared libraries or common interfaces",
            ],
        }
    }
}

impl fmt::Display for CycleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Direct => "direct",
            Self::Indirect => "indirect",
            Self::CrossLanguage => "cross-language",
        })
    }
}

/// One hop of a cycle, as declared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleEdge {
    /// Depending module.
    pub from: ModuleId,
    /// Module depended upon.
    pub to: ModuleId,
    /// Kind of reference.
    pub kind: DependencyKind,
    /// Coupling strength.
    pub strength: DependencyStrength,
    /// Edge weight.
    pub weight: f64,
    /// Declaring language.
    pub language: String,
    /// Declaration site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

/// Aggregate figures over a cycle's edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleMetrics {
    /// Sum of edge weights.
    pub total_weight: f64,
    /// Mean edge weight.
    pub average_weight: f64,
    /// Strong edges.
    pub strong_edges: usize,
    /// Weak edges.
    pub weak_edges: usize,
    /// Optional edges.
    pub optional_edges: usize,
    /// Edge count when the cycle spans languages, else 0.
    pub cross_language_edges: usize,
    /// `length × (1 + average_weight)`.
    pub complexity: f64,
}

impl CycleMetrics {
    fn of(edges: &[CycleEdge], multi_language: bool) -> Self {
        let mut metrics = Self::default();
        for edge in edges {
            metrics.total_weight += edge.weight;
            match edge.strength {
                DependencyStrength::Strong => metrics.strong_edges += 1,
                DependencyStrength::Weak => metrics.weak_edges += 1,
                DependencyStrength::Optional => metrics.optional_edges += 1,
            }
        }
        if !edges.is_empty() {
            #[allow(clippy::cast_precision_loss)]
            let n = edges.len() as f64;
            metrics.average_weight = metrics.total_weight / n;
            metrics.complexity = n * (1.0 + metrics.average_weight);
        }
        if multi_language {
            metrics.cross_language_edges = edges.len();
        }
        metrics
    }
}

/// A reported circular dependency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    /// Content-derived identifier.
    pub id: String,
    /// Closed node sequence `[m0, ..., m0]`.
    pub cycle: Vec<ModuleId>,
    /// Number of edges.
    pub length: usize,
    /// Severity class.
    pub severity: Severity,
    /// Sum of edge weights.
    pub weight: f64,
    /// Sorted distinct edge languages.
    pub languages: Vec<String>,
    /// Shape.
    pub cycle_type: CycleType,
    /// One-line description.
    pub description: String,
    /// Impact statement for the severity.
    pub impact: String,
    /// Remediation suggestions.
    pub suggestions: Vec<String>,
    /// Edges to cut, best first.
    pub breaking_points: Vec<BreakingPoint>,
    /// IDs of reported cycles sharing a module.
    pub related_cycles: Vec<String>,
    /// Analysis time.
    pub detected_at: DateTime<Utc>,
    /// Hops in order.
    pub edges: Vec<CycleEdge>,
    /// Aggregates.
    pub metrics: CycleMetrics,
}

impl Cycle {
    /// Modules in the cycle, each once.
    pub fn members(&self) -> impl Iterator<Item = &ModuleId> {
        self.cycle[..self.cycle.len().saturating_sub(1)].iter()
    }

    /// Whether the cycle spans more than one language.
    #[must_use]
    pub fn is_cross_language(&self) -> bool {
        self.languages.len() > 1
    }
}

/// Classifies a cycle: length first, then weight, then language spread.
#[must_use]
pub fn severity_for(
    length: usize,
    weight: f64,
    multi_language: bool,
    thresholds: &SeverityThresholds,
) -> Severity {
    if length <= thresholds.critical_cycle_length {
        Severity::Critical
    } else if length <= thresholds.high_cycle_length {
        Severity::High
    } else if length <= thresholds.medium_cycle_length {
        Severity::Medium
    } else if weight < thresholds.weak_cycle_weight {
        Severity::Low
    } else if multi_language {
        Severity::Medium
    } else {
        Severity::Low
    }
}

fn impact_statement(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "Very High - May cause build failures, runtime errors, or deadlocks",
        Severity::High => "High - Significantly increases complexity and reduces maintainability",
        Severity::Medium => "Medium - Makes code harder to understand and test",
        Severity::Low => "Low - Minor impact on code organization",
    }
}

/// Builds the reportable form of a detected cycle.
///
/// Returns `None` if a hop has no edge in `graph`, which cannot happen for
/// cycles detected on the same graph.
#[must_use]
pub fn enrich_cycle(
    detected: &DetectedCycle,
    id: String,
    graph: &DependencyGraph,
    thresholds: &SeverityThresholds,
    at: DateTime<Utc>,
) -> Option<Cycle> {
    let edges: Vec<CycleEdge> = detected
        .nodes
        .windows(2)
        .map(|hop| {
            let edge = graph.heaviest_edge_by_id(&hop[0], &hop[1])?;
            Some(CycleEdge {
                from: hop[0].clone(),
                to: hop[1].clone(),
                kind: edge.kind,
                strength: edge.strength,
                weight: edge.weight(),
                language: edge.language.clone(),
                location: edge.source_location.clone(),
            })
        })
        .collect::<Option<_>>()?;

    let languages: Vec<String> = edges
        .iter()
        .map(|e| e.language.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let multi_language = languages.len() > 1;
    let length = detected.length();
    let metrics = CycleMetrics::of(&edges, multi_language);
    let weight = metrics.total_weight;

    let cycle_type = if multi_language {
        CycleType::CrossLanguage
    } else if length == 2 {
        CycleType::Direct
    } else {
        CycleType::Indirect
    };
    let severity = severity_for(length, weight, multi_language, thresholds);

    let chain = detected
        .nodes
        .iter()
        .map(ModuleId::as_str)
        .collect::<Vec<_>>()
        .join(" → ");
    let description = format!("{} cycle of length {length}: {chain}", cycle_type.title());

    let mut suggestions: Vec<String> =
        cycle_type.suggestions().iter().map(ToString::to_string).collect();
    if severity >= Severity::High {
        suggestions.push("Priority: Resolve immediately to prevent system issues".to_string());
    }
    if metrics.cross_language_edges > 0 {
        suggestions.push("Consider standardizing on fewer programming languages".to_string());
    }
    if metrics.strong_edges > metrics.weak_edges {
        suggestions
            .push("Look for opportunities to make some dependencies optional or weak".to_string());
    }

    let breaking_points = breaking::breaking_points(&edges, length, multi_language);

    Some(Cycle {
        id,
        cycle: detected.nodes.clone(),
        length,
        severity,
        weight,
        languages,
        cycle_type,
        description,
        impact: impact_statement(severity).to_string(),
        suggestions,
        breaking_points,
        related_cycles: Vec::new(),
        detected_at: at,
        edges,
        metrics,
    })
}
