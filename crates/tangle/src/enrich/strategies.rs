//! Graph-wide strategies for breaking cycles.

use serde::{Deserialize, Serialize};

use super::Cycle;
use crate::domain::{DependencyKind, Level};

/// A remediation approach that applies across several cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakingStrategy {
    /// Stable identifier (`interface_segregation`, ...).
    pub id: String,
    /// Display name.
    pub name: String,
    /// One-line summary.
    pub description: String,
    /// IDs of the cycles the strategy applies to.
    pub applicable_to: Vec<String>,
    /// Higher runs first.
    pub priority: u8,
    /// Effort to apply.
    pub effort: Level,
    /// Expected payoff.
    pub impact: Level,
    /// Ordered steps.
    pub steps: Vec<String>,
    /// Concrete examples.
    pub examples: Vec<String>,
    /// Known downsides.
    pub risks: Vec<String>,
}

struct Template {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    priority: u8,
    effort: Level,
    impact: Level,
    steps: [&'static str; 4],
    examples: [&'static str; 2],
    risks: [&'static str; 2],
    /// Whether the strategy is offered at all for this cycle set.
    offered: fn(&[Cycle]) -> bool,
    /// Whether it applies to one cycle.
    applies: fn(&Cycle) -> bool,
}

const TEMPLATES: [Template; 4] = [
    Template {
        id: "interface_segregation",
        name: "Interface Segregation",
        description: "Break inheritance cycles by introducing interfaces",
        priority: 8,
        effort: Level::Medium,
        impact: Level::High,
        steps: [
            "Identify common behaviors in the cycle",
            "Extract these behaviors into interfaces",
            "Have classes implement interfaces instead of inheriting",
            "Use composition over inheritance where possible",
        ],
        examples: [
            "Replace class inheritance with interface implementation",
            "Use dependency injection with interfaces",
        ],
        risks: [
            "May require significant refactoring",
            "Could increase code complexity initially",
        ],
        offered: |cycles| cycles.iter().any(has_inherit),
        applies: has_inherit,
    },
    Template {
        id: "dependency_injection",
        name: "Dependency Injection",
        description: "Use dependency injection to invert dependencies",
        priority: 7,
        effort: Level::Medium,
        impact: Level::High,
        steps: [
            "Identify the dependency direction to invert",
            "Create interfaces for the dependencies",
            "Inject dependencies through constructors or setters",
            "Use a dependency injection container if needed",
        ],
        examples: [
            "Inject service dependencies through constructors",
            "Use factory patterns for complex dependencies",
        ],
        risks: [
            "May increase setup complexity",
            "Requires team understanding of DI patterns",
        ],
        offered: |cycles| cycles.iter().any(|c| c.metrics.strong_edges >= 2),
        applies: |cycle| cycle.metrics.strong_edges > 0,
    },
    Template {
        id: "extract_common",
        name: "Extract Common Module",
        description: "Extract shared functionality into a separate module",
        priority: 6,
        effort: Level::High,
        impact: Level::Medium,
        steps: [
            "Identify common functionality in the cycle",
            "Create a new module for shared code",
            "Move common code to the new module",
            "Update imports to use the new module",
        ],
        examples: [
            "Extract utility functions to a common package",
            "Move shared data structures to a separate module",
        ],
        risks: [
            "May create a god module if not done carefully",
            "Could introduce new dependencies",
        ],
        offered: |_| true,
        applies: |_| true,
    },
    Template {
        id: "event_driven",
        name: "Event-Driven Architecture",
        description: "Replace direct calls with event-based communication",
        priority: 5,
        effort: Level::High,
        impact: Level::High,
        steps: [
            "Identify call patterns in the cycle",
            "Design appropriate events for these interactions",
            "Implement event publishing and subscription",
            "Replace direct calls with event publishing",
        ],
        examples: [
            "Use observer pattern for notifications",
            "Implement message queues for async communication",
        ],
        risks: [
            "Increases system complexity",
            "May impact performance due to async nature",
        ],
        offered: |cycles| cycles.iter().any(has_call),
        applies: has_call,
    },
];

fn has_inherit(cycle: &Cycle) -> bool {
    cycle.edges.iter().any(|e| e.kind == DependencyKind::Inherit)
}

fn has_call(cycle: &Cycle) -> bool {
    cycle.edges.iter().any(|e| e.kind == DependencyKind::Call)
}

/// Strategies offered for the reported cycles, highest priority first.
///
/// Nothing is offered when there are no cycles.
#[must_use]
pub fn global_strategies(cycles: &[Cycle]) -> Vec<BreakingStrategy> {
    if cycles.is_empty() {
        return Vec::new();
    }
    let mut strategies: Vec<BreakingStrategy> = TEMPLATES
        .iter()
        .filter(|t| (t.offered)(cycles))
        .map(|t| BreakingStrategy {
            id: t.id.to_string(),
            name: t.name.to_string(),
            description: t.description.to_string(),
            applicable_to: cycles
                .iter()
                .filter(|c| (t.applies)(c))
                .map(|c| c.id.clone())
                .collect(),
            priority: t.priority,
            effort: t.effort,
            impact: t.impact,
            steps: t.steps.iter().map(ToString::to_string).collect(),
            examples: t.examples.iter().map(ToString::to_string).collect(),
            risks: t.risks.iter().map(ToString::to_string).collect(),
        })
        .collect();
    strategies.sort_by(|a, b| b.priority.cmp(&a.priority));
    strategies
}
