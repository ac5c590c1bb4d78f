//! The circular dependency report.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::strategies::{BreakingStrategy, global_strategies};
use super::{Cycle, enrich_cycle};
use crate::config::CycleConfig;
use crate::cycles::{self, Completeness};
use crate::domain::{DependencyEdge, Module, ModuleId, Severity};
use crate::error::Result;
use crate::graph::{DependencyGraph, GraphPolicy};
use crate::ids::IdAllocator;

const TOP_NODES: usize = 10;
const TOP_PATHS: usize = 10;
/// Longest sub-path, in hops, considered for critical paths.
const CRITICAL_PATH_HOPS: usize = 3;

/// Headline figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CircularSummary {
    /// Reported cycles.
    pub total_cycles: usize,
    /// Distinct modules in reported cycles.
    pub total_nodes: usize,
    /// Same as `total_nodes`.
    pub affected_nodes: usize,
    /// Critical cycles.
    pub critical_cycles: usize,
    /// High severity cycles.
    pub high_severity_cycles: usize,
    /// Mean cycle length.
    pub average_cycle_length: f64,
    /// Longest cycle length.
    pub max_cycle_length: usize,
    /// Cycles per language.
    pub language_breakdown: BTreeMap<String, usize>,
    /// Cycles per severity.
    pub severity_distribution: BTreeMap<Severity, usize>,
}

/// Cycle figures for one language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageImpact {
    /// Language tag.
    pub language: String,
    /// Cycles with an edge in this language.
    pub cycle_count: usize,
    /// Distinct modules in those cycles.
    pub affected_modules: usize,
    /// Mean complexity of those cycles.
    pub complexity_score: f64,
    /// Language-specific advice.
    pub recommendations: Vec<String>,
}

/// System-wide effect of the reported cycles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CircularImpact {
    /// Modules in more than one cycle, most frequent first.
    pub most_affected_nodes: Vec<ModuleId>,
    /// Short paths shared by several critical or high cycles.
    pub critical_paths: Vec<Vec<ModuleId>>,
    /// Per-language figures for every language in the input.
    pub language_impact: BTreeMap<String, LanguageImpact>,
    /// Severity-weighted complexity per module, capped at 10.
    pub system_complexity: f64,
    /// 10 minus per-cycle penalties, floored at 0.
    pub testability_score: f64,
    /// 10 minus per-cycle penalties, floored at 0.
    pub maintainability_score: f64,
}

/// Everything known about the circular dependencies of a codebase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircularDependencyReport {
    /// Headline figures.
    pub summary: CircularSummary,
    /// Cycles per edge language (a cross-language cycle appears under each).
    pub cycles_by_language: BTreeMap<String, Vec<Cycle>>,
    /// Cycles per length.
    pub cycles_by_length: BTreeMap<usize, Vec<Cycle>>,
    /// Cycles per severity.
    pub cycles_by_severity: BTreeMap<Severity, Vec<Cycle>>,
    /// System-wide effect.
    pub impact_analysis: CircularImpact,
    /// Graph-wide remediation, highest priority first.
    pub breaking_strategies: Vec<BreakingStrategy>,
    /// Top-level advice.
    pub recommendations: Vec<String>,
    /// Search caveats.
    pub completeness: Completeness,
    /// Analysis time.
    pub generated_at: DateTime<Utc>,
}

impl CircularDependencyReport {
    /// All reported cycles ordered by `(length, key)`.
    pub fn cycles(&self) -> impl Iterator<Item = &Cycle> {
        self.cycles_by_length.values().flatten()
    }
}

/// Detects and explains circular dependencies.
#[derive(Debug, Clone)]
pub struct CircularAnalyzer<'a> {
    config: &'a CycleConfig,
}

impl<'a> CircularAnalyzer<'a> {
    /// Creates an analyzer, rejecting caps and thresholds it cannot honor.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] describing the offending field.
    pub fn new(config: &'a CycleConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Analyzes the input, stamping the report with the current time.
    #[must_use]
    pub fn analyze(&self, modules: &[Module], edges: &[DependencyEdge]) -> CircularDependencyReport {
        self.analyze_at(modules, edges, Utc::now())
    }

    /// Analyzes the input, stamping the report with `at`.
    ///
    /// The same input and `at` always produce the same report.
    #[must_use]
    pub fn analyze_at(
        &self,
        modules: &[Module],
        edges: &[DependencyEdge],
        at: DateTime<Utc>,
    ) -> CircularDependencyReport {
        let policy = GraphPolicy {
            include_external: self.config.include_external,
            include_weak: self.config.analyze_weak_cycles,
        };
        let graph = DependencyGraph::forward(modules, edges, policy);
        let detection = cycles::detect(&graph, self.config);

        let mut ids = IdAllocator::new();
        let mut reported: Vec<Cycle> = detection
            .cycles
            .iter()
            .filter_map(|detected| {
                let id = ids.allocate("cycle", &detected.key);
                enrich_cycle(detected, id, &graph, &self.config.severity_thresholds, at)
            })
            .filter(|c| c.severity >= self.config.min_severity && c.length <= self.config.max_cycle_length)
            .collect();
        link_related(&mut reported);

        let impact_analysis = impact(&reported, edges, graph.node_count());
        let summary = summarize(&reported);
        let recommendations = recommend(&reported, &impact_analysis);
        let breaking_strategies = global_strategies(&reported);

        let mut cycles_by_language: BTreeMap<String, Vec<Cycle>> = BTreeMap::new();
        let mut cycles_by_length: BTreeMap<usize, Vec<Cycle>> = BTreeMap::new();
        let mut cycles_by_severity: BTreeMap<Severity, Vec<Cycle>> = BTreeMap::new();
        for cycle in reported {
            for language in &cycle.languages {
                cycles_by_language
                    .entry(language.clone())
                    .or_default()
                    .push(cycle.clone());
            }
            cycles_by_severity
                .entry(cycle.severity)
                .or_default()
                .push(cycle.clone());
            cycles_by_length.entry(cycle.length).or_default().push(cycle);
        }

        tracing::info!(
            cycles = summary.total_cycles,
            critical = summary.critical_cycles,
            truncated = detection.completeness.truncated,
            "Circular dependency analysis complete"
        );

        CircularDependencyReport {
            summary,
            cycles_by_language,
            cycles_by_length,
            cycles_by_severity,
            impact_analysis,
            breaking_strategies,
            recommendations,
            completeness: detection.completeness,
            generated_at: at,
        }
    }
}

fn link_related(cycles: &mut [Cycle]) {
    let members: Vec<BTreeSet<ModuleId>> = cycles
        .iter()
        .map(|c| c.members().cloned().collect())
        .collect();
    let ids: Vec<String> = cycles.iter().map(|c| c.id.clone()).collect();
    for (i, cycle) in cycles.iter_mut().enumerate() {
        cycle.related_cycles = (0..ids.len())
            .filter(|&j| j != i && !members[i].is_disjoint(&members[j]))
            .map(|j| ids[j].clone())
            .collect();
    }
}

fn summarize(cycles: &[Cycle]) -> CircularSummary {
    let mut summary = CircularSummary {
        total_cycles: cycles.len(),
        ..CircularSummary::default()
    };
    let mut nodes = BTreeSet::new();
    let mut total_length = 0usize;
    for cycle in cycles {
        *summary.severity_distribution.entry(cycle.severity).or_default() += 1;
        for language in &cycle.languages {
            *summary.language_breakdown.entry(language.clone()).or_default() += 1;
        }
        nodes.extend(cycle.members());
        total_length += cycle.length;
        summary.max_cycle_length = summary.max_cycle_length.max(cycle.length);
        match cycle.severity {
            Severity::Critical => summary.critical_cycles += 1,
            Severity::High => summary.high_severity_cycles += 1,
            Severity::Medium | Severity::Low => {}
        }
    }
    summary.total_nodes = nodes.len();
    summary.affected_nodes = nodes.len();
    if !cycles.is_empty() {
        #[allow(clippy::cast_precision_loss)]
        let average = total_length as f64 / cycles.len() as f64;
        summary.average_cycle_length = average;
    }
    summary
}

fn impact(cycles: &[Cycle], edges: &[DependencyEdge], module_count: usize) -> CircularImpact {
    CircularImpact {
        most_affected_nodes: most_affected_nodes(cycles),
        critical_paths: critical_paths(cycles),
        language_impact: language_impact(cycles, edges),
        system_complexity: system_complexity(cycles, module_count),
        testability_score: testability(cycles, module_count),
        maintainability_score: maintainability(cycles, module_count),
    }
}

fn most_affected_nodes(cycles: &[Cycle]) -> Vec<ModuleId> {
    let mut counts: BTreeMap<&ModuleId, usize> = BTreeMap::new();
    for cycle in cycles {
        for node in cycle.members() {
            *counts.entry(node).or_default() += 1;
        }
    }
    let mut ranked: Vec<(&ModuleId, usize)> = counts.into_iter().filter(|(_, n)| *n > 1).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.into_iter().take(TOP_NODES).map(|(id, _)| id.clone()).collect()
}

fn critical_paths(cycles: &[Cycle]) -> Vec<Vec<ModuleId>> {
    let mut counts: HashMap<&[ModuleId], usize> = HashMap::new();
    for cycle in cycles.iter().filter(|c| c.severity >= Severity::High) {
        let open = &cycle.cycle[..cycle.cycle.len().saturating_sub(1)];
        for i in 0..open.len() {
            for j in (i + 1)..open.len().min(i + CRITICAL_PATH_HOPS + 1) {
                *counts.entry(&open[i..=j]).or_default() += 1;
            }
        }
    }
    let mut shared: Vec<(&[ModuleId], usize)> = counts.into_iter().filter(|(_, n)| *n > 1).collect();
    shared.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    shared
        .into_iter()
        .take(TOP_PATHS)
        .map(|(path, _)| path.to_vec())
        .collect()
}

fn language_impact(cycles: &[Cycle], edges: &[DependencyEdge]) -> BTreeMap<String, LanguageImpact> {
    let mut impacts: BTreeMap<String, LanguageImpact> = edges
        .iter()
        .map(|e| {
            (
                e.language.clone(),
                LanguageImpact {
                    language: e.language.clone(),
                    ..LanguageImpact::default()
                },
            )
        })
        .collect();
    let mut modules: BTreeMap<&str, BTreeSet<&ModuleId>> = BTreeMap::new();

    for cycle in cycles {
        for language in &cycle.languages {
            if let Some(entry) = impacts.get_mut(language) {
                entry.cycle_count += 1;
                entry.complexity_score += cycle.metrics.complexity;
                modules.entry(language.as_str()).or_default().extend(cycle.members());
            }
        }
    }

    for (language, entry) in &mut impacts {
        entry.affected_modules = modules.get(language.as_str()).map_or(0, BTreeSet::len);
        if entry.cycle_count > 0 {
            #[allow(clippy::cast_precision_loss)]
            let count = entry.cycle_count as f64;
            entry.complexity_score /= count;
        }
        entry.recommendations = language_recommendations(entry);
    }
    impacts
}

fn language_recommendations(impact: &LanguageImpact) -> Vec<String> {
    let mut out: Vec<&str> = Vec::new();
    match impact.language.as_str() {
        "go" => {
            if impact.cycle_count > 3 {
                out.push("Use Go interfaces to break dependencies");
                out.push("Consider using dependency injection with wire or similar tools");
            }
            if impact.complexity_score > 5.0 {
                out.push("Break packages into smaller, focused modules");
            }
        }
        "javascript" | "typescript" => {
            if impact.cycle_count > 2 {
                out.push("Use dependency injection containers like inversify");
                out.push("Implement barrel exports to control dependencies");
            }
            if impact.complexity_score > 4.0 {
                out.push("Consider using micro-frontends architecture");
            }
        }
        "python" => {
            if impact.cycle_count > 2 {
                out.push("Use dependency injection with dependency-injector");
                out.push("Implement abstract base classes to define interfaces");
            }
            if impact.complexity_score > 4.0 {
                out.push("Break large modules into smaller packages");
            }
        }
        "java" => {
            if impact.cycle_count > 3 {
                out.push("Use Spring's dependency injection");
                out.push("Apply SOLID principles more strictly");
            }
        }
        _ => out.push("Apply language-specific dependency inversion patterns"),
    }
    if impact.cycle_count > 5 {
        out.push("Consider architectural refactoring");
    }
    if impact.affected_modules > 10 {
        out.push("Implement module boundaries more clearly");
    }
    out.into_iter().map(ToString::to_string).collect()
}

fn severity_weight(severity: Severity) -> f64 {
    match severity {
        Severity::Critical => 4.0,
        Severity::High => 3.0,
        Severity::Medium => 2.0,
        Severity::Low => 1.0,
    }
}

fn system_complexity(cycles: &[Cycle], module_count: usize) -> f64 {
    if module_count == 0 {
        return 0.0;
    }
    let weighted: f64 = cycles
        .iter()
        .map(|c| c.metrics.complexity * severity_weight(c.severity))
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let normalized = weighted / module_count as f64;
    normalized.min(10.0)
}

fn testability(cycles: &[Cycle], module_count: usize) -> f64 {
    if module_count == 0 {
        return 10.0;
    }
    let penalty: f64 = cycles
        .iter()
        .map(|c| {
            let base = match c.severity {
                Severity::Critical => 2.0,
                Severity::High => 1.5,
                Severity::Medium => 1.0,
                Severity::Low => 0.5,
            };
            if c.is_cross_language() { base + 0.3 } else { base }
        })
        .sum();
    (10.0 - penalty).max(0.0)
}

fn maintainability(cycles: &[Cycle], module_count: usize) -> f64 {
    if module_count == 0 {
        return 10.0;
    }
    let penalty: f64 = cycles
        .iter()
        .map(|c| {
            let mut p = match c.severity {
                Severity::Critical => 1.5,
                Severity::High => 1.0,
                Severity::Medium => 0.7,
                Severity::Low => 0.3,
            };
            if c.length > 5 {
                p += 0.2;
            }
            if c.is_cross_language() {
                p += 0.2;
            }
            if c.metrics.strong_edges > c.metrics.weak_edges {
                p += 0.1;
            }
            p
        })
        .sum();
    (10.0 - penalty).max(0.0)
}

fn recommend(cycles: &[Cycle], impact: &CircularImpact) -> Vec<String> {
    let mut out = Vec::new();
    out.push(
        match cycles.len() {
            0 => "No circular dependencies detected - excellent architecture!",
            1..=3 => "Minor circular dependencies detected - address when convenient",
            4..=10 => "Moderate number of circular dependencies - plan refactoring",
            _ => "High number of circular dependencies - immediate attention required",
        }
        .to_string(),
    );

    let critical = cycles.iter().filter(|c| c.severity == Severity::Critical).count();
    if critical > 0 {
        out.push(format!("{critical} critical cycles require immediate resolution"));
    }
    if impact.system_complexity > 7.0 {
        out.push("High system complexity detected - consider architectural restructuring".to_string());
    }
    if impact.testability_score < 6.0 {
        out.push(
            "Low testability score - circular dependencies are making testing difficult".to_string(),
        );
    }
    if impact.maintainability_score < 6.0 {
        out.push(
            "Low maintainability score - refactoring recommended to improve code quality".to_string(),
        );
    }
    for (language, entry) in &impact.language_impact {
        if entry.cycle_count > 3 {
            out.push(format!("High number of cycles in {language} - review module structure"));
        }
    }
    if cycles.iter().any(Cycle::is_cross_language) {
        out.push("Cross-language cycles detected - consider API boundaries".to_string());
    }
    out
}
