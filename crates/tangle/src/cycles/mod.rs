//! Circular dependency detection.
//!
//! Detection runs two searches over the same index-addressed view of the
//! graph and merges their output:
//!
//! 1. Tarjan's algorithm finds strongly connected components; inside each,
//!    a bounded depth-first search extracts up to `max_cycles_per_scc`
//!    cycles.
//! 2. Johnson's algorithm enumerates elementary cycles across the whole
//!    graph, up to `max_total_cycles`.
//!
//! Results are deduplicated by canonical key, cycles longer than
//! `max_cycle_length` are dropped, and the rest are ordered by
//! `(length, key)`. Every search is iterative and bounded by
//! `detection_depth`; any bound that cut the search short is listed in
//! [`Completeness`].
//!
//! Nodes are numbered in path order, so "start from the smallest node"
//! in the searches is also the lexicographic rotation used by the keys.

pub mod johnson;
pub mod key;
pub mod scc_paths;
pub mod tarjan;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::CycleConfig;
use crate::domain::ModuleId;
use crate::graph::DependencyGraph;

/// A search bound that cut detection short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapHit {
    /// A component held more cycles than `max_cycles_per_scc`.
    SccCycleCap,
    /// The graph held more cycles than `max_total_cycles`.
    GlobalCycleCap,
    /// `detection_depth` refused a path that could still close a reportable cycle.
    DepthCap,
}

/// How complete the reported cycle set is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completeness {
    /// True when any cap was hit; more cycles may exist.
    pub truncated: bool,
    /// Caps that were hit, each listed once.
    pub caps_hit: Vec<CapHit>,
    /// Strongly connected components with more than one module.
    pub scc_count: usize,
    /// Size of the largest such component.
    pub largest_scc: usize,
    /// Cycles found by both searches, or twice by one.
    pub duplicates_removed: usize,
    /// Cycles found but longer than `max_cycle_length`.
    pub dropped_over_length: usize,
}

impl Completeness {
    fn record(&mut self, cap: CapHit) {
        if !self.caps_hit.contains(&cap) {
            self.caps_hit.push(cap);
            self.caps_hit.sort_unstable();
        }
        self.truncated = true;
    }
}

/// Raw output of one bounded search, in node positions.
#[derive(Debug, Default)]
pub struct SearchOutcome {
    /// Open cycles, each starting at its smallest position.
    pub cycles: Vec<Vec<usize>>,
    /// More cycles existed than the cap allowed.
    pub cap_hit: bool,
    /// The depth cap refused at least one extension.
    pub depth_pruned: bool,
}

/// A detected cycle before enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedCycle {
    /// Closed node sequence starting at the smallest module.
    pub nodes: Vec<ModuleId>,
    /// Canonical key.
    pub key: String,
}

impl DetectedCycle {
    /// Number of edges.
    #[must_use]
    pub fn length(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}

/// Cycles plus the caveats of the search that found them.
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// Deduplicated cycles ordered by `(length, key)`.
    pub cycles: Vec<DetectedCycle>,
    /// Search caveats.
    pub completeness: Completeness,
}

/// Index-addressed view of a graph: positions follow path order, parallel
/// edges collapse, self-loops are dropped.
pub(crate) struct Adjacency {
    names: Vec<ModuleId>,
    succ: Vec<Vec<usize>>,
}

impl Adjacency {
    pub(crate) fn of(graph: &DependencyGraph) -> Self {
        let names: Vec<ModuleId> = graph.modules_sorted().into_iter().cloned().collect();
        let succ = names
            .iter()
            .enumerate()
            .map(|(v, name)| {
                let Some(idx) = graph.node(name) else {
                    return Vec::new();
                };
                let mut next: Vec<usize> = graph
                    .successors_sorted(idx)
                    .into_iter()
                    .filter_map(|w| names.binary_search(graph.module(w)).ok())
                    .filter(|&w| w != v)
                    .collect();
                next.sort_unstable();
                next
            })
            .collect();
        Self { names, succ }
    }

    fn closed(&self, open: &[usize]) -> Vec<ModuleId> {
        let mut nodes: Vec<ModuleId> = open.iter().map(|&v| self.names[v].clone()).collect();
        if let Some(first) = nodes.first().cloned() {
            nodes.push(first);
        }
        nodes
    }
}

/// Strongly connected components with more than one module, by path.
#[must_use]
pub fn strongly_connected_components(graph: &DependencyGraph) -> Vec<Vec<ModuleId>> {
    let adjacency = Adjacency::of(graph);
    tarjan::strongly_connected(&adjacency.succ)
        .into_iter()
        .map(|component| {
            component
                .into_iter()
                .map(|v| adjacency.names[v].clone())
                .collect()
        })
        .collect()
}

/// Finds the circular dependencies in `graph`.
#[must_use]
pub fn detect(graph: &DependencyGraph, config: &CycleConfig) -> Detection {
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Starting cycle detection"
    );
    let adjacency = Adjacency::of(graph);
    let depth_cap = config.detection_depth;
    // A pruned path of `depth_cap` nodes can only close a cycle longer
    // than `depth_cap`, which matters only if such a cycle is reportable.
    let depth_matters = depth_cap < config.max_cycle_length;

    let mut completeness = Completeness::default();
    let components = tarjan::strongly_connected(&adjacency.succ);
    completeness.scc_count = components.len();
    completeness.largest_scc = components.iter().map(Vec::len).max().unwrap_or(0);

    let mut found: Vec<Vec<usize>> = Vec::new();
    for component in &components {
        let outcome = scc_paths::component_cycles(
            &adjacency.succ,
            component,
            config.max_cycles_per_scc,
            depth_cap,
        );
        if outcome.cap_hit {
            completeness.record(CapHit::SccCycleCap);
        }
        if outcome.depth_pruned && depth_matters {
            completeness.record(CapHit::DepthCap);
        }
        found.extend(outcome.cycles);
    }

    let outcome = johnson::elementary_cycles(&adjacency.succ, config.max_total_cycles, depth_cap);
    if outcome.cap_hit {
        completeness.record(CapHit::GlobalCycleCap);
    }
    if outcome.depth_pruned && depth_matters {
        completeness.record(CapHit::DepthCap);
    }
    found.extend(outcome.cycles);

    let mut seen = HashSet::new();
    let mut cycles = Vec::new();
    for open in found {
        let nodes = adjacency.closed(&open);
        let key = key::cycle_key(&nodes);
        if !seen.insert(key.clone()) {
            completeness.duplicates_removed += 1;
            continue;
        }
        if open.len() > config.max_cycle_length {
            completeness.dropped_over_length += 1;
            continue;
        }
        cycles.push(DetectedCycle {
            nodes: key::canonicalize(&nodes),
            key,
        });
    }
    cycles.sort_by(|a, b| a.length().cmp(&b.length()).then_with(|| a.key.cmp(&b.key)));

    if completeness.truncated {
        tracing::warn!(caps = ?completeness.caps_hit, cycles = cycles.len(), "Cycle search truncated");
    }
    tracing::info!(
        cycles = cycles.len(),
        components = completeness.scc_count,
        largest = completeness.largest_scc,
        "Cycle detection complete"
    );
    Detection {
        cycles,
        completeness,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DependencyEdge, DependencyKind, DependencyStrength};
    use crate::graph::GraphPolicy;

    fn graph(pairs: &[(&str, &str)]) -> DependencyGraph {
        let edges: Vec<DependencyEdge> = pairs
            .iter()
            .map(|(a, b)| {
                DependencyEdge::new(*a, *b, DependencyKind::Import, DependencyStrength::Strong, "go")
            })
            .collect();
        DependencyGraph::forward(&[], &edges, GraphPolicy::default())
    }

    #[test]
    fn output_is_ordered_by_length_then_key() {
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "a"), ("x", "y"), ("y", "x")]);

        let detection = detect(&g, &CycleConfig::default());
        let keys: Vec<&str> = detection.cycles.iter().map(|c| c.key.as_str()).collect();

        assert_eq!(keys, vec!["x->y", "a->b->c"]);
        assert_eq!(detection.cycles[1].nodes.first(), detection.cycles[1].nodes.last());
        assert_eq!(detection.completeness.scc_count, 2);
        assert_eq!(detection.completeness.largest_scc, 3);
        assert!(!detection.completeness.truncated);
    }

    #[test]
    fn both_searches_agree_so_duplicates_are_counted() {
        let g = graph(&[("a", "b"), ("b", "a")]);

        let detection = detect(&g, &CycleConfig::default());

        assert_eq!(detection.cycles.len(), 1);
        assert_eq!(detection.completeness.duplicates_removed, 1);
    }

    #[test]
    fn long_cycles_are_dropped_and_counted() {
        let ring: Vec<(String, String)> =
            (0..4).map(|i| (format!("m{i}"), format!("m{}", (i + 1) % 4))).collect();
        let pairs: Vec<(&str, &str)> = ring.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        let config = CycleConfig {
            max_cycle_length: 3,
            ..CycleConfig::default()
        };

        let detection = detect(&graph(&pairs), &config);

        assert!(detection.cycles.is_empty());
        assert_eq!(detection.completeness.dropped_over_length, 1);
    }

    #[test]
    fn caps_are_reported() {
        let names = ["a", "b", "c", "d"];
        let mut pairs = Vec::new();
        for x in names {
            for y in names {
                if x != y {
                    pairs.push((x, y));
                }
            }
        }
        let config = CycleConfig {
            max_cycles_per_scc: 2,
            max_total_cycles: 5,
            ..CycleConfig::default()
        };

        let detection = detect(&graph(&pairs), &config);

        assert!(detection.completeness.truncated);
        assert_eq!(
            detection.completeness.caps_hit,
            vec![CapHit::SccCycleCap, CapHit::GlobalCycleCap]
        );
    }

    #[test]
    fn depth_cap_is_reported_only_when_it_hides_reportable_cycles() {
        let pairs = [("a", "b"), ("b", "c"), ("c", "d"), ("d", "a")];
        let hiding = CycleConfig {
            detection_depth: 3,
            ..CycleConfig::default()
        };
        let harmless = CycleConfig {
            detection_depth: 3,
            max_cycle_length: 3,
            ..CycleConfig::default()
        };

        let hidden = detect(&graph(&pairs), &hiding);
        let bounded = detect(&graph(&pairs), &harmless);

        assert!(hidden.cycles.is_empty());
        assert_eq!(hidden.completeness.caps_hit, vec![CapHit::DepthCap]);
        assert!(!bounded.completeness.truncated);
    }

    #[test]
    fn scc_helper_reports_components_by_path() {
        let g = graph(&[("b", "a"), ("a", "b"), ("b", "c")]);
        assert_eq!(
            strongly_connected_components(&g),
            vec![vec![ModuleId::from("a"), ModuleId::from("b")]]
        );
    }
}
