//! Dependency graph construction using petgraph.
//!
//! A [`DependencyGraph`] is a directed multigraph over module paths. It is
//! built from the edge list under a [`GraphPolicy`] in one of two
//! orientations:
//!
//! | Orientation | Edge direction | Used for |
//! |-------------|----------------|----------|
//! | `Forward`   | `from → to`    | cycles, dependencies of a change |
//! | `Reverse`   | `to → from`    | dependents of a change |
//!
//! Edge weights keep the original record (in its original direction) so
//! reports can quote the declaring edge whichever way it was traversed.

use std::cmp::Ordering;
use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::domain::{DependencyEdge, DependencyStrength, Module, ModuleId};

/// Which edges take part in a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphPolicy {
    /// Keep edges marked external.
    pub include_external: bool,
    /// Keep weak edges. Optional edges are always kept.
    pub include_weak: bool,
}

impl Default for GraphPolicy {
    fn default() -> Self {
        Self {
            include_external: true,
            include_weak: true,
        }
    }
}

impl GraphPolicy {
    /// Whether `edge` passes this policy.
    #[must_use]
    pub fn admits(&self, edge: &DependencyEdge) -> bool {
        (self.include_external || !edge.external)
            && (self.include_weak || edge.strength != DependencyStrength::Weak)
    }
}

/// Direction in which edges are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// `from → to`
    Forward,
    /// `to → from`
    Reverse,
}

/// Directed multigraph of modules.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<ModuleId, DependencyEdge>,
    node_map: HashMap<ModuleId, NodeIndex>,
    orientation: Orientation,
}

impl DependencyGraph {
    /// Builds a graph in the given orientation.
    ///
    /// Every supplied module becomes a node, isolated or not. Endpoints of
    /// admitted edges that no module record names become nodes too.
    #[must_use]
    pub fn build(
        modules: &[Module],
        edges: &[DependencyEdge],
        policy: GraphPolicy,
        orientation: Orientation,
    ) -> Self {
        let mut built = Self {
            graph: DiGraph::with_capacity(modules.len(), edges.len()),
            node_map: HashMap::with_capacity(modules.len()),
            orientation,
        };

        for module in modules {
            built.ensure_node(&module.path);
        }

        let mut skipped = 0usize;
        for edge in edges {
            if !policy.admits(edge) {
                skipped += 1;
                continue;
            }
            let from = built.ensure_node(&edge.from);
            let to = built.ensure_node(&edge.to);
            let (source, target) = match orientation {
                Orientation::Forward => (from, to),
                Orientation::Reverse => (to, from),
            };
            built.graph.add_edge(source, target, edge.clone());
        }

        tracing::debug!(
            nodes = built.graph.node_count(),
            edges = built.graph.edge_count(),
            skipped,
            ?orientation,
            "Built dependency graph"
        );
        built
    }

    /// Builds the `from → to` graph.
    #[must_use]
    pub fn forward(modules: &[Module], edges: &[DependencyEdge], policy: GraphPolicy) -> Self {
        Self::build(modules, edges, policy, Orientation::Forward)
    }

    /// Builds the `to → from` graph.
    #[must_use]
    pub fn reverse(modules: &[Module], edges: &[DependencyEdge], policy: GraphPolicy) -> Self {
        Self::build(modules, edges, policy, Orientation::Reverse)
    }

    fn ensure_node(&mut self, id: &ModuleId) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(id.clone());
        self.node_map.insert(id.clone(), idx);
        idx
    }

    /// Orientation the graph was built in.
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Underlying petgraph graph.
    #[must_use]
    pub fn inner(&self) -> &DiGraph<ModuleId, DependencyEdge> {
        &self.graph
    }

    /// Node for `id`, if present.
    #[must_use]
    pub fn node(&self, id: &ModuleId) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    /// Module at `idx`.
    #[must_use]
    pub fn module(&self, idx: NodeIndex) -> &ModuleId {
        &self.graph[idx]
    }

    /// Whether `id` is a node.
    #[must_use]
    pub fn contains(&self, id: &ModuleId) -> bool {
        self.node_map.contains_key(id)
    }

    /// Number of modules.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges, parallel edges counted separately.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All modules, sorted by path.
    #[must_use]
    pub fn modules_sorted(&self) -> Vec<&ModuleId> {
        let mut ids: Vec<&ModuleId> = self.graph.node_weights().collect();
        ids.sort();
        ids
    }

    /// Distinct successors of `idx`, sorted by path.
    #[must_use]
    pub fn successors_sorted(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut next: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect();
        next.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
        next.dedup();
        next
    }

    /// All parallel edges stored from `a` to `b`.
    pub fn edges_between(&self, a: NodeIndex, b: NodeIndex) -> impl Iterator<Item = &DependencyEdge> {
        self.graph.edges_connecting(a, b).map(|e| e.weight())
    }

    /// The heaviest edge from `a` to `b`.
    ///
    /// Ties go to the lowest kind so the choice is stable.
    #[must_use]
    pub fn heaviest_edge(&self, a: NodeIndex, b: NodeIndex) -> Option<&DependencyEdge> {
        self.edges_between(a, b).max_by(|x, y| {
            x.weight()
                .partial_cmp(&y.weight())
                .unwrap_or(Ordering::Equal)
                .then_with(|| y.kind.cmp(&x.kind))
        })
    }

    /// The edge from `a` to `b` with the tightest coupling, then the heaviest.
    #[must_use]
    pub fn strongest_edge(&self, a: NodeIndex, b: NodeIndex) -> Option<&DependencyEdge> {
        self.edges_between(a, b).max_by(|x, y| {
            x.strength
                .cmp(&y.strength)
                .then_with(|| x.weight().partial_cmp(&y.weight()).unwrap_or(Ordering::Equal))
                .then_with(|| y.kind.cmp(&x.kind))
        })
    }

    /// Heaviest edge between two modules by path.
    #[must_use]
    pub fn heaviest_edge_by_id(&self, a: &ModuleId, b: &ModuleId) -> Option<&DependencyEdge> {
        self.heaviest_edge(self.node(a)?, self.node(b)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DependencyKind;

    fn edge(from: &str, to: &str, kind: DependencyKind, strength: DependencyStrength) -> DependencyEdge {
        DependencyEdge::new(from, to, kind, strength, "go")
    }

    #[test]
    fn isolated_modules_and_unknown_endpoints_become_nodes() {
        let modules = vec![Module::new("lonely", "go")];
        let edges = vec![edge("a", "b", DependencyKind::Import, DependencyStrength::Strong)];

        let graph = DependencyGraph::forward(&modules, &edges, GraphPolicy::default());

        assert_eq!(graph.node_count(), 3);
        assert!(graph.contains(&"lonely".into()));
        assert!(graph.contains(&"b".into()));
    }

    #[test]
    fn reverse_graph_flips_direction_but_keeps_record() {
        let edges = vec![edge("a", "b", DependencyKind::Import, DependencyStrength::Strong)];

        let graph = DependencyGraph::reverse(&[], &edges, GraphPolicy::default());
        let a = graph.node(&"a".into()).unwrap();
        let b = graph.node(&"b".into()).unwrap();

        assert_eq!(graph.successors_sorted(b), vec![a]);
        assert!(graph.successors_sorted(a).is_empty());
        assert_eq!(graph.heaviest_edge(b, a).unwrap().from.as_str(), "a");
    }

    #[test]
    fn policy_filters_weak_and_external_edges() {
        let edges = vec![
            edge("a", "b", DependencyKind::Import, DependencyStrength::Weak),
            edge("a", "c", DependencyKind::Import, DependencyStrength::Strong).external(),
            edge("a", "d", DependencyKind::Import, DependencyStrength::Strong),
            edge("a", "e", DependencyKind::Import, DependencyStrength::Optional),
        ];
        let policy = GraphPolicy {
            include_external: false,
            include_weak: false,
        };

        let graph = DependencyGraph::forward(&[], &edges, policy);

        assert_eq!(graph.edge_count(), 2);
        assert!(!graph.contains(&"b".into()));
        assert!(!graph.contains(&"c".into()));
        assert!(graph.contains(&"e".into()));
    }

    #[test]
    fn parallel_edges_resolve_to_heaviest_and_strongest() {
        let edges = vec![
            edge("a", "b", DependencyKind::Import, DependencyStrength::Weak),
            edge("a", "b", DependencyKind::Inherit, DependencyStrength::Weak),
            edge("a", "b", DependencyKind::Include, DependencyStrength::Strong),
        ];

        let graph = DependencyGraph::forward(&[], &edges, GraphPolicy::default());
        let (a, b) = (graph.node(&"a".into()).unwrap(), graph.node(&"b".into()).unwrap());

        assert_eq!(graph.edges_between(a, b).count(), 3);
        assert_eq!(graph.successors_sorted(a), vec![b]);
        // strong include 2.4 beats weak inherit 1.5
        assert_eq!(graph.heaviest_edge(a, b).unwrap().kind, DependencyKind::Include);
        assert_eq!(graph.strongest_edge(a, b).unwrap().strength, DependencyStrength::Strong);
    }
}
