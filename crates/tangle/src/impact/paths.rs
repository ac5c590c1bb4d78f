//! Impact paths: how a change travels from a changed module to an
//! affected one.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

use super::{AffectedModule, ImpactDirection};
use crate::domain::{DependencyKind, DependencyStrength, ModuleId};
use crate::graph::DependencyGraph;

/// Shape of an impact path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathType {
    /// One hop.
    Direct,
    /// Several hops.
    Transitive,
    /// Revisits a module.
    Circular,
}

/// A concrete route from a changed module to an affected module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactPath {
    /// `path-N`, numbered after sorting.
    pub id: String,
    /// Changed module.
    pub source_module: ModuleId,
    /// Affected module.
    pub target_module: ModuleId,
    /// Modules from source to target inclusive.
    pub path: Vec<ModuleId>,
    /// Hops.
    pub path_length: usize,
    /// Sum of the heaviest edge weight per hop.
    pub total_weight: f64,
    /// Path risk in `[0, 10]`.
    pub risk_score: f64,
    /// Shape.
    pub path_type: PathType,
    /// Source and target sit on a common dependency cycle.
    pub within_cycle: bool,
    /// Graph the path was found in.
    pub direction: ImpactDirection,
    /// Strong or inheritance hops, as `from -> to` in declared direction.
    pub critical_edges: Vec<String>,
    /// Weak or optional hops, as `from -> to` in declared direction.
    pub breaking_points: Vec<String>,
}

/// Read-only inputs shared by every path search of one analysis.
pub(crate) struct PathContext<'a> {
    pub dependents: &'a DependencyGraph,
    pub dependencies: &'a DependencyGraph,
    /// Component index of every module on a cycle.
    pub components: &'a HashMap<ModuleId, usize>,
    pub excluded: &'a dyn Fn(&ModuleId) -> bool,
}

impl PathContext<'_> {
    fn graph(&self, direction: ImpactDirection) -> Option<&DependencyGraph> {
        match direction {
            ImpactDirection::Forward => Some(self.dependents),
            ImpactDirection::Backward => Some(self.dependencies),
            ImpactDirection::Changed => None,
        }
    }

    fn same_component(&self, a: &ModuleId, b: &ModuleId) -> bool {
        matches!(
            (self.components.get(a), self.components.get(b)),
            (Some(x), Some(y)) if x == y
        )
    }
}

/// Traces a path from every changed module to every affected module it
/// reaches in that module's direction, riskiest first.
pub(crate) fn trace(
    ctx: &PathContext<'_>,
    changed: &[ModuleId],
    affected: &[AffectedModule],
) -> Vec<ImpactPath> {
    let mut paths = Vec::new();
    for direction in [ImpactDirection::Forward, ImpactDirection::Backward] {
        let Some(graph) = ctx.graph(direction) else {
            continue;
        };
        let targets: Vec<&AffectedModule> = affected
            .iter()
            .filter(|m| m.direction == direction && m.distance_from_change > 0)
            .collect();
        if targets.is_empty() {
            continue;
        }
        for source in changed {
            let Some(start) = graph.node(source) else {
                continue;
            };
            if (ctx.excluded)(source) {
                continue;
            }
            let parents = bfs_parents(graph, start, ctx.excluded);
            for target in &targets {
                let Some(nodes) = reconstruct(graph, &parents, start, &target.module_path) else {
                    continue;
                };
                paths.push(describe(ctx, graph, direction, nodes, target));
            }
        }
    }

    paths.sort_by(|a, b| {
        b.risk_score
            .total_cmp(&a.risk_score)
            .then_with(|| a.source_module.cmp(&b.source_module))
            .then_with(|| a.target_module.cmp(&b.target_module))
    });
    for (n, path) in paths.iter_mut().enumerate() {
        path.id = format!("path-{}", n + 1);
    }
    paths
}

fn bfs_parents(
    graph: &DependencyGraph,
    start: NodeIndex,
    excluded: &dyn Fn(&ModuleId) -> bool,
) -> HashMap<NodeIndex, NodeIndex> {
    let mut parents = HashMap::new();
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(u) = queue.pop_front() {
        for v in graph.successors_sorted(u) {
            if excluded(graph.module(v)) || !seen.insert(v) {
                continue;
            }
            parents.insert(v, u);
            queue.push_back(v);
        }
    }
    parents
}

fn reconstruct(
    graph: &DependencyGraph,
    parents: &HashMap<NodeIndex, NodeIndex>,
    start: NodeIndex,
    target: &ModuleId,
) -> Option<Vec<NodeIndex>> {
    let mut node = graph.node(target)?;
    let mut nodes = vec![node];
    while node != start {
        node = *parents.get(&node)?;
        nodes.push(node);
    }
    nodes.reverse();
    (nodes.len() > 1).then_some(nodes)
}

fn describe(
    ctx: &PathContext<'_>,
    graph: &DependencyGraph,
    direction: ImpactDirection,
    nodes: Vec<NodeIndex>,
    target: &AffectedModule,
) -> ImpactPath {
    let mut total_weight = 0.0;
    let mut critical_edges = Vec::new();
    let mut breaking_points = Vec::new();
    for hop in nodes.windows(2) {
        let Some(edge) = graph.heaviest_edge(hop[0], hop[1]) else {
            continue;
        };
        total_weight += edge.weight();
        let label = format!("{} -> {}", edge.from, edge.to);
        if edge.strength != DependencyStrength::Strong {
            breaking_points.push(label.clone());
        }
        if edge.strength == DependencyStrength::Strong || edge.kind == DependencyKind::Inherit {
            critical_edges.push(label);
        }
    }

    let path: Vec<ModuleId> = nodes.iter().map(|&n| graph.module(n).clone()).collect();
    let source_module = path[0].clone();
    let path_length = path.len() - 1;
    let path_type = if path_length == 1 {
        PathType::Direct
    } else if revisits(&nodes) {
        PathType::Circular
    } else {
        PathType::Transitive
    };

    let within_cycle = ctx.same_component(&source_module, &target.module_path);

    #[allow(clippy::cast_precision_loss)]
    let mut risk = total_weight - 0.5 * path_length as f64 + 0.3 * target.impact_score;
    if path_type == PathType::Circular {
        risk *= 1.5;
    }

    ImpactPath {
        id: String::new(),
        source_module,
        target_module: target.module_path.clone(),
        path,
        path_length,
        total_weight,
        risk_score: risk.clamp(0.0, 10.0),
        path_type,
        within_cycle,
        direction,
        critical_edges,
        breaking_points,
    }
}

fn revisits(nodes: &[NodeIndex]) -> bool {
    let mut seen = HashSet::with_capacity(nodes.len());
    !nodes.iter().all(|n| seen.insert(*n))
}
