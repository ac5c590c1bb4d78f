//! Change impact analysis.
//!
//! Given a [`ChangeSet`], the [`ImpactAnalyzer`] finds every module the
//! change can reach, scores each one, traces the paths the change travels
//! along and rolls everything up into an [`ImpactAnalysisReport`].
//!
//! Propagation runs twice from the changed modules together:
//!
//! 1. over the reverse graph, finding dependents (`forward` impact), then
//! 2. over the forward graph, finding dependencies (`backward` impact).
//!
//! Each pass is a level-by-level breadth-first search with its own visited
//! set, so a module's distance is its shortest hop count in that graph. A
//! module is recorded once; when both passes reach it, the forward record
//! stands. Excluded modules are never recorded and never traversed.

pub mod features;
pub mod paths;
pub mod report;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use glob::Pattern;
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub use paths::{ImpactPath, PathType};
pub use report::{ImpactAnalysisReport, ImpactSummary, MitigationStrategy, PerformanceImpact, TestImpact};

use crate::config::{ImpactConfig, RiskThresholds};
use crate::cycles;
use crate::domain::{
    ChangeKind, ChangeSet, DependencyEdge, DependencyKind, DependencyStrength, Module, ModuleId,
    RiskLevel,
};
use crate::error::Result;
use crate::graph::{DependencyGraph, GraphPolicy};
use crate::risk;
use crate::source::{DependencySnapshot, MetadataLookup};

/// Coverage assumed for modules without a measurement.
pub const DEFAULT_TEST_COVERAGE: f64 = 0.8;

/// How a module came to be affected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactDirection {
    /// Named in the change set.
    Changed,
    /// Depends on a changed module.
    Forward,
    /// A changed module depends on it.
    Backward,
}

/// One facet of how a module is affected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactType {
    /// Changed itself.
    Direct,
    /// One hop away.
    Immediate,
    /// Further away.
    Transitive,
    /// Reached over an import.
    Compile,
    /// Reached over a require.
    Runtime,
    /// Reached over inheritance.
    Interface,
    /// Reached over a call.
    Behavior,
    /// The change deletes code.
    Breaking,
    /// The change adds code.
    Additive,
    /// The change modifies code.
    Behavioral,
    /// The change restructures code.
    Structural,
}

impl ImpactType {
    fn for_distance(distance: usize) -> Self {
        match distance {
            0 => Self::Direct,
            1 => Self::Immediate,
            _ => Self::Transitive,
        }
    }

    fn for_kind(kind: DependencyKind) -> Option<Self> {
        match kind {
            DependencyKind::Import => Some(Self::Compile),
            DependencyKind::Require => Some(Self::Runtime),
            DependencyKind::Inherit => Some(Self::Interface),
            DependencyKind::Call => Some(Self::Behavior),
            DependencyKind::Include | DependencyKind::Compose => None,
        }
    }

    fn for_change(kind: ChangeKind) -> Self {
        match kind {
            ChangeKind::Deletion => Self::Breaking,
            ChangeKind::Addition => Self::Additive,
            ChangeKind::Modification => Self::Behavioral,
            ChangeKind::Refactor => Self::Structural,
        }
    }
}

impl fmt::Display for ImpactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Direct => "direct",
            Self::Immediate => "immediate",
            Self::Transitive => "transitive",
            Self::Compile => "compile",
            Self::Runtime => "runtime",
            Self::Interface => "interface",
            Self::Behavior => "behavior",
            Self::Breaking => "breaking",
            Self::Additive => "additive",
            Self::Behavioral => "behavioral",
            Self::Structural => "structural",
        })
    }
}

/// A module reached from a change set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectedModule {
    /// Module path.
    pub module_path: ModuleId,
    /// Language tag, `unknown` when nothing names one.
    pub language: String,
    /// Score in `[0, 10]`.
    pub impact_score: f64,
    /// Class of `impact_score`.
    pub risk_level: RiskLevel,
    /// Facets of the impact.
    pub impact_type: Vec<ImpactType>,
    /// Hops from the nearest changed module; 0 when changed.
    pub distance_from_change: usize,
    /// Pass that reached the module.
    pub direction: ImpactDirection,
    /// Kind of the connecting edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_type: Option<DependencyKind>,
    /// Strength of the connecting edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_strength: Option<DependencyStrength>,
    /// Human-readable explanation.
    pub reason_for_impact: String,
    /// Guessed product features.
    pub affected_features: Vec<String>,
    /// Coverage ratio, [`DEFAULT_TEST_COVERAGE`] when unmeasured.
    pub test_coverage: f64,
    /// Last modification, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

/// Impact score of a module `distance` hops from the change.
///
/// `strength` is the connecting edge's strength; changed modules have none
/// and keep the full score.
#[must_use]
pub fn impact_score(
    distance: usize,
    strength: Option<DependencyStrength>,
    change: ChangeKind,
    coverage: f64,
) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let mut score = 10.0 - 1.5 * distance as f64;
    score *= strength.map_or(1.0, DependencyStrength::impact_multiplier);
    score *= change.impact_multiplier();
    if coverage < 0.5 {
        score *= 1.3;
    } else if coverage > 0.8 {
        score *= 0.9;
    }
    score.clamp(0.0, 10.0)
}

/// Classifies an impact score.
#[must_use]
pub fn risk_level(score: f64, thresholds: &RiskThresholds) -> RiskLevel {
    if score >= thresholds.high {
        RiskLevel::High
    } else if score >= thresholds.medium {
        RiskLevel::Medium
    } else if score >= thresholds.low {
        RiskLevel::Low
    } else {
        RiskLevel::Minimal
    }
}

fn reason(distance: usize, strength: Option<DependencyStrength>, change: ChangeKind) -> String {
    if distance == 0 {
        return "Module is directly modified".to_string();
    }
    let mut reason = if distance == 1 {
        "Module directly depends on modified code".to_string()
    } else {
        format!("Module transitively affected through {distance}-degree dependency")
    };
    reason.push_str(match strength {
        Some(DependencyStrength::Strong) => " (strong coupling)",
        Some(DependencyStrength::Weak) => " (weak coupling)",
        Some(DependencyStrength::Optional) => " (optional dependency)",
        None => "",
    });
    reason.push_str(match change {
        ChangeKind::Deletion => " - may break functionality",
        ChangeKind::Modification => " - may change behavior",
        ChangeKind::Addition => " - may affect interfaces",
        ChangeKind::Refactor => "",
    });
    reason
}

/// A module reached by propagation, before scoring.
struct Reached {
    module: ModuleId,
    distance: usize,
    direction: ImpactDirection,
    edge: Option<DependencyEdge>,
}

/// Analyzes change sets against one dependency snapshot.
///
/// Graphs are built once in [`ImpactAnalyzer::new`] and shared read-only
/// by every analysis, including the parallel ones in
/// [`ImpactAnalyzer::analyze_batch`].
pub struct ImpactAnalyzer<'a, M: ?Sized> {
    config: &'a ImpactConfig,
    exclusions: Vec<Pattern>,
    dependents: DependencyGraph,
    dependencies: DependencyGraph,
    components: HashMap<ModuleId, usize>,
    metadata: &'a M,
}

impl<'a, M: MetadataLookup + ?Sized> ImpactAnalyzer<'a, M> {
    /// Builds both graph orientations under the impact policy.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if the config fails
    /// [`ImpactConfig::validate`], including an invalid exclusion pattern.
    pub fn new(
        config: &'a ImpactConfig,
        modules: &[Module],
        edges: &[DependencyEdge],
        metadata: &'a M,
    ) -> Result<Self> {
        config.validate()?;
        let policy = GraphPolicy {
            include_external: config.include_external,
            include_weak: config.consider_weak_deps,
        };
        let dependencies = DependencyGraph::forward(modules, edges, policy);
        let dependents = DependencyGraph::reverse(modules, edges, policy);
        let components = cycles::strongly_connected_components(&dependencies)
            .into_iter()
            .enumerate()
            .flat_map(|(i, members)| members.into_iter().map(move |m| (m, i)))
            .collect();
        Ok(Self {
            config,
            exclusions: config.compiled_exclusions()?,
            dependents,
            dependencies,
            components,
            metadata,
        })
    }

    /// Whether `module` matches an exclusion pattern, by full path or by
    /// final segment.
    #[must_use]
    pub fn is_excluded(&self, module: &ModuleId) -> bool {
        self.exclusions
            .iter()
            .any(|p| p.matches(module.as_str()) || p.matches(module.file_name()))
    }

    /// Analyzes a change set, stamping the report with the current time.
    #[must_use]
    pub fn analyze(&self, change: &ChangeSet) -> ImpactAnalysisReport {
        self.analyze_at(change, Utc::now())
    }

    /// Analyzes a change set as of `at`.
    ///
    /// `at` stamps the report and anchors "recently modified".
    #[must_use]
    pub fn analyze_at(&self, change: &ChangeSet, at: DateTime<Utc>) -> ImpactAnalysisReport {
        tracing::debug!(
            change = %change.id,
            changed = change.changed_modules.len(),
            "Starting impact analysis"
        );

        let reached = self.propagate(&change.changed_modules);
        let mut affected: Vec<AffectedModule> = reached
            .into_iter()
            .map(|r| self.score(r, change))
            .filter(|m| m.distance_from_change == 0 || m.impact_score >= self.config.impact_threshold)
            .collect();
        affected.sort_by(|a, b| {
            b.impact_score
                .total_cmp(&a.impact_score)
                .then_with(|| a.distance_from_change.cmp(&b.distance_from_change))
                .then_with(|| a.module_path.cmp(&b.module_path))
        });

        let excluded = |m: &ModuleId| self.is_excluded(m);
        let ctx = paths::PathContext {
            dependents: &self.dependents,
            dependencies: &self.dependencies,
            components: &self.components,
            excluded: &excluded,
        };
        let impact_paths = paths::trace(&ctx, &change.changed_modules, &affected);
        let assessment = risk::assess(change, &affected, &impact_paths, &self.config.risk_levels, at);

        let report = report::build(
            change,
            affected,
            impact_paths,
            assessment,
            self.config.analyze_test_impact,
            at,
        );
        tracing::info!(
            change = %change.id,
            affected = report.affected_modules.len(),
            paths = report.impact_paths.len(),
            risk = %report.risk_assessment.overall_risk,
            "Impact analysis complete"
        );
        report
    }

    /// Analyzes independent change sets in parallel.
    ///
    /// Reports come back in input order.
    #[must_use]
    pub fn analyze_batch(&self, changes: &[ChangeSet], at: DateTime<Utc>) -> Vec<ImpactAnalysisReport>
    where
        M: Sync,
    {
        changes.par_iter().map(|c| self.analyze_at(c, at)).collect()
    }

    fn propagate(&self, changed: &[ModuleId]) -> Vec<Reached> {
        let mut recorded: BTreeMap<ModuleId, Reached> = BTreeMap::new();
        let mut order: Vec<ModuleId> = Vec::new();
        let sources: Vec<&ModuleId> = changed.iter().filter(|m| !self.is_excluded(m)).collect();

        for &module in &sources {
            if !recorded.contains_key(module) {
                order.push(module.clone());
                recorded.insert(
                    module.clone(),
                    Reached {
                        module: module.clone(),
                        distance: 0,
                        direction: ImpactDirection::Changed,
                        edge: None,
                    },
                );
            }
        }

        for (graph, direction) in [
            (&self.dependents, ImpactDirection::Forward),
            (&self.dependencies, ImpactDirection::Backward),
        ] {
            for (distance, node, edge) in self.levels(graph, &sources) {
                let module = graph.module(node);
                if recorded.contains_key(module) {
                    continue;
                }
                order.push(module.clone());
                recorded.insert(
                    module.clone(),
                    Reached {
                        module: module.clone(),
                        distance,
                        direction,
                        edge,
                    },
                );
            }
        }

        order
            .into_iter()
            .filter_map(|m| recorded.remove(&m))
            .collect()
    }

    /// Breadth-first levels from all sources at once, up to `max_depth`.
    ///
    /// Each newly reached node carries the tightest edge from the previous
    /// level.
    fn levels(
        &self,
        graph: &DependencyGraph,
        sources: &[&ModuleId],
    ) -> Vec<(usize, NodeIndex, Option<DependencyEdge>)> {
        let mut frontier: Vec<NodeIndex> = sources.iter().filter_map(|m| graph.node(m)).collect();
        let mut visited: HashSet<NodeIndex> = frontier.iter().copied().collect();
        let mut out = Vec::new();

        for distance in 1..=self.config.max_depth {
            let previous: HashSet<NodeIndex> = frontier.iter().copied().collect();
            let mut next = Vec::new();
            for &u in &frontier {
                for v in graph.successors_sorted(u) {
                    if self.is_excluded(graph.module(v)) || !visited.insert(v) {
                        continue;
                    }
                    next.push(v);
                }
            }
            if next.is_empty() {
                break;
            }
            for &v in &next {
                out.push((distance, v, connecting_edge(graph, &previous, v)));
            }
            frontier = next;
        }
        out
    }

    fn score(&self, reached: Reached, change: &ChangeSet) -> AffectedModule {
        let Reached {
            module,
            distance,
            direction,
            edge,
        } = reached;
        let strength = edge.as_ref().map(|e| e.strength);
        let kind = edge.as_ref().map(|e| e.kind);
        let coverage = self
            .metadata
            .test_coverage(&module)
            .unwrap_or(DEFAULT_TEST_COVERAGE);
        let language = self
            .metadata
            .language(&module)
            .map(ToString::to_string)
            .or_else(|| edge.as_ref().map(|e| e.language.clone()))
            .or_else(|| (distance == 0 && !change.language.is_empty()).then(|| change.language.clone()))
            .unwrap_or_else(|| "unknown".to_string());

        let impact_score = impact_score(distance, strength, change.change_kind, coverage);
        let mut impact_type = vec![ImpactType::for_distance(distance)];
        impact_type.extend(kind.and_then(ImpactType::for_kind));
        impact_type.push(ImpactType::for_change(change.change_kind));

        AffectedModule {
            affected_features: features::affected_features(&module, &language),
            reason_for_impact: reason(distance, strength, change.change_kind),
            last_modified: self.metadata.last_modified(&module),
            risk_level: risk_level(impact_score, &self.config.risk_levels),
            module_path: module,
            language,
            impact_score,
            impact_type,
            distance_from_change: distance,
            direction,
            dependency_type: kind,
            dependency_strength: strength,
            test_coverage: coverage,
        }
    }
}

/// Tightest, then heaviest, edge into `v` from any node in `previous`.
fn connecting_edge(
    graph: &DependencyGraph,
    previous: &HashSet<NodeIndex>,
    v: NodeIndex,
) -> Option<DependencyEdge> {
    graph
        .inner()
        .edges_directed(v, Direction::Incoming)
        .filter(|e| previous.contains(&e.source()))
        .filter_map(|e| graph.strongest_edge(e.source(), v).map(|edge| (e.source(), edge)))
        .max_by(|(ua, a), (ub, b)| {
            a.strength
                .cmp(&b.strength)
                .then_with(|| a.weight().total_cmp(&b.weight()))
                .then_with(|| graph.module(*ub).cmp(graph.module(*ua)))
        })
        .map(|(_, edge)| edge.clone())
}

/// Analyzes independent change sets against one snapshot in parallel.
///
/// # Errors
///
/// Returns [`crate::Error::Config`] if an exclusion pattern is invalid.
pub fn analyze_batch(
    snapshot: &DependencySnapshot,
    changes: &[ChangeSet],
    config: &ImpactConfig,
    at: DateTime<Utc>,
) -> Result<Vec<ImpactAnalysisReport>> {
    let analyzer = ImpactAnalyzer::new(config, snapshot.modules(), snapshot.edges(), snapshot)?;
    Ok(analyzer.analyze_batch(changes, at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn edge(from: &str, to: &str, strength: DependencyStrength) -> DependencyEdge {
        DependencyEdge::new(from, to, DependencyKind::Import, strength, "go")
    }

    fn analyze(edges: &[DependencyEdge], changed: &[&str]) -> ImpactAnalysisReport {
        let config = ImpactConfig::default();
        let snapshot = DependencySnapshot::new(Vec::new(), edges.to_vec(), Vec::new());
        let analyzer = ImpactAnalyzer::new(&config, &[], edges, &snapshot).unwrap();
        let change = ChangeSet::new("c1", changed.iter().copied(), ChangeKind::Modification, Utc::now());
        analyzer.analyze(&change)
    }

    fn find<'r>(report: &'r ImpactAnalysisReport, path: &str) -> Option<&'r AffectedModule> {
        report
            .affected_modules
            .iter()
            .find(|m| m.module_path.as_str() == path)
    }

    #[rstest]
    #[case(0, None, ChangeKind::Modification, 0.8, 10.0)]
    #[case(1, Some(DependencyStrength::Strong), ChangeKind::Modification, 0.8, 8.5)]
    #[case(1, Some(DependencyStrength::Weak), ChangeKind::Modification, 0.8, 5.95)]
    #[case(2, Some(DependencyStrength::Optional), ChangeKind::Deletion, 0.3, 5.46)]
    #[case(0, None, ChangeKind::Deletion, 0.3, 10.0)]
    #[case(9, Some(DependencyStrength::Strong), ChangeKind::Modification, 0.8, 0.0)]
    #[case(1, Some(DependencyStrength::Strong), ChangeKind::Addition, 0.9, 6.12)]
    fn impact_scores(
        #[case] distance: usize,
        #[case] strength: Option<DependencyStrength>,
        #[case] change: ChangeKind,
        #[case] coverage: f64,
        #[case] expected: f64,
    ) {
        let got = impact_score(distance, strength, change, coverage);
        assert!((got - expected).abs() < 1e-9, "got {got}");
    }

    #[rstest]
    #[case(7.0, RiskLevel::High)]
    #[case(6.99, RiskLevel::Medium)]
    #[case(1.0, RiskLevel::Low)]
    #[case(0.5, RiskLevel::Minimal)]
    fn risk_levels(#[case] score: f64, #[case] expected: RiskLevel) {
        assert_eq!(risk_level(score, &RiskThresholds::default()), expected);
    }

    #[test]
    fn dependencies_are_backward_and_dependents_forward() {
        let edges = vec![
            edge("a", "b", DependencyStrength::Strong),
            edge("b", "c", DependencyStrength::Strong),
            edge("x", "a", DependencyStrength::Strong),
        ];

        let report = analyze(&edges, &["a"]);

        let a = find(&report, "a").unwrap();
        assert_eq!((a.distance_from_change, a.direction), (0, ImpactDirection::Changed));
        let x = find(&report, "x").unwrap();
        assert_eq!((x.distance_from_change, x.direction), (1, ImpactDirection::Forward));
        assert!(x.impact_score > 0.0);
        let b = find(&report, "b").unwrap();
        assert_eq!((b.distance_from_change, b.direction), (1, ImpactDirection::Backward));
        let c = find(&report, "c").unwrap();
        assert_eq!(c.distance_from_change, 2);
        assert!(c.impact_score < b.impact_score);
    }

    #[test]
    fn forward_record_wins_when_reachable_both_ways() {
        let edges = vec![
            edge("a", "b", DependencyStrength::Strong),
            edge("b", "a", DependencyStrength::Weak),
        ];

        let report = analyze(&edges, &["a"]);
        let b = find(&report, "b").unwrap();

        assert_eq!(b.direction, ImpactDirection::Forward);
        assert_eq!(b.dependency_strength, Some(DependencyStrength::Weak));
    }

    #[test]
    fn distance_is_the_shortest_hop_count() {
        let edges = vec![
            edge("x", "y", DependencyStrength::Strong),
            edge("y", "a", DependencyStrength::Strong),
            edge("x", "a", DependencyStrength::Weak),
        ];

        let report = analyze(&edges, &["a"]);

        assert_eq!(find(&report, "x").unwrap().distance_from_change, 1);
        assert_eq!(find(&report, "y").unwrap().distance_from_change, 1);
    }

    #[test]
    fn excluded_modules_block_traversal() {
        let edges = vec![
            edge("test_helpers", "a", DependencyStrength::Strong),
            edge("z", "test_helpers", DependencyStrength::Strong),
            edge("pkg/mock_db", "a", DependencyStrength::Strong),
        ];

        let report = analyze(&edges, &["a"]);

        assert!(find(&report, "test_helpers").is_none());
        assert!(find(&report, "z").is_none());
        assert!(find(&report, "pkg/mock_db").is_none());
    }

    #[test]
    fn depth_limit_stops_propagation() {
        let edges: Vec<DependencyEdge> = (0..5)
            .map(|i| edge(&format!("m{}", i + 1), &format!("m{i}"), DependencyStrength::Strong))
            .collect();
        let config = ImpactConfig {
            max_depth: 2,
            ..ImpactConfig::default()
        };
        let snapshot = DependencySnapshot::default();
        let analyzer = ImpactAnalyzer::new(&config, &[], &edges, &snapshot).unwrap();
        let change = ChangeSet::new("c", ["m0"], ChangeKind::Modification, Utc::now());

        let report = analyzer.analyze(&change);
        let mut reached: Vec<&str> = report
            .affected_modules
            .iter()
            .map(|m| m.module_path.as_str())
            .collect();
        reached.sort_unstable();

        assert_eq!(reached, vec!["m0", "m1", "m2"]);
    }

    #[test]
    fn low_scores_are_filtered_but_changed_modules_stay() {
        let edges = vec![edge("x", "a", DependencyStrength::Optional)];
        let config = ImpactConfig {
            impact_threshold: 5.0,
            ..ImpactConfig::default()
        };
        let snapshot = DependencySnapshot::default();
        let analyzer = ImpactAnalyzer::new(&config, &[], &edges, &snapshot).unwrap();
        let change = ChangeSet::new("c", ["a"], ChangeKind::Modification, Utc::now());

        let report = analyzer.analyze(&change);

        assert_eq!(report.affected_modules.len(), 1);
        assert_eq!(report.affected_modules[0].module_path.as_str(), "a");
    }

    #[test]
    fn reasons_and_types_describe_the_hop() {
        let edges = vec![DependencyEdge::new(
            "x",
            "a",
            DependencyKind::Inherit,
            DependencyStrength::Weak,
            "java",
        )];
        let config = ImpactConfig::default();
        let snapshot = DependencySnapshot::default();
        let analyzer = ImpactAnalyzer::new(&config, &[], &edges, &snapshot).unwrap();
        let change = ChangeSet::new("c", ["a"], ChangeKind::Deletion, Utc::now());

        let report = analyzer.analyze(&change);
        let x = find(&report, "x").unwrap();

        assert_eq!(
            x.reason_for_impact,
            "Module directly depends on modified code (weak coupling) - may break functionality"
        );
        assert_eq!(
            x.impact_type,
            vec![ImpactType::Immediate, ImpactType::Interface, ImpactType::Breaking]
        );
        assert_eq!(x.language, "java");
    }

    #[test]
    fn external_edges_do_not_propagate_by_default() {
        let edges = vec![edge("x", "a", DependencyStrength::Strong).external()];

        let report = analyze(&edges, &["a"]);

        let reached: Vec<&str> = report
            .affected_modules
            .iter()
            .map(|m| m.module_path.as_str())
            .collect();
        assert_eq!(reached, vec!["a"]);
    }

    #[test]
    fn optional_edges_propagate_when_weak_ones_are_skipped() {
        let edges = vec![
            edge("x", "a", DependencyStrength::Optional),
            edge("y", "a", DependencyStrength::Weak),
        ];
        let config = ImpactConfig {
            consider_weak_deps: false,
            ..ImpactConfig::default()
        };
        let snapshot = DependencySnapshot::default();
        let analyzer = ImpactAnalyzer::new(&config, &[], &edges, &snapshot).unwrap();
        let change = ChangeSet::new("c", ["a"], ChangeKind::Modification, Utc::now());

        let report = analyzer.analyze(&change);

        assert!(find(&report, "x").is_some());
        assert!(find(&report, "y").is_none());
    }

    #[rstest]
    #[case::zero_depth(ImpactConfig { max_depth: 0, ..ImpactConfig::default() })]
    #[case::negative_threshold(ImpactConfig { impact_threshold: -1.0, ..ImpactConfig::default() })]
    #[case::bad_glob(ImpactConfig { exclude_patterns: vec!["[".to_string()], ..ImpactConfig::default() })]
    fn invalid_config_is_rejected_at_construction(#[case] config: ImpactConfig) {
        let snapshot = DependencySnapshot::default();

        let result = ImpactAnalyzer::new(&config, &[], &[], &snapshot);

        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn batch_keeps_input_order() {
        let edges = vec![edge("x", "a", DependencyStrength::Strong)];
        let snapshot = DependencySnapshot::new(Vec::new(), edges, Vec::new());
        let at = Utc::now();
        let changes = vec![
            ChangeSet::new("first", ["a"], ChangeKind::Modification, at),
            ChangeSet::new("second", ["x"], ChangeKind::Deletion, at),
        ];

        let reports = analyze_batch(&snapshot, &changes, &ImpactConfig::default(), at).unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].change_set.id, "first");
        assert_eq!(reports[1].change_set.id, "second");
        let config = ImpactConfig::default();
        let analyzer = ImpactAnalyzer::new(&config, &[], snapshot.edges(), &snapshot).unwrap();
        assert_eq!(reports[0], analyzer.analyze_at(&changes[0], at));
    }
}
