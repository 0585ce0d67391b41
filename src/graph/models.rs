//! Graph analytics data models.
//!
//! Defines the complete type system for graph analytics:
//!
//! ## Input types (record source → builder)
//! - [`Scalar`] / [`Attributes`]: open attribute values carried by nodes and edges
//! - [`EdgeRecord`]: one row of the tabular edge list, identifiers already resolved
//!
//! ## Graph types
//! - [`Node`] / [`Edge`]: typed known fields plus a string-keyed sidecar map
//! - [`Graph`]: petgraph wrapper with ID ↔ NodeIndex mapping and a fixed `directed` flag
//!
//! ## Output types (analytics)
//! - [`Metric`] / [`CentralityScores`]: per-node scores, one map per metric
//! - [`StructuralSummary`]: whole-graph scalar statistics
//! - [`ComponentInfo`]: metadata about a connected component
//! - [`GraphAnalytics`]: aggregated result of an analysis run
//!
//! ## Configuration
//! - [`AnalyticsConfig`]: tuning parameters for the analytics algorithms

use chrono::{DateTime, Utc};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

// ============================================================================
// Attribute values
// ============================================================================

/// A scalar attribute value read from the record source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Type a raw tabular cell: integer, then float, then boolean, then text.
    ///
    /// Blank cells carry no value and yield `None`.
    pub fn parse_cell(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Some(Self::Int(i));
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return Some(Self::Float(f));
            }
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "true" => Some(Self::Bool(true)),
            "false" => Some(Self::Bool(false)),
            _ => Some(Self::Text(trimmed.to_string())),
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Open attribute mapping. Ordered so exports are stable.
pub type Attributes = BTreeMap<String, Scalar>;

/// Stable node identity.
pub type NodeId = String;

/// A connected component: the ids of its members.
pub type Component = BTreeSet<NodeId>;

// ============================================================================
// Input types
// ============================================================================

/// One row of the edge list, with the identifier columns already resolved.
///
/// `source`/`target` are optional so that malformed rows reach the builder
/// and are reported instead of being dropped upstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeRecord {
    pub source: Option<String>,
    pub target: Option<String>,
    pub attributes: Attributes,
}

impl EdgeRecord {
    /// Record with both identifiers and no attributes.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            target: Some(target.into()),
            attributes: Attributes::new(),
        }
    }

    /// Attach an attribute (builder style).
    pub fn with_attr(mut self, name: impl Into<String>, value: Scalar) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }
}

// ============================================================================
// Graph types
// ============================================================================

/// A graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier taken from the record source
    pub id: NodeId,
    /// Arbitrary extra attributes
    #[serde(default)]
    pub attributes: Attributes,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Attributes::new(),
        }
    }
}

/// A graph edge. Endpoints are held by the enclosing [`Graph`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Explicit weight, if the source data supplied one
    pub weight: Option<f64>,
    /// Every other non-identifier field
    #[serde(default)]
    pub attributes: Attributes,
}

impl Edge {
    /// Weight with the 1.0 default applied.
    pub fn weight_or_default(&self) -> f64 {
        self.weight.unwrap_or(1.0)
    }

    /// Overlay a later record for the same pair: its values win key by key.
    pub(crate) fn merge(&mut self, later: Edge) {
        if later.weight.is_some() {
            self.weight = later.weight;
        }
        self.attributes.extend(later.attributes);
    }
}

/// In/out edge counts of one node. Their sum is the node's degree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct DegreeCount {
    pub incoming: usize,
    pub outgoing: usize,
}

impl DegreeCount {
    pub fn total(&self) -> usize {
        self.incoming + self.outgoing
    }
}

/// Index-based neighbour lists used by the traversal algorithms.
///
/// For undirected graphs both lists are the symmetric neighbourhood.
/// A self-loop appears once in its node's lists.
#[derive(Debug, Clone)]
pub(crate) struct Adjacency {
    pub successors: Vec<Vec<usize>>,
    pub predecessors: Vec<Vec<usize>>,
}

/// Wrapper around `petgraph::DiGraph` with ID ↔ NodeIndex mapping.
///
/// Undirected graphs are stored with each edge in the orientation of the
/// record that first introduced it; every algorithm consults `directed`
/// rather than the storage orientation. Nodes are never removed, so node
/// indices are dense and follow first-seen order.
///
/// Construction is crate-private: graphs come from
/// [`build`](super::builder::build) or the subgraph extractors and are
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct Graph {
    graph: DiGraph<Node, Edge>,
    id_to_index: HashMap<NodeId, NodeIndex>,
    edge_lookup: HashMap<(NodeIndex, NodeIndex), EdgeIndex>,
    directed: bool,
}

impl Graph {
    pub(crate) fn with_capacity(directed: bool, nodes: usize, edges: usize) -> Self {
        Self {
            graph: DiGraph::with_capacity(nodes, edges),
            id_to_index: HashMap::with_capacity(nodes),
            edge_lookup: HashMap::with_capacity(edges),
            directed,
        }
    }

    /// Add a node. If a node with the same ID already exists, returns its index.
    pub(crate) fn add_node(&mut self, node: Node) -> NodeIndex {
        if let Some(&idx) = self.id_to_index.get(&node.id) {
            return idx;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.id_to_index.insert(id, idx);
        idx
    }

    /// Add an edge, coalescing with an existing edge for the same pair.
    pub(crate) fn upsert_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: Edge) -> EdgeIndex {
        let key = self.pair_key(from, to);
        if let Some(&existing) = self.edge_lookup.get(&key) {
            self.graph[existing].merge(edge);
            return existing;
        }
        let idx = self.graph.add_edge(from, to, edge);
        self.edge_lookup.insert(key, idx);
        idx
    }

    fn pair_key(&self, a: NodeIndex, b: NodeIndex) -> (NodeIndex, NodeIndex) {
        if self.directed || a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Whether edges are ordered pairs.
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of (coalesced) edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Get a node by its ID.
    pub fn node(&self, id: &str) -> Option<&Node> {
        let idx = self.id_to_index.get(id)?;
        self.graph.node_weight(*idx)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.id_to_index.contains_key(id)
    }

    /// Nodes in first-seen order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// Edges as `(source id, target id, edge)` in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &Edge)> + '_ {
        self.graph.edge_references().map(move |e| {
            (
                self.graph[e.source()].id.as_str(),
                self.graph[e.target()].id.as_str(),
                e.weight(),
            )
        })
    }

    /// The edge joining two nodes. Direction matters only for directed graphs.
    pub fn edge_between(&self, a: &str, b: &str) -> Option<&Edge> {
        let a = self.index_of(a)?;
        let b = self.index_of(b)?;
        let idx = self.edge_lookup.get(&self.pair_key(a, b))?;
        self.graph.edge_weight(*idx)
    }

    /// Total degree (in + out for directed, self-loops counted twice).
    pub fn degree(&self, id: &str) -> Option<usize> {
        let idx = self.index_of(id)?;
        Some(self.degree_counts()[idx.index()].total())
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.id_to_index.get(id).copied()
    }

    /// ID of the node at a dense index.
    pub(crate) fn id_at(&self, index: usize) -> &str {
        &self.graph[NodeIndex::new(index)].id
    }

    /// Nodes with their dense index.
    pub(crate) fn indexed_nodes(&self) -> impl Iterator<Item = (usize, &Node)> + '_ {
        self.graph
            .node_indices()
            .map(move |idx| (idx.index(), &self.graph[idx]))
    }

    /// Edges as dense `(source, target)` index pairs in storage orientation.
    pub(crate) fn index_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index()))
    }

    /// Raw edge references for subgraph copying.
    pub(crate) fn raw_edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, &Edge)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.source(), e.target(), e.weight()))
    }

    /// In/out edge counts per node, by dense index.
    pub(crate) fn degree_counts(&self) -> Vec<DegreeCount> {
        let mut counts = vec![DegreeCount::default(); self.node_count()];
        for (s, t) in self.index_pairs() {
            counts[s].outgoing += 1;
            counts[t].incoming += 1;
        }
        counts
    }

    /// Neighbour lists honouring the `directed` flag.
    pub(crate) fn adjacency(&self) -> Adjacency {
        let n = self.node_count();
        let mut successors = vec![Vec::new(); n];
        let mut predecessors = vec![Vec::new(); n];
        for (s, t) in self.index_pairs() {
            successors[s].push(t);
            predecessors[t].push(s);
            if !self.directed && s != t {
                successors[t].push(s);
                predecessors[s].push(t);
            }
        }
        Adjacency {
            successors,
            predecessors,
        }
    }

    /// Neighbour sets of the undirected simple view (no self-loops, no direction).
    pub(crate) fn simple_neighbor_sets(&self) -> Vec<HashSet<usize>> {
        let mut sets = vec![HashSet::new(); self.node_count()];
        for (s, t) in self.index_pairs() {
            if s != t {
                sets[s].insert(t);
                sets[t].insert(s);
            }
        }
        sets
    }
}

// ============================================================================
// Output types: analytics results
// ============================================================================

/// Centrality measures produced by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Degree,
    InDegree,
    OutDegree,
    Closeness,
    Betweenness,
    Eigenvector,
}

impl Metric {
    /// Every metric, cheapest first.
    pub const ALL: [Metric; 6] = [
        Metric::Degree,
        Metric::InDegree,
        Metric::OutDegree,
        Metric::Closeness,
        Metric::Betweenness,
        Metric::Eigenvector,
    ];

    /// Whether the metric only exists for directed graphs.
    pub fn requires_direction(&self) -> bool {
        matches!(self, Self::InDegree | Self::OutDegree)
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Degree => write!(f, "degree"),
            Self::InDegree => write!(f, "in_degree"),
            Self::OutDegree => write!(f, "out_degree"),
            Self::Closeness => write!(f, "closeness"),
            Self::Betweenness => write!(f, "betweenness"),
            Self::Eigenvector => write!(f, "eigenvector"),
        }
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "degree" => Ok(Self::Degree),
            "in_degree" => Ok(Self::InDegree),
            "out_degree" => Ok(Self::OutDegree),
            "closeness" => Ok(Self::Closeness),
            "betweenness" => Ok(Self::Betweenness),
            "eigenvector" => Ok(Self::Eigenvector),
            other => Err(format!(
                "unknown metric '{}' (expected one of: degree, in_degree, out_degree, closeness, betweenness, eigenvector)",
                other
            )),
        }
    }
}

/// Scores of a single metric, keyed by node ID.
pub type CentralityResult = HashMap<NodeId, f64>;

/// Centrality results for whichever metrics were computed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CentralityScores {
    results: BTreeMap<Metric, CentralityResult>,
}

impl CentralityScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, metric: Metric, scores: CentralityResult) {
        self.results.insert(metric, scores);
    }

    pub fn get(&self, metric: Metric) -> Option<&CentralityResult> {
        self.results.get(&metric)
    }

    /// Score of one node under one metric.
    pub fn score(&self, metric: Metric, id: &str) -> Option<f64> {
        self.results.get(&metric)?.get(id).copied()
    }

    /// Metrics present, in stable order.
    pub fn metrics(&self) -> impl Iterator<Item = Metric> + '_ {
        self.results.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Whole-graph scalar statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralSummary {
    pub node_count: usize,
    pub edge_count: usize,
    pub directed: bool,
    /// Edge density in [0, 1], self-loops excluded
    pub density: f64,
    /// Degree assortativity; `None` when undefined (fewer than 2 edges, zero variance)
    pub assortativity: Option<f64>,
    /// Global clustering (closed / all triplets)
    pub transitivity: f64,
    /// Mean degree; `None` for the empty graph
    pub average_degree: Option<f64>,
    /// Mean local clustering coefficient
    pub average_clustering: f64,
    /// Number of self-loop edges
    pub self_loops: usize,
    /// Number of weakly connected components
    pub weak_component_count: usize,
    /// Number of strongly connected components (directed graphs only)
    pub strong_component_count: Option<usize>,
}

/// Metadata about a connected component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentInfo {
    /// Position in the size-ordered component list
    pub id: u32,
    /// Number of nodes in this component
    pub size: usize,
    /// Node IDs belonging to this component, sorted
    pub members: Vec<NodeId>,
    /// Whether this is the largest (main) component
    pub is_main: bool,
}

// ============================================================================
// Aggregated analytics result
// ============================================================================

/// Complete result of an analysis run over one graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphAnalytics {
    /// Whole-graph statistics
    pub summary: StructuralSummary,
    /// Weakly connected components, largest first
    pub weak_components: Vec<ComponentInfo>,
    /// Strongly connected components (directed graphs only)
    pub strong_components: Option<Vec<ComponentInfo>>,
    /// Requested centrality metrics
    pub centrality: CentralityScores,
    /// Whether degree centrality stood in for a non-convergent eigenvector run
    pub eigenvector_fallback: bool,
    /// Computation time in milliseconds
    pub computation_ms: u64,
    /// When the analysis finished
    pub computed_at: DateTime<Utc>,
}

// ============================================================================
// Configuration
// ============================================================================

/// Tuning parameters for graph analytics algorithms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Eigenvector convergence tolerance on the max component change (default: 1e-6)
    pub eigenvector_tolerance: f64,
    /// Eigenvector maximum iterations (default: 100)
    pub eigenvector_max_iterations: usize,
    /// Substitute degree centrality when eigenvector iteration fails (default: false)
    pub eigenvector_degree_fallback: bool,
    /// Report normalized betweenness (default: true)
    pub betweenness_normalized: bool,
    /// Node count from which Brandes' source loop runs on the rayon pool (default: 200)
    pub parallel_threshold: usize,
    /// Wall-clock budget for a full analysis, in milliseconds (default: none)
    pub budget_ms: Option<u64>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            eigenvector_tolerance: 1e-6,
            eigenvector_max_iterations: 100,
            eigenvector_degree_fallback: false,
            betweenness_normalized: true,
            parallel_threshold: 200,
            budget_ms: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn undirected_pair() -> Graph {
        let mut g = Graph::with_capacity(false, 2, 1);
        let a = g.add_node(Node::new("a"));
        let b = g.add_node(Node::new("b"));
        g.upsert_edge(a, b, Edge::default());
        g
    }

    // --- AnalyticsConfig ---

    #[test]
    fn test_analytics_config_defaults() {
        let config = AnalyticsConfig::default();
        assert!((config.eigenvector_tolerance - 1e-6).abs() < f64::EPSILON);
        assert_eq!(config.eigenvector_max_iterations, 100);
        assert!(!config.eigenvector_degree_fallback);
        assert!(config.betweenness_normalized);
        assert_eq!(config.parallel_threshold, 200);
        assert!(config.budget_ms.is_none());
    }

    #[test]
    fn test_analytics_config_partial_yaml() {
        let config: AnalyticsConfig =
            serde_yaml::from_str("eigenvector_max_iterations: 500\nbudget_ms: 250\n").unwrap();
        assert_eq!(config.eigenvector_max_iterations, 500);
        assert_eq!(config.budget_ms, Some(250));
        // Unspecified fields keep their defaults
        assert!(config.betweenness_normalized);
    }

    // --- Scalar ---

    #[test]
    fn test_scalar_parse_cell_typing() {
        assert_eq!(Scalar::parse_cell("42"), Some(Scalar::Int(42)));
        assert_eq!(Scalar::parse_cell(" 2.5 "), Some(Scalar::Float(2.5)));
        assert_eq!(Scalar::parse_cell("TRUE"), Some(Scalar::Bool(true)));
        assert_eq!(
            Scalar::parse_cell("Directed"),
            Some(Scalar::Text("Directed".to_string()))
        );
        assert_eq!(Scalar::parse_cell("   "), None);
    }

    #[test]
    fn test_scalar_json_is_untagged() {
        let json = serde_json::to_string(&Scalar::Int(3)).unwrap();
        assert_eq!(json, "3");
        let back: Scalar = serde_json::from_str("\"x\"").unwrap();
        assert_eq!(back, Scalar::Text("x".to_string()));
    }

    // --- Metric ---

    #[test]
    fn test_metric_display_parse_agree() {
        for metric in Metric::ALL {
            let parsed: Metric = metric.to_string().parse().unwrap();
            assert_eq!(parsed, metric);
        }
        assert_eq!("In-Degree".parse::<Metric>(), Ok(Metric::InDegree));
        assert!("pagerank".parse::<Metric>().is_err());
    }

    // --- Edge ---

    #[test]
    fn test_edge_merge_later_wins() {
        let mut first = Edge {
            weight: Some(2.0),
            attributes: Attributes::from([
                ("kind".to_string(), Scalar::Text("a".into())),
                ("since".to_string(), Scalar::Int(2001)),
            ]),
        };
        first.merge(Edge {
            weight: None,
            attributes: Attributes::from([("kind".to_string(), Scalar::Text("b".into()))]),
        });
        assert_eq!(first.weight, Some(2.0));
        assert_eq!(first.attributes["kind"], Scalar::Text("b".into()));
        assert_eq!(first.attributes["since"], Scalar::Int(2001));
    }

    #[test]
    fn test_edge_default_weight() {
        assert!((Edge::default().weight_or_default() - 1.0).abs() < f64::EPSILON);
    }

    // --- Graph ---

    #[test]
    fn test_graph_add_node_idempotent() {
        let mut g = Graph::with_capacity(false, 1, 0);
        let idx1 = g.add_node(Node::new("x"));
        let idx2 = g.add_node(Node::new("x"));
        assert_eq!(idx1, idx2);
        assert_eq!(g.node_count(), 1);
    }

    #[test]
    fn test_graph_undirected_edge_coalesces_reverse_pair() {
        let mut g = undirected_pair();
        let a = g.index_of("a").unwrap();
        let b = g.index_of("b").unwrap();
        g.upsert_edge(b, a, Edge::default());
        assert_eq!(g.edge_count(), 1);
        assert!(g.edge_between("b", "a").is_some());
    }

    #[test]
    fn test_graph_directed_keeps_reverse_pair() {
        let mut g = Graph::with_capacity(true, 2, 2);
        let a = g.add_node(Node::new("a"));
        let b = g.add_node(Node::new("b"));
        g.upsert_edge(a, b, Edge::default());
        g.upsert_edge(b, a, Edge::default());
        assert_eq!(g.edge_count(), 2);
        assert!(g.edge_between("a", "b").is_some());
        assert!(g.edge_between("b", "a").is_some());
    }

    #[test]
    fn test_graph_self_loop_counts_twice() {
        let mut g = Graph::with_capacity(false, 1, 1);
        let a = g.add_node(Node::new("a"));
        g.upsert_edge(a, a, Edge::default());
        assert_eq!(g.degree("a"), Some(2));
        let adj = g.adjacency();
        assert_eq!(adj.successors[0], vec![0]);
        assert!(g.simple_neighbor_sets()[0].is_empty());
    }

    #[test]
    fn test_graph_adjacency_symmetric_when_undirected() {
        let g = undirected_pair();
        let adj = g.adjacency();
        assert_eq!(adj.successors[0], vec![1]);
        assert_eq!(adj.successors[1], vec![0]);
        assert_eq!(adj.predecessors[0], vec![1]);
    }

    #[test]
    fn test_graph_get_nonexistent() {
        let g = undirected_pair();
        assert!(g.node("zzz").is_none());
        assert!(g.degree("zzz").is_none());
        assert!(!g.contains_node("zzz"));
    }

    // --- CentralityScores ---

    #[test]
    fn test_centrality_scores_lookup() {
        let mut scores = CentralityScores::new();
        assert!(scores.is_empty());
        scores.insert(
            Metric::Degree,
            CentralityResult::from([("a".to_string(), 0.5)]),
        );
        assert_eq!(scores.score(Metric::Degree, "a"), Some(0.5));
        assert_eq!(scores.score(Metric::Closeness, "a"), None);
        assert_eq!(scores.metrics().collect::<Vec<_>>(), vec![Metric::Degree]);
    }
}
