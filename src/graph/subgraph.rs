//! Derived subgraph extraction.
//!
//! Every extractor returns a fresh [`Graph`] that owns copies of the parent's
//! node and edge attributes. Node order and edge orientation follow the
//! parent, and the `directed` flag is inherited.

use petgraph::graph::NodeIndex;
use std::collections::{HashMap, HashSet};

use super::models::{Component, Graph};
use crate::error::{GraphError, Result};

/// Keep the `n` highest-degree nodes and the edges among them.
///
/// Nodes are ranked by total degree descending, ties broken by ID
/// ascending. `n` must lie in `1..=node_count`.
pub fn top_n_by_degree(graph: &Graph, n: usize) -> Result<Graph> {
    let available = graph.node_count();
    if n == 0 || n > available {
        return Err(GraphError::Range {
            requested: n,
            available,
        });
    }

    let degrees = graph.degree_counts();
    let mut ranked: Vec<usize> = (0..available).collect();
    ranked.sort_by(|&a, &b| {
        degrees[b]
            .total()
            .cmp(&degrees[a].total())
            .then_with(|| graph.id_at(a).cmp(graph.id_at(b)))
    });

    let keep: HashSet<usize> = ranked.into_iter().take(n).collect();
    Ok(induced(graph, |i| keep.contains(&i)))
}

/// Induced subgraph over exactly the given node set.
///
/// Fails with [`GraphError::UnknownNode`] if an ID is not in the graph.
pub fn from_component(graph: &Graph, members: &Component) -> Result<Graph> {
    let mut keep = HashSet::with_capacity(members.len());
    for id in members {
        let idx = graph
            .index_of(id)
            .ok_or_else(|| GraphError::UnknownNode(id.clone()))?;
        keep.insert(idx.index());
    }
    Ok(induced(graph, |i| keep.contains(&i)))
}

fn induced(graph: &Graph, keep: impl Fn(usize) -> bool) -> Graph {
    let mut sub = Graph::with_capacity(graph.is_directed(), graph.node_count(), graph.edge_count());
    let mut remap: HashMap<usize, NodeIndex> = HashMap::new();

    for (i, node) in graph.indexed_nodes() {
        if keep(i) {
            remap.insert(i, sub.add_node(node.clone()));
        }
    }
    for (source, target, edge) in graph.raw_edges() {
        if let (Some(&from), Some(&to)) = (remap.get(&source.index()), remap.get(&target.index())) {
            sub.upsert_edge(from, to, edge.clone());
        }
    }
    sub
}

// ============================================================================
// Tests
// ============================================================================
