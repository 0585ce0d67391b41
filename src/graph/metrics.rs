//! Whole-graph structural statistics.
//!
//! Everything here is a pure function of the graph. Statistics whose
//! mathematical definition does not cover a degenerate input are reported as
//! `None` instead of a made-up number.

use super::components::{strong_components, weak_components};
use super::models::{DegreeCount, Graph, StructuralSummary};

/// Variances below this are treated as zero.
const VARIANCE_EPSILON: f64 = 1e-12;

/// Compute every whole-graph statistic in one pass over the graph.
pub fn compute(graph: &Graph) -> StructuralSummary {
    let degrees = graph.degree_counts();
    let (transitivity, average_clustering) = clustering(graph);
    let strong_component_count = if graph.is_directed() {
        strong_components(graph).ok().map(|c| c.len())
    } else {
        None
    };

    StructuralSummary {
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        directed: graph.is_directed(),
        density: density(graph),
        assortativity: degree_assortativity(graph, &degrees),
        transitivity,
        average_degree: average_degree(&degrees),
        average_clustering,
        self_loops: self_loops(graph),
        weak_component_count: weak_components(graph).len(),
        strong_component_count,
    }
}

/// Edges over possible edges: n(n−1) directed, n(n−1)/2 undirected.
///
/// Self-loops are left out of the edge count so the result stays in [0, 1]
/// and equals 1 exactly for complete graphs. Defined as 0 when n ≤ 1.
pub fn density(graph: &Graph) -> f64 {
    let n = graph.node_count();
    if n <= 1 {
        return 0.0;
    }
    let edges = (graph.edge_count() - self_loops(graph)) as f64;
    let possible = (n * (n - 1)) as f64;
    if graph.is_directed() {
        edges / possible
    } else {
        2.0 * edges / possible
    }
}

/// Mean degree, `None` for an empty graph.
fn average_degree(degrees: &[DegreeCount]) -> Option<f64> {
    if degrees.is_empty() {
        return None;
    }
    let total: usize = degrees.iter().map(DegreeCount::total).sum();
    Some(total as f64 / degrees.len() as f64)
}

fn self_loops(graph: &Graph) -> usize {
    graph.index_pairs().filter(|(s, t)| s == t).count()
}

/// Pearson correlation of endpoint degrees.
///
/// Undirected edges contribute both orientations (total degree on each
/// side); directed edges pair the source's out-degree with the target's
/// in-degree.
fn degree_assortativity(graph: &Graph, degrees: &[DegreeCount]) -> Option<f64> {
    if graph.edge_count() < 2 {
        return None;
    }
    let capacity = graph.edge_count() * if graph.is_directed() { 1 } else { 2 };
    let mut xs = Vec::with_capacity(capacity);
    let mut ys = Vec::with_capacity(capacity);

    for (s, t) in graph.index_pairs() {
        if graph.is_directed() {
            xs.push(degrees[s].outgoing as f64);
            ys.push(degrees[t].incoming as f64);
        } else {
            let (ds, dt) = (degrees[s].total() as f64, degrees[t].total() as f64);
            xs.push(ds);
            ys.push(dt);
            xs.push(dt);
            ys.push(ds);
        }
    }

    pearson(&xs, &ys)
}

fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len() as f64;
    if xs.is_empty() {
        return None;
    }
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x < VARIANCE_EPSILON || var_y < VARIANCE_EPSILON {
        return None;
    }
    Some(cov / (var_x * var_y).sqrt())
}

/// Global transitivity and mean local clustering coefficient.
///
/// Both use the undirected simple view: direction ignored, self-loops
/// dropped. A node with fewer than two neighbours has local coefficient 0.
fn clustering(graph: &Graph) -> (f64, f64) {
    let sets = graph.simple_neighbor_sets();
    let n = sets.len();

    let mut closed = 0usize;
    let mut triples = 0usize;
    let mut local_sum = 0.0;

    for neighbors in &sets {
        let k = neighbors.len();
        if k < 2 {
            continue;
        }
        let list: Vec<usize> = neighbors.iter().copied().collect();
        let mut links = 0usize;
        for i in 0..k {
            for j in (i + 1)..k {
                if sets[list[i]].contains(&list[j]) {
                    links += 1;
                }
            }
        }
        let possible = k * (k - 1) / 2;
        closed += links;
        triples += possible;
        local_sum += links as f64 / possible as f64;
    }

    let transitivity = if triples == 0 {
        0.0
    } else {
        closed as f64 / triples as f64
    };
    let average = if n == 0 { 0.0 } else { local_sum / n as f64 };
    (transitivity, average)
}

// ============================================================================
// Tests
// ============================================================================
