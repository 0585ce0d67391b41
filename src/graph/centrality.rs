//! Per-node centrality measures.
//!
//! | Metric      | Method                                  | Cost            |
//! |-------------|-----------------------------------------|-----------------|
//! | Degree      | edge counts / (n−1)                     | O(V + E)        |
//! | Closeness   | BFS from every node, Wasserman–Faust    | O(V·E)          |
//! | Betweenness | Brandes, rayon-sharded source loop      | O(V·E)          |
//! | Eigenvector | power iteration on A + I                | O(iter·E)       |
//!
//! All algorithms operate on [`Graph`] and return scores for every node,
//! keyed by node ID. Isolated nodes get defined scores (0 for the
//! path-based measures). Nothing here is computed unless asked for: see
//! [`compute`].

use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap, VecDeque};

use super::models::{
    AnalyticsConfig, CentralityResult, CentralityScores, DegreeCount, Graph, Metric,
};
use crate::error::{GraphError, Result};

const UNREACHED: usize = usize::MAX;

// ============================================================================
// Selective computation
// ============================================================================

/// Compute only the requested metrics.
///
/// Direction requirements are checked before any work starts, so a bad
/// request never pays for the expensive metrics first.
pub fn compute(
    graph: &Graph,
    metrics: &[Metric],
    config: &AnalyticsConfig,
) -> Result<CentralityScores> {
    let requested: BTreeSet<Metric> = metrics.iter().copied().collect();

    if !graph.is_directed() {
        if let Some(metric) = requested.iter().find(|m| m.requires_direction()) {
            return Err(GraphError::DirectionMismatch {
                operation: direction_operation(*metric),
            });
        }
    }

    let mut scores = CentralityScores::new();
    for metric in requested {
        let result = match metric {
            Metric::Degree => degree_centrality(graph),
            Metric::InDegree => in_degree_centrality(graph)?,
            Metric::OutDegree => out_degree_centrality(graph)?,
            Metric::Closeness => closeness_centrality(graph),
            Metric::Betweenness => betweenness_centrality(
                graph,
                config.betweenness_normalized,
                config.parallel_threshold,
            ),
            Metric::Eigenvector => eigenvector_centrality(
                graph,
                config.eigenvector_tolerance,
                config.eigenvector_max_iterations,
            )?,
        };
        scores.insert(metric, result);
    }
    Ok(scores)
}

fn direction_operation(metric: Metric) -> &'static str {
    match metric {
        Metric::InDegree => "in-degree centrality",
        Metric::OutDegree => "out-degree centrality",
        _ => "centrality",
    }
}

// ============================================================================
// Degree
// ============================================================================

/// Total degree / (n−1). For directed graphs this is (in + out) / (n−1).
pub fn degree_centrality(graph: &Graph) -> CentralityResult {
    scaled_degree(graph, |d| d.total())
}

/// In-degree / (n−1). Directed graphs only.
pub fn in_degree_centrality(graph: &Graph) -> Result<CentralityResult> {
    if !graph.is_directed() {
        return Err(GraphError::DirectionMismatch {
            operation: "in-degree centrality",
        });
    }
    Ok(scaled_degree(graph, |d| d.incoming))
}

/// Out-degree / (n−1). Directed graphs only.
pub fn out_degree_centrality(graph: &Graph) -> Result<CentralityResult> {
    if !graph.is_directed() {
        return Err(GraphError::DirectionMismatch {
            operation: "out-degree centrality",
        });
    }
    Ok(scaled_degree(graph, |d| d.outgoing))
}

fn scaled_degree(graph: &Graph, pick: impl Fn(&DegreeCount) -> usize) -> CentralityResult {
    let n = graph.node_count();
    let scale = if n > 1 { 1.0 / (n - 1) as f64 } else { 0.0 };
    graph
        .degree_counts()
        .iter()
        .enumerate()
        .map(|(i, d)| (graph.id_at(i).to_string(), pick(d) as f64 * scale))
        .collect()
}

// ============================================================================
// Closeness
// ============================================================================

/// Closeness with the Wasserman–Faust correction.
///
/// For a node reaching `r` nodes (itself included) at total distance `d`:
/// `((r−1)/d) · ((r−1)/(n−1))`. Distances follow edge direction outward
/// from the node. Nodes that reach nobody score 0.
pub fn closeness_centrality(graph: &Graph) -> CentralityResult {
    let n = graph.node_count();
    let adj = graph.adjacency();
    let mut dist = vec![UNREACHED; n];
    let mut visited: Vec<usize> = Vec::with_capacity(n);
    let mut queue = VecDeque::new();
    let mut result = HashMap::with_capacity(n);

    for v in 0..n {
        dist[v] = 0;
        visited.push(v);
        queue.push_back(v);
        let mut total = 0usize;

        while let Some(current) = queue.pop_front() {
            for &next in &adj.successors[current] {
                if dist[next] == UNREACHED {
                    dist[next] = dist[current] + 1;
                    total += dist[next];
                    visited.push(next);
                    queue.push_back(next);
                }
            }
        }

        let reached = visited.len();
        let score = if reached > 1 && total > 0 {
            let r = (reached - 1) as f64;
            (r / total as f64) * (r / (n - 1) as f64)
        } else {
            0.0
        };
        result.insert(graph.id_at(v).to_string(), score);

        for &u in &visited {
            dist[u] = UNREACHED;
        }
        visited.clear();
    }

    result
}

// ============================================================================
// Betweenness (Brandes)
// ============================================================================

/// Reusable per-worker buffers for Brandes' single-source passes.
struct BrandesWorkspace {
    dist: Vec<usize>,
    sigma: Vec<f64>,
    delta: Vec<f64>,
    preds: Vec<Vec<usize>>,
    order: Vec<usize>,
    queue: VecDeque<usize>,
}

impl BrandesWorkspace {
    fn new(n: usize) -> Self {
        Self {
            dist: vec![UNREACHED; n],
            sigma: vec![0.0; n],
            delta: vec![0.0; n],
            preds: vec![Vec::new(); n],
            order: Vec::with_capacity(n),
            queue: VecDeque::new(),
        }
    }

    /// BFS from `source`, then accumulate pair dependencies into `scores`.
    fn accumulate(&mut self, source: usize, successors: &[Vec<usize>], scores: &mut [f64]) {
        self.dist[source] = 0;
        self.sigma[source] = 1.0;
        self.queue.push_back(source);

        while let Some(v) = self.queue.pop_front() {
            self.order.push(v);
            for &w in &successors[v] {
                if self.dist[w] == UNREACHED {
                    self.dist[w] = self.dist[v] + 1;
                    self.queue.push_back(w);
                }
                if self.dist[w] == self.dist[v] + 1 {
                    self.sigma[w] += self.sigma[v];
                    self.preds[w].push(v);
                }
            }
        }

        for &w in self.order.iter().rev() {
            let coeff = (1.0 + self.delta[w]) / self.sigma[w];
            for &v in &self.preds[w] {
                self.delta[v] += self.sigma[v] * coeff;
            }
            if w != source {
                scores[w] += self.delta[w];
            }
        }

        for &v in &self.order {
            self.dist[v] = UNREACHED;
            self.sigma[v] = 0.0;
            self.delta[v] = 0.0;
            self.preds[v].clear();
        }
        self.order.clear();
    }
}

/// Betweenness centrality via Brandes' algorithm, unweighted.
///
/// Raw scores count each unordered pair once for undirected graphs and each
/// ordered pair for directed graphs. When `normalized`, they are scaled by
/// 2/((n−1)(n−2)) (undirected) or 1/((n−1)(n−2)) (directed); with n ≤ 2 no
/// node can lie between two others and every score is 0.
///
/// From `parallel_threshold` nodes upward, sources are sharded across the
/// rayon pool; each worker owns its buffers and a private score vector and
/// the vectors are summed at the end.
pub fn betweenness_centrality(
    graph: &Graph,
    normalized: bool,
    parallel_threshold: usize,
) -> CentralityResult {
    let n = graph.node_count();
    let adj = graph.adjacency();
    let successors = &adj.successors;

    let raw: Vec<f64> = if n >= parallel_threshold {
        (0..n)
            .into_par_iter()
            .fold(
                || (BrandesWorkspace::new(n), vec![0.0; n]),
                |(mut ws, mut acc), s| {
                    ws.accumulate(s, successors, &mut acc);
                    (ws, acc)
                },
            )
            .map(|(_, acc)| acc)
            .reduce(
                || vec![0.0; n],
                |mut a, b| {
                    for (x, y) in a.iter_mut().zip(b) {
                        *x += y;
                    }
                    a
                },
            )
    } else {
        let mut ws = BrandesWorkspace::new(n);
        let mut acc = vec![0.0; n];
        for s in 0..n {
            ws.accumulate(s, successors, &mut acc);
        }
        acc
    };

    // Undirected BFS sees every unordered pair from both ends
    let pair_scale = if graph.is_directed() { 1.0 } else { 0.5 };
    let norm = if !normalized {
        1.0
    } else if n <= 2 {
        0.0
    } else {
        let pairs = ((n - 1) * (n - 2)) as f64;
        if graph.is_directed() {
            1.0 / pairs
        } else {
            2.0 / pairs
        }
    };

    raw.into_iter()
        .enumerate()
        .map(|(i, b)| (graph.id_at(i).to_string(), b * pair_scale * norm))
        .collect()
}

// ============================================================================
// Eigenvector (power iteration)
// ============================================================================

/// Eigenvector centrality by power iteration.
///
/// Starts from the uniform unit vector and repeats `x ← (A + I)·x`,
/// renormalizing to unit L2 norm, until no component moves by more than
/// `tolerance`. Directed graphs sum over in-neighbours. Adding the identity
/// keeps A's principal eigenvector while letting bipartite graphs converge
/// instead of oscillating.
///
/// Fails with [`GraphError::NonConvergent`] when `max_iterations` pass
/// without meeting the tolerance; no partial result is returned.
pub fn eigenvector_centrality(
    graph: &Graph,
    tolerance: f64,
    max_iterations: usize,
) -> Result<CentralityResult> {
    let n = graph.node_count();
    if n == 0 {
        return Ok(HashMap::new());
    }

    let adj = graph.adjacency();
    let mut x = vec![1.0 / (n as f64).sqrt(); n];
    let mut next = vec![0.0; n];
    let mut last_delta = f64::INFINITY;

    for _ in 0..max_iterations {
        for (v, slot) in next.iter_mut().enumerate() {
            *slot = x[v] + adj.predecessors[v].iter().map(|&u| x[u]).sum::<f64>();
        }

        // (A + I)·x ≥ x componentwise, so the norm stays positive
        let norm = next.iter().map(|s| s * s).sum::<f64>().sqrt();
        for s in next.iter_mut() {
            *s /= norm;
        }

        last_delta = x
            .iter()
            .zip(&next)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        std::mem::swap(&mut x, &mut next);

        if last_delta < tolerance {
            return Ok(x
                .into_iter()
                .enumerate()
                .map(|(i, score)| (graph.id_at(i).to_string(), score))
                .collect());
        }
    }

    Err(GraphError::NonConvergent {
        iterations: max_iterations,
        last_delta,
    })
}

// ============================================================================
// Tests
// ============================================================================
