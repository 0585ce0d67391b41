//! Renderer view model.
//!
//! Turns a graph plus an optional score set into the node/edge description a
//! force-directed renderer consumes. Node size is the only visual attribute
//! computed here; layout and styling belong to the renderer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::models::{Attributes, CentralityScores, Component, Graph, Metric, NodeId};
use crate::error::{GraphError, Result};

/// A node as handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewNode {
    pub id: NodeId,
    pub label: String,
    /// Rendered size
    pub size: f64,
    pub degree: usize,
    /// Every score available for this node
    pub scores: BTreeMap<Metric, f64>,
    pub attributes: Attributes,
    /// Member of the highlighted subset (e.g. the largest component)
    pub highlighted: bool,
}

/// An edge as handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
    pub attributes: Attributes,
}

/// Finished renderer input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub nodes: Vec<ViewNode>,
    pub edges: Vec<ViewEdge>,
    pub directed: bool,
}

impl ViewModel {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Mapping from a normalized score to a rendered size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeScale {
    /// Size of the lowest-scoring node (default: 10.0)
    pub base: f64,
    /// Added on top of `base` for the highest-scoring node (default: 40.0)
    pub scale: f64,
    /// Size of every node when no metric is selected (default: 20.0)
    pub default_size: f64,
}

impl Default for SizeScale {
    fn default() -> Self {
        Self {
            base: 10.0,
            scale: 40.0,
            default_size: 20.0,
        }
    }
}

/// Everything [`export_with`] can be told besides the graph itself.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions<'a> {
    pub size_metric: Option<Metric>,
    pub scale: SizeScale,
    pub highlight: Option<&'a Component>,
}

/// Export with the default size scale and no highlighting.
pub fn export(
    graph: &Graph,
    scores: Option<&CentralityScores>,
    size_metric: Option<Metric>,
) -> Result<ViewModel> {
    export_with(
        graph,
        scores,
        &ExportOptions {
            size_metric,
            ..Default::default()
        },
    )
}

/// Build the view model.
///
/// With a size metric, `size = base + scale · (s − min) / (max − min)`;
/// when every score is equal all nodes get `base`. Fails with
/// [`GraphError::MissingMetric`] if the metric is not in `scores`.
pub fn export_with(
    graph: &Graph,
    scores: Option<&CentralityScores>,
    options: &ExportOptions<'_>,
) -> Result<ViewModel> {
    let sizing = match options.size_metric {
        Some(metric) => {
            let values = scores
                .and_then(|s| s.get(metric))
                .ok_or(GraphError::MissingMetric(metric))?;
            let (min, max) = values
                .values()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                });
            Some((metric, min, max))
        }
        None => None,
    };

    let degrees = graph.degree_counts();
    let nodes = graph
        .indexed_nodes()
        .map(|(i, node)| {
            let node_scores: BTreeMap<Metric, f64> = scores
                .map(|s| {
                    s.metrics()
                        .filter_map(|m| s.score(m, &node.id).map(|v| (m, v)))
                        .collect()
                })
                .unwrap_or_default();

            let size = match sizing {
                Some((metric, min, max)) => {
                    let value = node_scores.get(&metric).copied().unwrap_or(min);
                    let range = max - min;
                    if range > 0.0 {
                        options.scale.base + options.scale.scale * (value - min) / range
                    } else {
                        options.scale.base
                    }
                }
                None => options.scale.default_size,
            };

            ViewNode {
                id: node.id.clone(),
                label: node.id.clone(),
                size,
                degree: degrees[i].total(),
                scores: node_scores,
                attributes: node.attributes.clone(),
                highlighted: options.highlight.is_some_and(|h| h.contains(&node.id)),
            }
        })
        .collect();

    let edges = graph
        .edges()
        .map(|(source, target, edge)| ViewEdge {
            source: source.to_string(),
            target: target.to_string(),
            weight: edge.weight_or_default(),
            attributes: edge.attributes.clone(),
        })
        .collect();

    Ok(ViewModel {
        nodes,
        edges,
        directed: graph.is_directed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::build;
    use crate::graph::centrality;
    use crate::graph::models::{AnalyticsConfig, EdgeRecord, Scalar};

    fn star() -> Graph {
        let records: Vec<EdgeRecord> = ["l1", "l2", "l3"]
            .iter()
            .map(|leaf| EdgeRecord::new("hub", *leaf))
            .collect();
        build(&records, false).unwrap()
    }

    fn size_of(view: &ViewModel, id: &str) -> f64 {
        view.nodes.iter().find(|n| n.id == id).unwrap().size
    }

    #[test]
    fn test_export_without_metric_uses_default_size() {
        let view = export(&star(), None, None).unwrap();
        assert_eq!(view.nodes.len(), 4);
        assert_eq!(view.edges.len(), 3);
        assert!(!view.directed);
        assert!(view.nodes.iter().all(|n| n.size == 20.0));
        assert!(view.nodes.iter().all(|n| n.scores.is_empty()));
        assert_eq!(view.nodes[0].label, "hub");
        assert_eq!(view.nodes[0].degree, 3);
    }

    #[test]
    fn test_export_sizes_by_metric() {
        let g = star();
        let scores = centrality::compute(&g, &[Metric::Degree], &AnalyticsConfig::default()).unwrap();
        let view = export(&g, Some(&scores), Some(Metric::Degree)).unwrap();
        assert_eq!(size_of(&view, "hub"), 50.0);
        assert_eq!(size_of(&view, "l1"), 10.0);
        assert_eq!(view.nodes[0].scores[&Metric::Degree], 1.0);
    }

    #[test]
    fn test_export_size_monotonic_in_score() {
        let records = vec![
            EdgeRecord::new("a", "b"),
            EdgeRecord::new("b", "c"),
            EdgeRecord::new("c", "d"),
            EdgeRecord::new("c", "e"),
        ];
        let g = build(&records, false).unwrap();
        let scores = centrality::compute(&g, &[Metric::Betweenness], &AnalyticsConfig::default()).unwrap();
        let view = export(&g, Some(&scores), Some(Metric::Betweenness)).unwrap();
        let betweenness = scores.get(Metric::Betweenness).unwrap();
        for a in &view.nodes {
            for b in &view.nodes {
                if betweenness[&a.id] > betweenness[&b.id] {
                    assert!(a.size > b.size, "{} should be larger than {}", a.id, b.id);
                }
            }
        }
    }

    #[test]
    fn test_export_equal_scores_map_to_base() {
        let records = vec![
            EdgeRecord::new("a", "b"),
            EdgeRecord::new("b", "c"),
            EdgeRecord::new("c", "a"),
        ];
        let g = build(&records, false).unwrap();
        let scores = centrality::compute(&g, &[Metric::Closeness], &AnalyticsConfig::default()).unwrap();
        let view = export(&g, Some(&scores), Some(Metric::Closeness)).unwrap();
        assert!(view.nodes.iter().all(|n| n.size == 10.0));
    }

    #[test]
    fn test_export_missing_metric() {
        let g = star();
        let scores = centrality::compute(&g, &[Metric::Degree], &AnalyticsConfig::default()).unwrap();
        assert_eq!(
            export(&g, Some(&scores), Some(Metric::Closeness)).unwrap_err(),
            GraphError::MissingMetric(Metric::Closeness)
        );
        assert_eq!(
            export(&g, None, Some(Metric::Degree)).unwrap_err(),
            GraphError::MissingMetric(Metric::Degree)
        );
    }

    #[test]
    fn test_export_highlight_and_edge_fields() {
        let records = vec![
            EdgeRecord::new("a", "b")
                .with_attr("weight", Scalar::Float(2.5))
                .with_attr("label", Scalar::Text("main".into())),
            EdgeRecord::new("x", "y"),
        ];
        let g = build(&records, true).unwrap();
        let highlight: Component = ["a", "b"].iter().map(|s| s.to_string()).collect();
        let view = export_with(
            &g,
            None,
            &ExportOptions {
                highlight: Some(&highlight),
                ..Default::default()
            },
        )
        .unwrap();

        let flags: Vec<bool> = view.nodes.iter().map(|n| n.highlighted).collect();
        assert_eq!(flags, vec![true, true, false, false]);
        assert!(view.directed);
        assert_eq!(view.edges[0].weight, 2.5);
        assert_eq!(view.edges[0].attributes["label"], Scalar::Text("main".into()));
        assert_eq!(view.edges[1].weight, 1.0);
    }

    #[test]
    fn test_view_model_json_shape() {
        let g = star();
        let scores = centrality::compute(&g, &[Metric::Degree], &AnalyticsConfig::default()).unwrap();
        let view = export(&g, Some(&scores), Some(Metric::Degree)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&view.to_json().unwrap()).unwrap();
        assert_eq!(json["directed"], false);
        assert_eq!(json["nodes"][0]["id"], "hub");
        assert_eq!(json["nodes"][0]["scores"]["degree"], 1.0);
        assert_eq!(json["edges"][0]["source"], "hub");
    }
}
