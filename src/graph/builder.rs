//! Edge list → graph construction.
//!
//! Converts resolved tabular records into a [`Graph`]. Nodes are discovered
//! from edge endpoints; each record becomes (or overwrites) one edge.

use super::models::{Edge, EdgeRecord, Graph, Node};
use crate::error::{EndpointSide, GraphError, Result};

/// Attribute name promoted to the typed `Edge::weight` field (case-insensitive).
pub const WEIGHT_FIELD: &str = "weight";

/// Build a graph from an ordered sequence of edge records.
///
/// - Nodes: one per distinct identifier, in first-seen order
/// - Edges: one per record; repeated pairs coalesce (both orientations when
///   undirected) and the later record's attributes win
///
/// Rows are never skipped: a blank identifier fails the whole build so the
/// caller's row counts reconcile.
pub fn build(records: &[EdgeRecord], directed: bool) -> Result<Graph> {
    if records.is_empty() {
        return Err(GraphError::EmptyInput);
    }

    let mut graph = Graph::with_capacity(directed, records.len(), records.len());

    for (i, record) in records.iter().enumerate() {
        let row = i + 1;
        let source = identifier(record.source.as_deref(), row, EndpointSide::Source)?;
        let target = identifier(record.target.as_deref(), row, EndpointSide::Target)?;

        let from = graph.add_node(Node::new(source));
        let to = graph.add_node(Node::new(target));
        graph.upsert_edge(from, to, edge_from_attributes(record));
    }

    Ok(graph)
}

fn identifier(value: Option<&str>, row: usize, side: EndpointSide) -> Result<&str> {
    match value.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(GraphError::MissingIdentifier { row, side }),
    }
}

/// Split a record's attributes into the typed weight and the sidecar map.
///
/// A non-numeric weight value stays in the sidecar untouched.
fn edge_from_attributes(record: &EdgeRecord) -> Edge {
    let mut edge = Edge::default();
    for (name, value) in &record.attributes {
        if name.eq_ignore_ascii_case(WEIGHT_FIELD) {
            if let Some(w) = value.as_f64() {
                edge.weight = Some(w);
                continue;
            }
        }
        edge.attributes.insert(name.clone(), value.clone());
    }
    edge
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::models::{Attributes, Scalar};

    #[test]
    fn test_build_empty_input_fails() {
        let err = build(&[], false).unwrap_err();
        assert_eq!(err, GraphError::EmptyInput);
    }

    #[test]
    fn test_build_collects_distinct_nodes_in_order() {
        let records = vec![
            EdgeRecord::new("b", "a"),
            EdgeRecord::new("a", "c"),
            EdgeRecord::new("c", "b"),
        ];
        let g = build(&records, false).unwrap();
        let ids: Vec<&str> = g.nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(g.edge_count(), 3);
        assert!(!g.is_directed());
    }

    #[test]
    fn test_build_missing_target_reports_row() {
        let records = vec![
            EdgeRecord::new("a", "b"),
            EdgeRecord {
                source: Some("b".into()),
                target: Some("   ".into()),
                attributes: Attributes::new(),
            },
        ];
        let err = build(&records, true).unwrap_err();
        assert_eq!(
            err,
            GraphError::MissingIdentifier {
                row: 2,
                side: EndpointSide::Target
            }
        );
    }

    #[test]
    fn test_build_missing_source_reports_row() {
        let records = vec![EdgeRecord {
            source: None,
            target: Some("b".into()),
            attributes: Attributes::new(),
        }];
        let err = build(&records, false).unwrap_err();
        assert!(matches!(
            err,
            GraphError::MissingIdentifier {
                row: 1,
                side: EndpointSide::Source
            }
        ));
    }

    #[test]
    fn test_build_identifiers_are_trimmed() {
        let g = build(&[EdgeRecord::new(" a ", "b")], false).unwrap();
        assert!(g.contains_node("a"));
    }

    #[test]
    fn test_build_undirected_reverse_pair_coalesces_last_wins() {
        let records = vec![
            EdgeRecord::new("a", "b")
                .with_attr("weight", Scalar::Float(2.0))
                .with_attr("label", Scalar::Text("first".into())),
            EdgeRecord::new("b", "a").with_attr("label", Scalar::Text("second".into())),
        ];
        let g = build(&records, false).unwrap();
        assert_eq!(g.edge_count(), 1);
        let edge = g.edge_between("a", "b").unwrap();
        assert_eq!(edge.weight, Some(2.0));
        assert_eq!(edge.attributes["label"], Scalar::Text("second".into()));
    }

    #[test]
    fn test_build_directed_reverse_pair_distinct() {
        let records = vec![EdgeRecord::new("a", "b"), EdgeRecord::new("b", "a")];
        let g = build(&records, true).unwrap();
        assert_eq!(g.edge_count(), 2);
        assert!(g.is_directed());
    }

    #[test]
    fn test_build_weight_column_is_typed() {
        let records = vec![
            EdgeRecord::new("a", "b").with_attr("Weight", Scalar::Int(3)),
            EdgeRecord::new("b", "c").with_attr("weight", Scalar::Text("heavy".into())),
        ];
        let g = build(&records, false).unwrap();
        let ab = g.edge_between("a", "b").unwrap();
        assert_eq!(ab.weight, Some(3.0));
        assert!(ab.attributes.is_empty());

        let bc = g.edge_between("b", "c").unwrap();
        assert_eq!(bc.weight, None);
        assert_eq!(bc.weight_or_default(), 1.0);
        assert_eq!(bc.attributes["weight"], Scalar::Text("heavy".into()));
    }

    #[test]
    fn test_build_self_loop_kept() {
        let g = build(&[EdgeRecord::new("a", "a")], false).unwrap();
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.degree("a"), Some(2));
    }
}
