//! Connected component detection.
//!
//! - Weak components: BFS over the graph with edge direction ignored
//! - Strong components: iterative Tarjan over successor lists (directed only)
//!
//! Both return components ordered by size descending, ties broken by the
//! component whose smallest node ID sorts first, so results are stable
//! across runs and across equivalent inputs.

use std::cmp::Reverse;
use std::collections::VecDeque;

use super::models::{Component, ComponentInfo, Graph};
use crate::error::{GraphError, Result};

const UNVISITED: usize = usize::MAX;

// ============================================================================
// Weakly Connected Components
// ============================================================================

/// Identify weakly connected components (treating edges as undirected).
///
/// On an undirected graph this is ordinary connectivity.
pub fn weak_components(graph: &Graph) -> Vec<Component> {
    let n = graph.node_count();
    let adj = graph.adjacency();
    let mut component_of = vec![UNVISITED; n];
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for start in 0..n {
        if component_of[start] != UNVISITED {
            continue;
        }
        let id = groups.len();
        let mut members = vec![start];
        let mut queue = VecDeque::from([start]);
        component_of[start] = id;

        while let Some(current) = queue.pop_front() {
            let neighbors = adj.successors[current]
                .iter()
                .chain(adj.predecessors[current].iter());
            for &next in neighbors {
                if component_of[next] == UNVISITED {
                    component_of[next] = id;
                    members.push(next);
                    queue.push_back(next);
                }
            }
        }
        groups.push(members);
    }

    into_ordered_components(graph, groups)
}

// ============================================================================
// Strongly Connected Components
// ============================================================================

/// Identify strongly connected components with Tarjan's algorithm.
///
/// The DFS is driven by an explicit frame stack so deep chains cannot
/// overflow the thread stack.
pub fn strong_components(graph: &Graph) -> Result<Vec<Component>> {
    if !graph.is_directed() {
        return Err(GraphError::DirectionMismatch {
            operation: "strong components",
        });
    }

    let n = graph.node_count();
    let adj = graph.adjacency();
    let mut index_of = vec![UNVISITED; n];
    let mut lowlink = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut next_index = 0usize;
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for root in 0..n {
        if index_of[root] != UNVISITED {
            continue;
        }
        index_of[root] = next_index;
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;

        // (node, position of the next successor to visit)
        let mut frames: Vec<(usize, usize)> = vec![(root, 0)];

        while let Some(frame) = frames.last_mut() {
            let v = frame.0;
            if let Some(&w) = adj.successors[v].get(frame.1) {
                frame.1 += 1;
                if index_of[w] == UNVISITED {
                    index_of[w] = next_index;
                    lowlink[w] = next_index;
                    next_index += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    frames.push((w, 0));
                } else if on_stack[w] {
                    lowlink[v] = lowlink[v].min(index_of[w]);
                }
                continue;
            }

            frames.pop();
            if let Some(&(parent, _)) = frames.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[v]);
            }
            if lowlink[v] == index_of[v] {
                let mut group = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    group.push(w);
                    if w == v {
                        break;
                    }
                }
                groups.push(group);
            }
        }
    }

    Ok(into_ordered_components(graph, groups))
}

// ============================================================================
// Helpers
// ============================================================================

/// The largest component; ties go to the one whose smallest ID sorts first.
///
/// Returns `None` only for an empty list.
pub fn largest_component(components: &[Component]) -> Option<&Component> {
    components.iter().fold(None, |best: Option<&Component>, c| match best {
        Some(b) if c.len() < b.len() || (c.len() == b.len() && c.first() >= b.first()) => {
            Some(b)
        }
        _ => Some(c),
    })
}

/// Wrap ordered components into [`ComponentInfo`] summaries.
///
/// The first entry of an ordered list is the main component.
pub fn component_infos(components: &[Component]) -> Vec<ComponentInfo> {
    components
        .iter()
        .enumerate()
        .map(|(i, c)| ComponentInfo {
            id: i as u32,
            size: c.len(),
            members: c.iter().cloned().collect(),
            is_main: i == 0,
        })
        .collect()
}

fn into_ordered_components(graph: &Graph, groups: Vec<Vec<usize>>) -> Vec<Component> {
    let mut components: Vec<Component> = groups
        .into_iter()
        .map(|members| {
            members
                .into_iter()
                .map(|i| graph.id_at(i).to_string())
                .collect()
        })
        .collect();
    components.sort_by(|a, b| {
        (Reverse(a.len()), a.first()).cmp(&(Reverse(b.len()), b.first()))
    });
    components
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::build;
    use crate::graph::models::EdgeRecord;
    use std::collections::BTreeSet;

    fn graph(edges: &[(&str, &str)], directed: bool) -> Graph {
        let records: Vec<EdgeRecord> = edges.iter().map(|(s, t)| EdgeRecord::new(*s, *t)).collect();
        build(&records, directed).unwrap()
    }

    fn set(ids: &[&str]) -> Component {
        ids.iter().map(|s| s.to_string()).collect()
    }

    // --- Weak Components Tests ---

    #[test]
    fn test_weak_components_disconnected() {
        let g = graph(&[("c1_a", "c1_b"), ("c1_b", "c1_c"), ("c2_x", "c2_y")], false);
        let comps = weak_components(&g);
        assert_eq!(comps.len(), 2);
        assert_eq!(comps[0], set(&["c1_a", "c1_b", "c1_c"]));
        assert_eq!(comps[1], set(&["c2_x", "c2_y"]));
    }

    #[test]
    fn test_weak_components_ignore_direction() {
        let g = graph(&[("A", "B"), ("B", "C")], true);
        let comps = weak_components(&g);
        assert_eq!(comps, vec![set(&["A", "B", "C"])]);
    }

    #[test]
    fn test_weak_components_partition_nodes() {
        let g = graph(
            &[("a", "b"), ("c", "d"), ("d", "e"), ("f", "f"), ("g", "a")],
            false,
        );
        let comps = weak_components(&g);
        let total: usize = comps.iter().map(|c| c.len()).sum();
        assert_eq!(total, g.node_count());
        let union: BTreeSet<String> = comps.iter().flatten().cloned().collect();
        assert_eq!(union.len(), g.node_count());
    }

    #[test]
    fn test_weak_components_equal_sizes_ordered_by_min_id() {
        let g = graph(&[("x", "y"), ("b", "a")], false);
        let comps = weak_components(&g);
        assert_eq!(comps[0], set(&["a", "b"]));
        assert_eq!(comps[1], set(&["x", "y"]));
    }

    // --- Strong Components Tests ---

    #[test]
    fn test_strong_components_directed_path() {
        let g = graph(&[("A", "B"), ("B", "C")], true);
        let comps = strong_components(&g).unwrap();
        assert_eq!(comps, vec![set(&["A"]), set(&["B"]), set(&["C"])]);
    }

    #[test]
    fn test_strong_components_cycle_with_tail() {
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "a"), ("c", "d"), ("d", "e"), ("e", "d")], true);
        let comps = strong_components(&g).unwrap();
        assert_eq!(comps, vec![set(&["a", "b", "c"]), set(&["d", "e"])]);
    }

    #[test]
    fn test_strong_components_undirected_rejected() {
        let g = graph(&[("a", "b")], false);
        let err = strong_components(&g).unwrap_err();
        assert!(matches!(err, GraphError::DirectionMismatch { .. }));
    }

    #[test]
    fn test_strong_components_deep_chain_no_overflow() {
        let names: Vec<String> = (0..20_000).map(|i| format!("n{}", i)).collect();
        let mut records: Vec<EdgeRecord> = names
            .windows(2)
            .map(|w| EdgeRecord::new(w[0].clone(), w[1].clone()))
            .collect();
        records.push(EdgeRecord::new(names[names.len() - 1].clone(), names[0].clone()));
        let g = build(&records, true).unwrap();
        let comps = strong_components(&g).unwrap();
        assert_eq!(comps.len(), 1);
        assert_eq!(comps[0].len(), 20_000);
    }

    // --- Largest Component Tests ---

    #[test]
    fn test_largest_component_prefers_size() {
        let comps = vec![set(&["z"]), set(&["m", "n", "o"]), set(&["a", "b"])];
        assert_eq!(largest_component(&comps), Some(&set(&["m", "n", "o"])));
    }

    #[test]
    fn test_largest_component_tie_break_on_min_id() {
        let comps = vec![set(&["x", "y"]), set(&["b", "q"]), set(&["c", "a"])];
        assert_eq!(largest_component(&comps), Some(&set(&["a", "c"])));
    }

    #[test]
    fn test_largest_component_empty() {
        assert!(largest_component(&[]).is_none());
    }

    #[test]
    fn test_component_infos_marks_main() {
        let g = graph(&[("a", "b"), ("b", "c"), ("x", "y")], false);
        let infos = component_infos(&weak_components(&g));
        assert_eq!(infos.len(), 2);
        assert!(infos[0].is_main);
        assert_eq!(infos[0].size, 3);
        assert!(!infos[1].is_main);
        assert_eq!(infos[1].members, vec!["x".to_string(), "y".to_string()]);
    }
}
