//! Prerequisite cycle detection.
//!
//! # Overview
//!
//! A prerequisite cycle makes every course on it impossible to take: each one
//! waits on another in the loop. Cycles are user data errors, so they are
//! reported in full for display rather than dropped.
//!
//! # Design
//!
//! - **Iterative DFS**: an explicit frame stack and path vector replace
//!   recursion, so curriculum depth never touches the thread stack and the
//!   cycle is a plain slice of the path.
//! - **Three colours**: unvisited, on the current path, fully explored. An
//!   edge into an on-path course closes a cycle; an edge into a fully explored
//!   course is skipped, so every course and edge is visited once.
//! - **Deterministic**: roots and successors are visited in ascending
//!   [`CourseId`] order.
//! - **Canonical**: each cycle is rotated to start at its smallest id and
//!   duplicates under rotation are dropped.
//!
//! Only prerequisite edges are traversed; corequisites never form cycles.

#![allow(clippy::module_name_repetitions)]

use std::collections::BTreeSet;
use std::fmt;

use pensum_core::CourseId;
use petgraph::graph::NodeIndex;
use serde::Serialize;

use super::model::CourseGraph;

// ---------------------------------------------------------------------------
// Cycle
// ---------------------------------------------------------------------------

/// An ordered loop of prerequisite edges.
///
/// Each consecutive pair is a prerequisite edge and the last course is a
/// prerequisite of the first. Always holds at least two courses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Cycle(Vec<CourseId>);

impl Cycle {
    /// Build a cycle from a path slice, rotated so the smallest id is first.
    #[must_use]
    pub fn from_path(mut path: Vec<CourseId>) -> Self {
        if let Some(start) = path
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.cmp(b.1))
            .map(|(pos, _)| pos)
        {
            path.rotate_left(start);
        }
        Self(path)
    }

    #[must_use]
    pub fn courses(&self) -> &[CourseId] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &CourseId) -> bool {
        self.0.contains(id)
    }

    /// The `(last, first)` edge that closes the loop.
    #[must_use]
    pub fn closing_edge(&self) -> Option<(&CourseId, &CourseId)> {
        Some((self.0.last()?, self.0.first()?))
    }

    /// Every prerequisite edge on the loop, closing edge included.
    pub fn edges(&self) -> impl Iterator<Item = (&CourseId, &CourseId)> + '_ {
        let n = self.0.len();
        (0..n).map(move |i| (&self.0[i], &self.0[(i + 1) % n]))
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<CourseId> {
        self.0
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for id in &self.0 {
            write!(f, "{id} → ")?;
        }
        match self.0.first() {
            Some(first) => write!(f, "{first}"),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Not yet visited.
    White,
    /// On the current DFS path.
    Gray,
    /// Fully explored.
    Black,
}

/// Find the prerequisite cycles of `graph`.
///
/// Returns an empty list exactly when the prerequisite sub-graph is acyclic.
/// Cycles appear in discovery order.
///
/// # Complexity
///
/// O(V + E) plus O(path) per reported cycle.
#[must_use]
pub fn find_cycles(graph: &CourseGraph) -> Vec<Cycle> {
    let mut cycles = Vec::new();
    let mut seen: BTreeSet<Cycle> = BTreeSet::new();

    walk(graph, |cycle| {
        if seen.insert(cycle.clone()) {
            cycles.push(cycle);
        }
        true
    });

    cycles
}

/// Check whether `graph` has any prerequisite cycle.
///
/// Stops at the first back edge.
#[must_use]
pub fn has_cycles(graph: &CourseGraph) -> bool {
    let mut found = false;
    walk(graph, |_| {
        found = true;
        false
    });
    found
}

/// Depth-first walk calling `on_cycle` for every back edge.
///
/// `on_cycle` returns `false` to stop the walk.
fn walk(graph: &CourseGraph, mut on_cycle: impl FnMut(Cycle) -> bool) {
    let arena = graph.arena();
    let mut color = vec![Color::White; arena.node_count()];
    let mut path: Vec<NodeIndex> = Vec::new();
    // Each frame: (course, its dependents ascending, next dependent to try).
    let mut stack: Vec<(NodeIndex, Vec<NodeIndex>, usize)> = Vec::new();

    for root in graph.ordered_indices() {
        if color[root.index()] != Color::White {
            continue;
        }

        color[root.index()] = Color::Gray;
        path.push(root);
        stack.push((root, graph.dependent_indices(root), 0));

        while let Some(frame) = stack.last_mut() {
            let current = frame.0;
            if frame.2 >= frame.1.len() {
                stack.pop();
                path.pop();
                color[current.index()] = Color::Black;
                continue;
            }

            let next = frame.1[frame.2];
            frame.2 += 1;

            match color[next.index()] {
                Color::White => {
                    color[next.index()] = Color::Gray;
                    path.push(next);
                    stack.push((next, graph.dependent_indices(next), 0));
                }
                Color::Gray => {
                    let Some(start) = path.iter().position(|&idx| idx == next) else {
                        continue;
                    };
                    let ids = path[start..]
                        .iter()
                        .map(|&idx| arena[idx].id.clone())
                        .collect();
                    if !on_cycle(Cycle::from_path(ids)) {
                        return;
                    }
                }
                Color::Black => {}
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pensum_core::{Course, RelationKind};

    fn graph_with(nodes: &[u64], edges: &[(u64, u64)]) -> CourseGraph {
        let mut graph = CourseGraph::new();
        for &n in nodes {
            graph.add_course(Course::new(n, format!("C{n}"), format!("Course {n}"), 3));
        }
        for &(from, to) in edges {
            graph
                .add_relation(&from.into(), &to.into(), RelationKind::Prerequisite)
                .expect("known endpoints");
        }
        graph
    }

    fn ids(raw: &[u64]) -> Vec<CourseId> {
        raw.iter().map(|&n| CourseId::Numeric(n)).collect()
    }

    #[test]
    fn three_course_loop_reported_once() {
        let graph = graph_with(&[1, 2, 3], &[(1, 2), (2, 3), (3, 1)]);
        let cycles = find_cycles(&graph);

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].courses(), ids(&[1, 2, 3]).as_slice());
        assert!(has_cycles(&graph));
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let graph = graph_with(&[1, 2, 3, 4], &[(1, 2), (1, 3), (2, 4), (3, 4)]);
        assert!(find_cycles(&graph).is_empty());
        assert!(!has_cycles(&graph));
    }

    #[test]
    fn empty_graph_has_no_cycles() {
        let graph = CourseGraph::new();
        assert!(find_cycles(&graph).is_empty());
    }

    #[test]
    fn mutual_prerequisites_form_two_course_cycle() {
        let graph = graph_with(&[1, 2], &[(1, 2), (2, 1)]);
        let cycles = find_cycles(&graph);
        assert_eq!(cycles, vec![Cycle::from_path(ids(&[1, 2]))]);
    }

    #[test]
    fn independent_cycles_reported_in_ascending_discovery_order() {
        // 1 ⇄ 2, 3 → 4 → 5 → 3, 6 isolated
        let graph = graph_with(
            &[6, 5, 4, 3, 2, 1],
            &[(1, 2), (2, 1), (3, 4), (4, 5), (5, 3)],
        );
        let cycles = find_cycles(&graph);

        assert_eq!(
            cycles,
            vec![
                Cycle::from_path(ids(&[1, 2])),
                Cycle::from_path(ids(&[3, 4, 5])),
            ]
        );
    }

    #[test]
    fn cycle_entered_midway_is_rotated_to_smallest_id() {
        // 1 → 5 → 3 → 4 → 5
        let graph = graph_with(&[1, 3, 4, 5], &[(1, 5), (5, 3), (3, 4), (4, 5)]);
        let cycles = find_cycles(&graph);

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].courses(), ids(&[3, 4, 5]).as_slice());
        assert!(!cycles[0].contains(&CourseId::Numeric(1)));
    }

    #[test]
    fn cycles_sharing_a_course_are_both_reported() {
        // 1 → 2 → 1 and 2 → 3 → 2
        let graph = graph_with(&[1, 2, 3], &[(1, 2), (2, 1), (2, 3), (3, 2)]);
        let cycles = find_cycles(&graph);

        assert_eq!(
            cycles,
            vec![
                Cycle::from_path(ids(&[1, 2])),
                Cycle::from_path(ids(&[2, 3])),
            ]
        );
    }

    #[test]
    fn reported_cycle_edges_exist_in_graph() {
        let graph = graph_with(&[1, 2, 3, 4], &[(1, 2), (2, 3), (3, 4), (4, 2)]);
        let edges = graph.prerequisite_edges();

        for cycle in find_cycles(&graph) {
            assert!(cycle.len() >= 2);
            for (from, to) in cycle.edges() {
                assert!(edges.contains(&(from, to)), "missing edge {from} → {to}");
            }
        }
    }

    #[test]
    fn corequisites_never_form_cycles() {
        let mut graph = graph_with(&[1, 2], &[(1, 2)]);
        graph
            .add_relation(&2_u64.into(), &1_u64.into(), RelationKind::Corequisite)
            .expect("coreq");
        assert!(find_cycles(&graph).is_empty());
    }

    #[test]
    fn long_chain_does_not_recurse() {
        let n = 50_000_u64;
        let nodes: Vec<u64> = (0..n).collect();
        let mut edges: Vec<(u64, u64)> = (0..n - 1).map(|i| (i, i + 1)).collect();
        edges.push((n - 1, 0));

        let graph = graph_with(&nodes, &edges);
        let cycles = find_cycles(&graph);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), usize::try_from(n).expect("fits"));
    }

    #[test]
    fn display_closes_the_loop() {
        let cycle = Cycle::from_path(ids(&[2, 3, 1]));
        assert_eq!(cycle.to_string(), "1 → 2 → 3 → 1");
        assert_eq!(
            cycle.closing_edge(),
            Some((&CourseId::Numeric(3), &CourseId::Numeric(1)))
        );
    }
}
