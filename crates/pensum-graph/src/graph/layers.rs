//! Topological levels over prerequisite edges.
//!
//! Level 0 holds courses with no prerequisite inside the graph. A course at
//! level `k` has every prerequisite at a level below `k` and at least one at
//! `k - 1`, so its level is the length of its longest prerequisite chain.
//!
//! Levels come from Kahn's algorithm run in batches: every course whose
//! in-degree reaches zero in the same round gets the same level. Courses
//! inside a level are ordered by ascending [`CourseId`].

#![allow(clippy::module_name_repetitions)]

use std::collections::BTreeMap;

use pensum_core::CourseId;
use petgraph::graph::NodeIndex;
use serde::Serialize;

use super::model::CourseGraph;
use crate::error::{GraphError, LevelInconsistency};

// ---------------------------------------------------------------------------
// LevelMap
// ---------------------------------------------------------------------------

/// Level per course, iterated in ascending id order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LevelMap(BTreeMap<CourseId, u32>);

impl LevelMap {
    #[must_use]
    pub fn level_of(&self, id: &CourseId) -> Option<u32> {
        self.0.get(id).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Highest level present, `None` when empty.
    #[must_use]
    pub fn max_level(&self) -> Option<u32> {
        self.0.values().copied().max()
    }

    /// Courses grouped by level; `layers()[k]` holds level `k`, ascending.
    #[must_use]
    pub fn layers(&self) -> Vec<Vec<CourseId>> {
        let Some(max) = self.max_level() else {
            return Vec::new();
        };
        let mut layers: Vec<Vec<CourseId>> = (0..=max).map(|_| Vec::new()).collect();
        for (id, &level) in &self.0 {
            if let Some(layer) = usize::try_from(level).ok().and_then(|l| layers.get_mut(l)) {
                layer.push(id.clone());
            }
        }
        layers
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CourseId, u32)> + '_ {
        self.0.iter().map(|(id, &level)| (id, level))
    }

    #[must_use]
    pub fn into_inner(self) -> BTreeMap<CourseId, u32> {
        self.0
    }
}

impl From<BTreeMap<CourseId, u32>> for LevelMap {
    fn from(map: BTreeMap<CourseId, u32>) -> Self {
        Self(map)
    }
}

impl FromIterator<(CourseId, u32)> for LevelMap {
    fn from_iter<I: IntoIterator<Item = (CourseId, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// PartialLayering
// ---------------------------------------------------------------------------

/// Layering of a graph that may contain cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartialLayering {
    /// `layers[k]` holds the courses at level `k`, ascending.
    pub layers: Vec<Vec<CourseId>>,
    /// Courses on or behind a cycle, ascending.
    pub unassigned: Vec<CourseId>,
}

impl PartialLayering {
    #[must_use]
    pub fn assigned_count(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.assigned_count() + self.unassigned.len()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unassigned.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Layering
// ---------------------------------------------------------------------------

/// Assign a level to every course of an acyclic graph.
///
/// # Errors
///
/// Returns [`GraphError::InvariantViolation`] if some courses can never
/// reach in-degree zero, which means the graph has a cycle that should have
/// been caught by [`crate::graph::cycles::find_cycles`] first.
pub fn assign_levels(graph: &CourseGraph) -> Result<LevelMap, GraphError> {
    let (batches, leftovers) = kahn_batches(graph);

    if !leftovers.is_empty() {
        return Err(GraphError::InvariantViolation {
            unresolved: leftovers,
        });
    }

    let mut levels = BTreeMap::new();
    for (level, batch) in (0_u32..).zip(batches) {
        for id in batch {
            levels.insert(id, level);
        }
    }
    Ok(LevelMap(levels))
}

/// Layer as much of `graph` as possible, tolerating cycles.
///
/// Courses on a cycle, or depending on one, end up in `unassigned`.
#[must_use]
pub fn partial_layers(graph: &CourseGraph) -> PartialLayering {
    let (layers, unassigned) = kahn_batches(graph);
    PartialLayering { layers, unassigned }
}

/// Check that `levels` is a valid layering of `graph`.
///
/// Every course needs a level and every prerequisite edge `p → c` needs
/// `level(p) < level(c)`. Entries for ids outside the graph are ignored.
///
/// # Errors
///
/// Returns [`GraphError::InconsistentLevels`] with the first missing course
/// (ascending id), or else the first out-of-order edge (ascending edge).
pub fn check_consistency(graph: &CourseGraph, levels: &LevelMap) -> Result<(), GraphError> {
    if let Some(course) = graph.course_ids().find(|id| levels.level_of(id).is_none()) {
        return Err(GraphError::InconsistentLevels(LevelInconsistency::Missing {
            course: course.clone(),
        }));
    }

    for (prerequisite, dependent) in graph.prerequisite_edges() {
        let (Some(prerequisite_level), Some(dependent_level)) =
            (levels.level_of(prerequisite), levels.level_of(dependent))
        else {
            continue;
        };
        if prerequisite_level >= dependent_level {
            return Err(GraphError::InconsistentLevels(
                LevelInconsistency::OutOfOrder {
                    prerequisite: prerequisite.clone(),
                    prerequisite_level,
                    dependent: dependent.clone(),
                    dependent_level,
                },
            ));
        }
    }

    Ok(())
}

/// Batched Kahn over prerequisite edges.
///
/// Returns `(batches, leftovers)`: ids per round in ascending order, and the
/// ids whose in-degree never reached zero.
fn kahn_batches(graph: &CourseGraph) -> (Vec<Vec<CourseId>>, Vec<CourseId>) {
    let arena = graph.arena();
    let mut indegree = vec![0_usize; arena.node_count()];
    for idx in graph.ordered_indices() {
        for dependent in graph.dependent_indices(idx) {
            indegree[dependent.index()] += 1;
        }
    }

    // `ordered_indices` is ascending by id, so every batch starts sorted.
    let mut ready: Vec<NodeIndex> = graph
        .ordered_indices()
        .filter(|idx| indegree[idx.index()] == 0)
        .collect();
    let mut resolved = vec![false; arena.node_count()];
    let mut batches: Vec<Vec<CourseId>> = Vec::new();

    while !ready.is_empty() {
        let current = std::mem::take(&mut ready);
        let mut next_ready: Vec<NodeIndex> = Vec::new();

        for &idx in &current {
            resolved[idx.index()] = true;
            for dependent in graph.dependent_indices(idx) {
                let entry = &mut indegree[dependent.index()];
                *entry = entry.saturating_sub(1);
                if *entry == 0 {
                    next_ready.push(dependent);
                }
            }
        }

        batches.push(current.iter().map(|&idx| arena[idx].id.clone()).collect());

        next_ready.sort_unstable_by(|a, b| arena[*a].id.cmp(&arena[*b].id));
        next_ready.dedup();
        ready = next_ready;
    }

    let leftovers = graph
        .ordered_indices()
        .filter(|idx| !resolved[idx.index()])
        .map(|idx| arena[idx].id.clone())
        .collect();

    (batches, leftovers)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
