//! Canonical course graph.
//!
//! # Overview
//!
//! [`CourseGraph`] is an arena of courses (a petgraph [`DiGraph`]) plus a
//! canonical `CourseId → NodeIndex` map. Node indices are dense and assigned
//! once per graph; they are never exposed as identity. Everything that leaves
//! this module is keyed or ordered by [`CourseId`].
//!
//! ## Edge Direction
//!
//! A prerequisite edge `A → B` means "A must be completed before B". A
//! corequisite is stored as a single edge from the smaller id to the larger
//! id and is read in both directions.
//!
//! ## Identity Rules
//!
//! - [`CourseGraph::add_course`] is idempotent: the first course seen for an
//!   id wins and later ones are ignored.
//! - Prerequisites are additive: every distinct `from` into the same `to` is
//!   kept. An identical `(from, to)` pair is stored once.
//! - Corequisites are stored once per unordered pair.
//! - A relation with an unknown endpoint is rejected with
//!   [`GraphError::DanglingReference`]; the graph is left unchanged.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, BTreeSet};

use pensum_core::{Course, CourseId, Relation, RelationKind};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::debug;

use crate::error::GraphError;

// ---------------------------------------------------------------------------
// CourseGraph
// ---------------------------------------------------------------------------

/// Courses and their prerequisite/corequisite relations.
#[derive(Debug, Clone, Default)]
pub struct CourseGraph {
    /// Arena: nodes are courses, edge weights are relation kinds.
    graph: DiGraph<Course, RelationKind>,
    /// Canonical id → arena index.
    node_map: BTreeMap<CourseId, NodeIndex>,
    prerequisite_count: usize,
    corequisite_count: usize,
}

impl CourseGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a course and return its arena index.
    ///
    /// If the id is already present nothing changes and the existing index
    /// is returned.
    pub fn add_course(&mut self, course: Course) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(&course.id) {
            if self.graph[idx] != course {
                debug!(course = %course.id, "duplicate course ignored, keeping first-seen attributes");
            }
            return idx;
        }

        let id = course.id.clone();
        let idx = self.graph.add_node(course);
        self.node_map.insert(id, idx);
        idx
    }

    /// Register a relation between two known courses.
    ///
    /// Returns `Ok(true)` when the relation was stored and `Ok(false)` when
    /// an equivalent relation already existed.
    ///
    /// # Errors
    ///
    /// - [`GraphError::DanglingReference`] if either endpoint is unknown.
    /// - [`GraphError::SelfReference`] if `from == to`.
    pub fn add_relation(
        &mut self,
        from: &CourseId,
        to: &CourseId,
        kind: RelationKind,
    ) -> Result<bool, GraphError> {
        let relation = || Relation {
            from: from.clone(),
            to: to.clone(),
            kind,
        };

        let Some(&from_idx) = self.node_map.get(from) else {
            return Err(GraphError::DanglingReference {
                relation: relation(),
                missing: from.clone(),
            });
        };
        let Some(&to_idx) = self.node_map.get(to) else {
            return Err(GraphError::DanglingReference {
                relation: relation(),
                missing: to.clone(),
            });
        };
        if from_idx == to_idx {
            return Err(GraphError::SelfReference {
                relation: relation(),
            });
        }

        let (source, target) = match kind {
            RelationKind::Prerequisite => (from_idx, to_idx),
            RelationKind::Corequisite if to < from => (to_idx, from_idx),
            RelationKind::Corequisite => (from_idx, to_idx),
        };

        if self.has_edge(source, target, kind) {
            return Ok(false);
        }

        self.graph.add_edge(source, target, kind);
        match kind {
            RelationKind::Prerequisite => self.prerequisite_count += 1,
            RelationKind::Corequisite => self.corequisite_count += 1,
        }
        Ok(true)
    }

    /// Convenience wrapper over [`CourseGraph::add_relation`].
    ///
    /// # Errors
    ///
    /// Same as [`CourseGraph::add_relation`].
    pub fn insert_relation(&mut self, relation: &Relation) -> Result<bool, GraphError> {
        self.add_relation(&relation.from, &relation.to, relation.kind)
    }

    // -- counts ------------------------------------------------------------

    #[must_use]
    pub fn course_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn relation_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub const fn prerequisite_count(&self) -> usize {
        self.prerequisite_count
    }

    #[must_use]
    pub const fn corequisite_count(&self) -> usize {
        self.corequisite_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }

    // -- lookups -----------------------------------------------------------

    #[must_use]
    pub fn contains(&self, id: &CourseId) -> bool {
        self.node_map.contains_key(id)
    }

    #[must_use]
    pub fn course(&self, id: &CourseId) -> Option<&Course> {
        self.node_map.get(id).map(|&idx| &self.graph[idx])
    }

    /// Course whose code matches `code`, ignoring ASCII case and
    /// surrounding whitespace. With several matches the smallest id wins.
    #[must_use]
    pub fn find_by_code(&self, code: &str) -> Option<&Course> {
        let code = code.trim();
        self.courses()
            .find(|course| course.code.eq_ignore_ascii_case(code))
    }

    /// Courses in ascending id order.
    pub fn courses(&self) -> impl Iterator<Item = &Course> + '_ {
        self.node_map.values().map(|&idx| &self.graph[idx])
    }

    /// Course ids in ascending order.
    pub fn course_ids(&self) -> impl Iterator<Item = &CourseId> + '_ {
        self.node_map.keys()
    }

    /// Direct prerequisites of `id`, ascending. Empty for unknown ids.
    #[must_use]
    pub fn prerequisites_of(&self, id: &CourseId) -> Vec<&CourseId> {
        self.neighbors(id, Direction::Incoming, RelationKind::Prerequisite)
    }

    /// Courses that list `id` as a direct prerequisite, ascending.
    #[must_use]
    pub fn dependents_of(&self, id: &CourseId) -> Vec<&CourseId> {
        self.neighbors(id, Direction::Outgoing, RelationKind::Prerequisite)
    }

    /// Corequisites of `id` regardless of declaration side, ascending.
    #[must_use]
    pub fn corequisites_of(&self, id: &CourseId) -> Vec<&CourseId> {
        let mut out = self.neighbors(id, Direction::Outgoing, RelationKind::Corequisite);
        out.extend(self.neighbors(id, Direction::Incoming, RelationKind::Corequisite));
        out.sort_unstable();
        out.dedup();
        out
    }

    /// All prerequisite edges as `(prerequisite, dependent)`, ascending.
    #[must_use]
    pub fn prerequisite_edges(&self) -> Vec<(&CourseId, &CourseId)> {
        self.edges_of_kind(RelationKind::Prerequisite)
    }

    /// All corequisite pairs as `(smaller, larger)`, ascending.
    #[must_use]
    pub fn corequisite_pairs(&self) -> Vec<(&CourseId, &CourseId)> {
        self.edges_of_kind(RelationKind::Corequisite)
    }

    /// Every stored relation in canonical form, ordered by
    /// `(from, to, kind)`.
    #[must_use]
    pub fn relations(&self) -> Vec<Relation> {
        let mut out: Vec<Relation> = self
            .graph
            .edge_references()
            .map(|edge| Relation {
                from: self.graph[edge.source()].id.clone(),
                to: self.graph[edge.target()].id.clone(),
                kind: *edge.weight(),
            })
            .collect();
        out.sort_unstable_by(|a, b| (&a.from, &a.to, a.kind).cmp(&(&b.from, &b.to, b.kind)));
        out
    }

    /// New graph holding only `ids` and the relations among them.
    ///
    /// Unknown ids are ignored.
    #[must_use]
    pub fn subgraph(&self, ids: &BTreeSet<CourseId>) -> Self {
        let mut sub = Self::new();
        for id in ids {
            if let Some(course) = self.course(id) {
                sub.add_course(course.clone());
            }
        }
        for relation in self.relations() {
            if ids.contains(&relation.from) && ids.contains(&relation.to) {
                // Both endpoints exist in `sub` and relations are unique here.
                let _ = sub.insert_relation(&relation);
            }
        }
        sub
    }

    /// BLAKE3 hash of the course set and relation set.
    ///
    /// Independent of insertion order; changes whenever a course label or a
    /// relation changes.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for course in self.courses() {
            hasher.update(course.id.to_string().as_bytes());
            hasher.update(b"\x00");
            hasher.update(course.display_label().as_bytes());
            hasher.update(b"\x00");
        }
        hasher.update(b"\x01");
        for relation in self.relations() {
            hasher.update(relation.from.to_string().as_bytes());
            hasher.update(b"\x00");
            hasher.update(relation.to.to_string().as_bytes());
            hasher.update(b"\x00");
            hasher.update(relation.kind.as_str().as_bytes());
            hasher.update(b"\x00");
        }
        format!("blake3:{}", hasher.finalize())
    }

    // -- crate internals ---------------------------------------------------

    pub(crate) const fn arena(&self) -> &DiGraph<Course, RelationKind> {
        &self.graph
    }

    /// Arena indices in ascending course id order.
    pub(crate) fn ordered_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.node_map.values().copied()
    }

    /// Arena successors of `idx` along prerequisite edges, ascending by id.
    pub(crate) fn dependent_indices(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .filter(|edge| *edge.weight() == RelationKind::Prerequisite)
            .map(|edge| edge.target())
            .collect();
        out.sort_unstable_by(|a, b| self.graph[*a].id.cmp(&self.graph[*b].id));
        out.dedup();
        out
    }

    fn has_edge(&self, source: NodeIndex, target: NodeIndex, kind: RelationKind) -> bool {
        self.graph
            .edges_connecting(source, target)
            .any(|edge| *edge.weight() == kind)
    }

    fn neighbors(&self, id: &CourseId, direction: Direction, kind: RelationKind) -> Vec<&CourseId> {
        let Some(&idx) = self.node_map.get(id) else {
            return Vec::new();
        };
        let mut out: Vec<&CourseId> = self
            .graph
            .edges_directed(idx, direction)
            .filter(|edge| *edge.weight() == kind)
            .map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                &self.graph[other].id
            })
            .collect();
        out.sort_unstable();
        out
    }

    fn edges_of_kind(&self, kind: RelationKind) -> Vec<(&CourseId, &CourseId)> {
        let mut out: Vec<(&CourseId, &CourseId)> = self
            .graph
            .edge_references()
            .filter(|edge| *edge.weight() == kind)
            .map(|edge| (&self.graph[edge.source()].id, &self.graph[edge.target()].id))
            .collect();
        out.sort_unstable();
        out
    }
}

impl PartialEq for CourseGraph {
    /// Two graphs are equal when they hold the same courses and relations,
    /// whatever order they were inserted in.
    fn eq(&self, other: &Self) -> bool {
        self.course_count() == other.course_count()
            && self.relation_count() == other.relation_count()
            && self.courses().eq(other.courses())
            && self.relations() == other.relations()
    }
}

impl Eq for CourseGraph {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn course(id: u64) -> Course {
        Course::new(id, format!("C{id}"), format!("Course {id}"), 3)
    }

    fn id(n: u64) -> CourseId {
        CourseId::Numeric(n)
    }

    fn graph_with(ids: &[u64]) -> CourseGraph {
        let mut graph = CourseGraph::new();
        for &n in ids {
            graph.add_course(course(n));
        }
        graph
    }

    #[test]
    fn add_course_is_idempotent_and_keeps_first_label() {
        let mut graph = CourseGraph::new();
        let first = graph.add_course(course(1));
        let second = graph.add_course(Course::new(1_u64, "OTHER", "Renamed", 9));

        assert_eq!(first, second);
        assert_eq!(graph.course_count(), 1);
        assert_eq!(graph.course(&id(1)).map(|c| c.code.as_str()), Some("C1"));
    }

    #[test]
    fn prerequisites_are_additive() {
        let mut graph = graph_with(&[1, 2, 3]);
        assert_eq!(graph.add_relation(&id(1), &id(3), RelationKind::Prerequisite), Ok(true));
        assert_eq!(graph.add_relation(&id(2), &id(3), RelationKind::Prerequisite), Ok(true));
        assert_eq!(graph.add_relation(&id(1), &id(3), RelationKind::Prerequisite), Ok(false));

        assert_eq!(graph.prerequisite_count(), 2);
        assert_eq!(graph.relation_count(), 2);
        assert_eq!(graph.prerequisites_of(&id(3)), vec![&id(1), &id(2)]);
        assert_eq!(graph.dependents_of(&id(1)), vec![&id(3)]);
    }

    #[test]
    fn corequisites_collapse_per_unordered_pair() {
        let mut graph = graph_with(&[1, 2]);
        assert_eq!(graph.add_relation(&id(2), &id(1), RelationKind::Corequisite), Ok(true));
        assert_eq!(graph.add_relation(&id(1), &id(2), RelationKind::Corequisite), Ok(false));

        assert_eq!(graph.corequisite_count(), 1);
        assert_eq!(graph.corequisite_pairs(), vec![(&id(1), &id(2))]);
        assert_eq!(graph.corequisites_of(&id(1)), vec![&id(2)]);
        assert_eq!(graph.corequisites_of(&id(2)), vec![&id(1)]);
    }

    #[test]
    fn prerequisite_and_corequisite_coexist_on_same_pair() {
        let mut graph = graph_with(&[1, 2]);
        assert_eq!(graph.add_relation(&id(1), &id(2), RelationKind::Prerequisite), Ok(true));
        assert_eq!(graph.add_relation(&id(1), &id(2), RelationKind::Corequisite), Ok(true));

        assert_eq!(graph.relation_count(), 2);
        assert_eq!(graph.prerequisite_edges().len(), 1);
        assert_eq!(graph.corequisite_pairs().len(), 1);
    }

    #[test]
    fn dangling_reference_leaves_graph_unchanged() {
        let mut graph = graph_with(&[1]);
        let err = graph
            .add_relation(&id(1), &id(99), RelationKind::Prerequisite)
            .expect_err("unknown endpoint");

        assert!(matches!(
            err,
            GraphError::DanglingReference { ref missing, .. } if *missing == id(99)
        ));
        assert_eq!(graph.relation_count(), 0);
    }

    #[test]
    fn self_reference_rejected() {
        let mut graph = graph_with(&[1]);
        let err = graph
            .add_relation(&id(1), &id(1), RelationKind::Corequisite)
            .expect_err("self reference");
        assert!(matches!(err, GraphError::SelfReference { .. }));
    }

    #[test]
    fn courses_iterate_in_id_order_regardless_of_insertion() {
        let graph = graph_with(&[5, 1, 3]);
        let ids: Vec<&CourseId> = graph.course_ids().collect();
        assert_eq!(ids, vec![&id(1), &id(3), &id(5)]);
    }

    #[test]
    fn subgraph_keeps_internal_relations_only() {
        let mut graph = graph_with(&[1, 2, 3]);
        graph
            .add_relation(&id(1), &id(2), RelationKind::Prerequisite)
            .expect("edge");
        graph
            .add_relation(&id(2), &id(3), RelationKind::Prerequisite)
            .expect("edge");

        let sub = graph.subgraph(&BTreeSet::from([id(1), id(2), id(42)]));
        assert_eq!(sub.course_count(), 2);
        assert_eq!(sub.relations(), vec![Relation::prerequisite(1_u64, 2_u64)]);
    }

    #[test]
    fn content_hash_ignores_insertion_order() {
        let mut a = graph_with(&[1, 2]);
        a.add_relation(&id(1), &id(2), RelationKind::Prerequisite)
            .expect("edge");
        let mut b = graph_with(&[2, 1]);
        b.add_relation(&id(1), &id(2), RelationKind::Prerequisite)
            .expect("edge");

        assert_eq!(a.content_hash(), b.content_hash());
        assert_eq!(a, b);
        assert!(a.content_hash().starts_with("blake3:"));
    }

    #[test]
    fn content_hash_changes_with_relations() {
        let mut graph = graph_with(&[1, 2]);
        let before = graph.content_hash();
        graph
            .add_relation(&id(1), &id(2), RelationKind::Corequisite)
            .expect("edge");
        assert_ne!(before, graph.content_hash());
    }

    #[test]
    fn unknown_ids_have_no_neighbors() {
        let graph = graph_with(&[1]);
        assert!(graph.prerequisites_of(&id(7)).is_empty());
        assert!(graph.corequisites_of(&id(7)).is_empty());
        assert!(graph.course(&id(7)).is_none());
    }

    #[test]
    fn find_by_code_ignores_case_and_prefers_smallest_id() {
        let mut graph = CourseGraph::new();
        graph.add_course(Course::new(9_u64, "MAT-201", "Calculus II", 4));
        graph.add_course(Course::new(4_u64, "mat-201", "Calculus II (old)", 4));
        graph.add_course(Course::new(1_u64, "MAT-101", "Calculus I", 4));

        let found = graph.find_by_code(" Mat-201 ").expect("code present");
        assert_eq!(found.id, id(4));
        assert_eq!(graph.find_by_code("MAT-101").map(|c| &c.id), Some(&id(1)));
        assert!(graph.find_by_code("FIS-100").is_none());
    }
}
