//! Property tests over randomly generated curricula.
//!
//! [`curriculum`] generates prerequisites from a lower index to a higher
//! index, so those curricula are acyclic. Relations may also point at
//! course ids that were never supplied; those must be dropped.
//!
//! [`cyclic_curriculum`] adds a few prerequisites pointing back down, which
//! usually close one or more cycles.

use std::collections::BTreeSet;

use pensum_core::config::RenderConfig;
use pensum_core::{Course, CourseId, GraphInput, Relation, RelationKind};
use pensum_graph::graph::{find_cycles, has_cycles, partial_layers};
use pensum_graph::{CourseGraph, Cycle, GraphBuilder, RenderReadyGraph, project};
use proptest::prelude::*;

/// Ids at or above this value are never supplied as courses.
const GHOST_BASE: u64 = 1_000;

#[derive(Debug, Clone)]
struct Curriculum {
    size: u64,
    relations: Vec<Relation>,
}

impl Curriculum {
    fn input(&self) -> GraphInput {
        let course = |n: u64| Course::new(n, format!("C{n}"), format!("Course {n}"), 3);
        GraphInput::raw(
            course(self.size - 1),
            (0..self.size - 1).map(course).collect(),
            self.relations.clone(),
        )
    }

    /// Ingest the same way the builder does: target first, then the rest,
    /// skipping relations the graph rejects.
    fn graph(&self) -> CourseGraph {
        let input = self.input();
        let mut graph = CourseGraph::new();
        graph.add_course(input.target);
        for course in input.courses {
            graph.add_course(course);
        }
        for relation in &input.relations {
            let _ = graph.insert_relation(relation);
        }
        graph
    }

    fn build(&self) -> RenderReadyGraph {
        GraphBuilder::default()
            .build(self.input())
            .expect("generated curricula are acyclic")
    }
}

fn curriculum() -> impl Strategy<Value = Curriculum> {
    (2_u64..30).prop_flat_map(|size| {
        let relation = (0..size, 0..size, any::<bool>(), prop::bool::weighted(0.1)).prop_map(
            move |(a, b, coreq, ghost)| {
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                let hi = if ghost { GHOST_BASE + hi } else { hi };
                if coreq {
                    Relation::corequisite(hi, lo)
                } else {
                    Relation::prerequisite(lo, hi)
                }
            },
        );
        prop::collection::vec(relation, 0..60).prop_map(move |relations| Curriculum { size, relations })
    })
}

fn cyclic_curriculum() -> impl Strategy<Value = Curriculum> {
    (3_u64..20).prop_flat_map(|size| {
        let forward =
            (0..size, 0..size).prop_map(|(a, b)| Relation::prerequisite(a.min(b), a.max(b)));
        let backward =
            (0..size, 0..size).prop_map(|(a, b)| Relation::prerequisite(a.max(b), a.min(b)));
        (
            prop::collection::vec(forward, 1..40),
            prop::collection::vec(backward, 1..4),
        )
            .prop_map(move |(mut relations, back)| {
                relations.extend(back);
                Curriculum { size, relations }
            })
    })
}

proptest! {
    #[test]
    fn prop_prerequisites_sit_below_dependents(curriculum in curriculum()) {
        let ready = curriculum.build();
        for (p, c) in ready.graph.prerequisite_edges() {
            let lp = ready.levels.level_of(p).expect("every course leveled");
            let lc = ready.levels.level_of(c).expect("every course leveled");
            prop_assert!(lp < lc, "{p} (level {lp}) not below {c} (level {lc})");
        }
    }

    #[test]
    fn prop_level_is_longest_prerequisite_chain(curriculum in curriculum()) {
        let ready = curriculum.build();
        for id in ready.graph.course_ids() {
            let expected = ready
                .graph
                .prerequisites_of(id)
                .into_iter()
                .filter_map(|p| ready.levels.level_of(p))
                .max()
                .map_or(0, |max| max + 1);
            prop_assert_eq!(ready.levels.level_of(id), Some(expected));
        }
    }

    #[test]
    fn prop_projection_is_deterministic(curriculum in curriculum()) {
        let config = RenderConfig::default();
        let first = project(&curriculum.build(), &config);

        let mut reversed = curriculum.clone();
        reversed.relations.reverse();
        let second = project(&reversed.build(), &config);

        prop_assert_eq!(&first, &second);
        let a = serde_json::to_string(&first).expect("serialize");
        let b = serde_json::to_string(&second).expect("serialize");
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_corequisites_project_once_per_pair(curriculum in curriculum()) {
        let projection = project(&curriculum.build(), &RenderConfig::default());
        let mut pairs: Vec<(u32, u32)> = projection
            .edges
            .iter()
            .filter(|edge| edge.kind == RelationKind::Corequisite)
            .map(|edge| (edge.from, edge.to))
            .collect();
        let total = pairs.len();
        prop_assert!(pairs.iter().all(|(from, to)| from < to));
        pairs.dedup();
        prop_assert_eq!(pairs.len(), total);
    }

    #[test]
    fn prop_dangling_relations_are_dropped(curriculum in curriculum()) {
        let ready = curriculum.build();
        let projection = project(&ready, &RenderConfig::default());

        let ghosts = curriculum
            .relations
            .iter()
            .filter(|r| r.from.as_numeric().is_some_and(|n| n >= GHOST_BASE)
                || r.to.as_numeric().is_some_and(|n| n >= GHOST_BASE))
            .count();
        let dangling = ready
            .diagnostics
            .iter()
            .filter(|d| d.kind == "DanglingReferenceError")
            .count();
        prop_assert_eq!(dangling, ghosts);
        let edges_only_real = projection.edges.iter().all(|edge| {
            edge.from_course.as_numeric().is_some_and(|n| n < GHOST_BASE)
                && edge.to_course.as_numeric().is_some_and(|n| n < GHOST_BASE)
        });
        prop_assert!(edges_only_real);
    }

    #[test]
    fn prop_acyclic_curricula_layer_completely(curriculum in curriculum()) {
        let ready = curriculum.build();
        prop_assert!(find_cycles(&ready.graph).is_empty());

        let partial = partial_layers(&ready.graph);
        prop_assert!(partial.is_complete());
        prop_assert_eq!(partial.assigned_count(), ready.graph.course_count());
        prop_assert_eq!(partial.layers, ready.levels.layers());
    }

    #[test]
    fn prop_target_node_is_flagged(curriculum in curriculum()) {
        let projection = project(&curriculum.build(), &RenderConfig::default());
        let targets: Vec<&CourseId> = projection
            .nodes
            .iter()
            .filter(|node| node.is_target)
            .map(|node| &node.course_id)
            .collect();
        let expected_target = CourseId::Numeric(curriculum.size - 1);
        prop_assert_eq!(targets, vec![&expected_target]);
    }

    #[test]
    fn prop_cycles_exactly_when_layering_stalls(curriculum in cyclic_curriculum()) {
        let graph = curriculum.graph();
        let cycles = find_cycles(&graph);
        prop_assert_eq!(has_cycles(&graph), !cycles.is_empty());

        let partial = partial_layers(&graph);
        prop_assert_eq!(partial.is_complete(), cycles.is_empty());
        prop_assert_eq!(partial.total_count(), graph.course_count());
        for cycle in &cycles {
            for id in cycle.courses() {
                prop_assert!(partial.unassigned.contains(id), "{id} on a cycle but leveled");
            }
        }
    }

    #[test]
    fn prop_cycles_follow_prerequisite_edges(curriculum in cyclic_curriculum()) {
        let graph = curriculum.graph();
        let edges: BTreeSet<(&CourseId, &CourseId)> =
            graph.prerequisite_edges().into_iter().collect();
        for cycle in find_cycles(&graph) {
            prop_assert!(cycle.len() >= 2);
            for edge in cycle.edges() {
                prop_assert!(edges.contains(&edge), "{} -> {} is not a prerequisite", edge.0, edge.1);
            }
            let distinct: BTreeSet<&CourseId> = cycle.courses().iter().collect();
            prop_assert_eq!(distinct.len(), cycle.len(), "{} revisits a course", cycle);
        }
    }

    #[test]
    fn prop_cycles_start_at_smallest_and_are_unique(curriculum in cyclic_curriculum()) {
        let cycles = find_cycles(&curriculum.graph());
        for cycle in &cycles {
            prop_assert_eq!(cycle.courses().first(), cycle.courses().iter().min());
        }
        let distinct: BTreeSet<&Cycle> = cycles.iter().collect();
        prop_assert_eq!(distinct.len(), cycles.len());
    }

    #[test]
    fn prop_builder_rejects_exactly_the_cyclic(curriculum in cyclic_curriculum()) {
        let expected = find_cycles(&curriculum.graph());
        match GraphBuilder::default().build(curriculum.input()) {
            Ok(ready) => {
                prop_assert!(expected.is_empty());
                prop_assert_eq!(ready.levels.len(), ready.graph.course_count());
            }
            Err(err) => {
                prop_assert_eq!(err.cycles(), Some(expected.as_slice()));
                let partial = err.partial_graph().expect("cycle errors carry the graph");
                let size = usize::try_from(curriculum.size).expect("small size");
                prop_assert_eq!(partial.course_count(), size);
            }
        }
    }
}
