//! Course graph, cycle detection and layering.
//!
//! # Overview
//!
//! These modules hold the pure graph algorithms. They know nothing about
//! payloads, configuration or rendering; [`crate::build::GraphBuilder`] wires
//! them together.
//!
//! ## Pipeline
//!
//! ```text
//! Course + Relation lists
//!        ↓  model::CourseGraph::add_course / add_relation
//! CourseGraph (arena + canonical id map)
//!        ↓  cycles::find_cycles()
//! Vec<Cycle>  (empty ⇔ acyclic)
//!        ↓  layers::assign_levels()
//! LevelMap (course id → level)
//! ```
//!
//! ## Determinism
//!
//! Every traversal iterates courses in ascending [`pensum_core::CourseId`]
//! order, never in arena order. Two graphs built from the same input in any
//! order produce the same cycles and the same levels.
//!
//! ## Typical Usage
//!
//! ```rust,ignore
//! use pensum_graph::graph::{CourseGraph, assign_levels, find_cycles};
//!
//! let mut graph = CourseGraph::new();
//! graph.add_course(algebra);
//! graph.add_course(calculus);
//! graph.add_relation(&algebra_id, &calculus_id, RelationKind::Prerequisite)?;
//!
//! if find_cycles(&graph).is_empty() {
//!     let levels = assign_levels(&graph)?;
//! }
//! ```

pub mod cycles;
pub mod layers;
pub mod model;

pub use cycles::{Cycle, find_cycles, has_cycles};
pub use layers::{LevelMap, PartialLayering, assign_levels, check_consistency, partial_layers};
pub use model::CourseGraph;
