#![forbid(unsafe_code)]
//! pensum-graph library.
//!
//! Builds, validates, levels and projects the prerequisite graph of one
//! target course.
//!
//! # Conventions
//!
//! - **Errors**: every fallible operation returns [`GraphError`]; recoverable
//!   problems surface as [`build::Diagnostic`]s instead.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//! - **Ordering**: everything observable is ordered by [`pensum_core::CourseId`].

pub mod build;
pub mod closure;
pub mod error;
pub mod graph;
pub mod render;

pub use build::{BuildOptions, Diagnostic, GraphBuilder, LevelSource, RenderReadyGraph};
pub use closure::{ClosureReport, RouteTotals, describe, prerequisite_closure};
pub use error::{GraphError, LevelInconsistency};
pub use graph::{CourseGraph, Cycle, LevelMap, PartialLayering};
pub use render::{FailureReport, Projection, project, project_partial};
