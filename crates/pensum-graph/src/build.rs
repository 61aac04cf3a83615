//! Orchestrate ingestion, validation and layering for one query.
//!
//! # Overview
//!
//! [`GraphBuilder::build`] turns a [`GraphInput`] into a [`RenderReadyGraph`]:
//!
//! 1. Register the target, then every course in input order. The first
//!    course seen for an id wins.
//! 2. Register relations in input order. A relation with an unknown endpoint
//!    or linking a course to itself is dropped, logged and kept as a
//!    [`Diagnostic`].
//! 3. Detect prerequisite cycles. Any cycle fails the build with
//!    [`GraphError::CyclesDetected`], which still carries the ingested graph.
//! 4. Level the graph. Raw input is layered from scratch; precomputed levels
//!    are checked and replaced by computed ones when they contradict the
//!    prerequisites.
//!
//! A build owns its graph. Nothing is shared between builds and the same
//! input always yields the same [`RenderReadyGraph`].

#![allow(clippy::module_name_repetitions)]

use pensum_core::config::BuildConfig;
use pensum_core::{CourseId, GraphInput, Layering};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::GraphError;
use crate::graph::cycles::find_cycles;
use crate::graph::layers::{LevelMap, assign_levels, check_consistency};
use crate::graph::model::CourseGraph;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Knobs for [`GraphBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Use precomputed levels when they pass the consistency check.
    /// When `false` they are always recomputed.
    pub trust_precomputed: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            trust_precomputed: true,
        }
    }
}

impl From<&BuildConfig> for BuildOptions {
    fn from(config: &BuildConfig) -> Self {
        Self {
            trust_precomputed: config.trust_precomputed,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Where the levels of a [`RenderReadyGraph`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelSource {
    /// Layered from raw relations.
    Computed,
    /// Supplied upstream and accepted.
    Precomputed,
    /// Supplied upstream but rejected or ignored, then layered.
    Recomputed,
}

/// A recovered problem noticed during a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Machine code (`E####`).
    pub code: &'static str,
    pub kind: &'static str,
    pub message: String,
}

impl From<&GraphError> for Diagnostic {
    fn from(err: &GraphError) -> Self {
        let code = err.code();
        Self {
            code: code.code(),
            kind: code.kind(),
            message: err.to_string(),
        }
    }
}

/// Validated, leveled graph for one target.
///
/// Immutable snapshot; a new query builds a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderReadyGraph {
    pub target: CourseId,
    pub graph: CourseGraph,
    /// Level of every course in `graph`, and nothing else.
    pub levels: LevelMap,
    pub level_source: LevelSource,
    pub diagnostics: Vec<Diagnostic>,
}

impl RenderReadyGraph {
    /// Level of the target course.
    #[must_use]
    pub fn target_level(&self) -> Option<u32> {
        self.levels.level_of(&self.target)
    }
}

// ---------------------------------------------------------------------------
// GraphBuilder
// ---------------------------------------------------------------------------

/// Builds a [`RenderReadyGraph`] from a [`GraphInput`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphBuilder {
    options: BuildOptions,
}

impl GraphBuilder {
    #[must_use]
    pub const fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub const fn options(&self) -> BuildOptions {
        self.options
    }

    /// Run ingestion, cycle detection and layering.
    ///
    /// # Errors
    ///
    /// - [`GraphError::CyclesDetected`] when the prerequisites contain a
    ///   cycle. The error carries the cycles and the ingested graph.
    /// - [`GraphError::InvariantViolation`] if layering cannot finish, which
    ///   only happens when cycle detection missed a cycle.
    #[instrument(skip_all, fields(course = %input.target.id))]
    pub fn build(&self, input: GraphInput) -> Result<RenderReadyGraph, GraphError> {
        let GraphInput {
            target: target_course,
            courses,
            relations,
            layering,
        } = input;
        let target = target_course.id.clone();

        let mut graph = CourseGraph::new();
        let mut diagnostics: Vec<Diagnostic> = Vec::new();

        graph.add_course(target_course);
        for course in courses {
            graph.add_course(course);
        }

        for relation in &relations {
            match graph.insert_relation(relation) {
                Ok(true) => {}
                Ok(false) => debug!(%relation, "duplicate relation ignored"),
                Err(err) if err.is_recoverable() => {
                    warn!(%relation, error = %err, "dropping relation");
                    diagnostics.push(Diagnostic::from(&err));
                }
                Err(err) => return Err(err),
            }
        }

        let cycles = find_cycles(&graph);
        if !cycles.is_empty() {
            warn!(
                cycles = cycles.len(),
                courses = graph.course_count(),
                "prerequisite cycles detected, graph cannot be leveled"
            );
            return Err(GraphError::CyclesDetected {
                target,
                cycles,
                partial: Box::new(graph),
            });
        }

        let (levels, level_source) = match layering {
            Layering::Raw => (assign_levels(&graph)?, LevelSource::Computed),
            Layering::Precomputed(_) if !self.options.trust_precomputed => {
                debug!("precomputed levels ignored by configuration");
                (assign_levels(&graph)?, LevelSource::Recomputed)
            }
            Layering::Precomputed(supplied) => {
                let supplied = LevelMap::from(supplied);
                match check_consistency(&graph, &supplied) {
                    Ok(()) => (
                        supplied
                            .into_inner()
                            .into_iter()
                            .filter(|(id, _)| graph.contains(id))
                            .collect(),
                        LevelSource::Precomputed,
                    ),
                    Err(err) => {
                        warn!(error = %err, "precomputed levels rejected, recomputing");
                        diagnostics.push(Diagnostic::from(&err));
                        (assign_levels(&graph)?, LevelSource::Recomputed)
                    }
                }
            }
        };

        info!(
            courses = graph.course_count(),
            prerequisites = graph.prerequisite_count(),
            corequisites = graph.corequisite_count(),
            levels = levels.max_level().map_or(0, |max| max + 1),
            source = ?level_source,
            dropped = diagnostics.len(),
            "graph built"
        );

        Ok(RenderReadyGraph {
            target,
            graph,
            levels,
            level_source,
            diagnostics,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
