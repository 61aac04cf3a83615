//! Error taxonomy for graph construction, validation and layering.
//!
//! Every variant maps to a stable [`ErrorCode`]. Recoverable variants
//! (`DanglingReference`, `SelfReference`, `InconsistentLevels`) are handled
//! inside [`crate::build::GraphBuilder`] and only surface as diagnostics;
//! the others are returned to the caller.

use std::fmt;

use pensum_core::{CourseId, ErrorCode, Relation};

use crate::graph::cycles::Cycle;
use crate::graph::model::CourseGraph;

/// Errors produced by the graph pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A relation names a course that was never registered.
    #[error("relation {relation} references unknown course {missing}")]
    DanglingReference { relation: Relation, missing: CourseId },

    /// A relation links a course to itself.
    #[error("relation {relation} links a course to itself")]
    SelfReference { relation: Relation },

    /// A course id was requested that the graph does not contain.
    #[error("course {0} not found")]
    UnknownCourse(CourseId),

    /// The prerequisite sub-graph contains cycles; layering is undefined.
    ///
    /// `partial` holds the ingested courses and relations so callers can
    /// still display them without levels.
    #[error("{} prerequisite cycle(s) detected", .cycles.len())]
    CyclesDetected {
        target: CourseId,
        cycles: Vec<Cycle>,
        partial: Box<CourseGraph>,
    },

    /// Precomputed levels contradict the prerequisite relation.
    #[error("precomputed levels are inconsistent: {0}")]
    InconsistentLevels(LevelInconsistency),

    /// Layering ran on a graph that still had cycles.
    #[error(
        "layering left {} course(s) unresolved; cycle detection must run before layering",
        .unresolved.len()
    )]
    InvariantViolation { unresolved: Vec<CourseId> },
}

impl GraphError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::DanglingReference { .. } => ErrorCode::DanglingReference,
            Self::SelfReference { .. } => ErrorCode::SelfReference,
            Self::UnknownCourse(_) => ErrorCode::UnknownCourse,
            Self::CyclesDetected { .. } => ErrorCode::CyclesDetected,
            Self::InconsistentLevels(_) => ErrorCode::InconsistentLevels,
            Self::InvariantViolation { .. } => ErrorCode::InvariantViolation,
        }
    }

    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        self.code().is_recoverable()
    }

    /// Cycles carried by [`GraphError::CyclesDetected`].
    #[must_use]
    pub fn cycles(&self) -> Option<&[Cycle]> {
        match self {
            Self::CyclesDetected { cycles, .. } => Some(cycles),
            _ => None,
        }
    }

    /// Ingested graph carried by [`GraphError::CyclesDetected`].
    #[must_use]
    pub fn partial_graph(&self) -> Option<&CourseGraph> {
        match self {
            Self::CyclesDetected { partial, .. } => Some(partial),
            _ => None,
        }
    }
}

/// First violation found while checking precomputed levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelInconsistency {
    /// A course in the graph has no level.
    Missing { course: CourseId },
    /// A prerequisite is not strictly below its dependent.
    OutOfOrder {
        prerequisite: CourseId,
        prerequisite_level: u32,
        dependent: CourseId,
        dependent_level: u32,
    },
}

impl fmt::Display for LevelInconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { course } => write!(f, "course {course} has no level"),
            Self::OutOfOrder {
                prerequisite,
                prerequisite_level,
                dependent,
                dependent_level,
            } => write!(
                f,
                "prerequisite {prerequisite} (level {prerequisite_level}) is not below \
                 {dependent} (level {dependent_level})"
            ),
        }
    }
}
