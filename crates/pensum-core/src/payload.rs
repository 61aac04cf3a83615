//! Input boundary between the data collaborator and the graph builder.
//!
//! Upstream delivers a graph in one of two shapes: a flat relation list with
//! layering left to pensum, or the same list plus levels it already computed.
//! [`GraphPayload`] accepts both on the wire; converting it into a
//! [`GraphInput`] resolves the shape once into [`Layering`] so nothing
//! downstream branches on optional fields again.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Course, CourseId, Relation};

/// Wire payload for a single target-course query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphPayload {
    pub target_course: Course,
    /// Courses reachable backward from the target. May repeat the target.
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub relations: Vec<Relation>,
    /// Levels precomputed upstream, keyed by course id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levels: Option<BTreeMap<CourseId, u32>>,
}

impl GraphPayload {
    /// Decode a payload from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the document does not match the
    /// payload shape.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Wire payload describing a whole curriculum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPayload {
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

impl CatalogPayload {
    /// Decode a catalog from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the document does not match the
    /// catalog shape.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// How levels are obtained for a build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Layering {
    /// Compute levels from the prerequisite relations.
    #[default]
    Raw,
    /// Levels supplied upstream; validated before use.
    Precomputed(BTreeMap<CourseId, u32>),
}

/// Builder input with the layering shape already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphInput {
    pub target: Course,
    pub courses: Vec<Course>,
    pub relations: Vec<Relation>,
    pub layering: Layering,
}

impl GraphInput {
    /// Input with raw relations and no precomputed levels.
    #[must_use]
    pub const fn raw(target: Course, courses: Vec<Course>, relations: Vec<Relation>) -> Self {
        Self {
            target,
            courses,
            relations,
            layering: Layering::Raw,
        }
    }

    /// Attach precomputed levels.
    #[must_use]
    pub fn with_levels(mut self, levels: BTreeMap<CourseId, u32>) -> Self {
        self.layering = Layering::Precomputed(levels);
        self
    }
}

impl From<GraphPayload> for GraphInput {
    fn from(payload: GraphPayload) -> Self {
        let layering = payload
            .levels
            .map_or(Layering::Raw, Layering::Precomputed);
        Self {
            target: payload.target_course,
            courses: payload.courses,
            relations: payload.relations,
            layering,
        }
    }
}
