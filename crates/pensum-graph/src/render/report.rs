//! Failure payload for the rendering collaborator.

use pensum_core::CourseId;
use pensum_core::config::RenderConfig;
use serde::Serialize;

use super::projection::{Projection, project_partial};
use crate::error::GraphError;

/// What the renderer receives when a build fails.
///
/// `cycles` and `partial` are only set for [`GraphError::CyclesDetected`]:
/// the offending cycles, and the ingested graph projected without levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReport {
    pub error_kind: &'static str,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycles: Option<Vec<Vec<CourseId>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial: Option<Projection>,
}

impl FailureReport {
    #[must_use]
    pub fn from_error(err: &GraphError, config: &RenderConfig) -> Self {
        let code = err.code();
        let (cycles, partial) = match err {
            GraphError::CyclesDetected {
                target,
                cycles,
                partial,
            } => (
                Some(cycles.iter().map(|cycle| cycle.courses().to_vec()).collect()),
                Some(project_partial(partial, target, cycles, config)),
            ),
            _ => (None, None),
        };

        Self {
            error_kind: code.kind(),
            code: code.code(),
            message: err.to_string(),
            hint: code.hint(),
            cycles,
            partial,
        }
    }
}
