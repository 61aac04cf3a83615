//! Render-ready descriptors handed to the diagram collaborator.
//!
//! [`project`] turns a [`crate::build::RenderReadyGraph`] into a
//! [`Projection`]. When a build fails, [`FailureReport::from_error`] builds
//! the failure payload, including a level-less projection of a cyclic graph.

pub mod projection;
pub mod report;

pub use projection::{
    EdgeDescriptor, LayoutHints, LegendEntry, NodeDescriptor, Projection, project, project_partial,
};
pub use report::FailureReport;
