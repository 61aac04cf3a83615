#![forbid(unsafe_code)]
//! pensum-core library.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums at crate boundaries; `anyhow` only in
//!   the CLI.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod model;
pub mod payload;

pub use error::ErrorCode;
pub use model::{Course, CourseId, Relation, RelationKind};
pub use payload::{CatalogPayload, GraphInput, GraphPayload, Layering};
