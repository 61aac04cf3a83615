//! `pensum route` — project the route to one course of a catalog.

use std::path::PathBuf;

use clap::Args;
use pensum_core::config::PensumConfig;
use pensum_core::{CourseId, GraphInput};
use pensum_graph::{
    BuildOptions, FailureReport, GraphBuilder, describe, prerequisite_closure, project,
};
use tracing::info;

use super::{BuildOutput, load_catalog, render_build, render_failure, resolve_course};
use crate::output::OutputMode;

/// Arguments for `pensum route`.
#[derive(Args, Debug)]
pub struct RouteArgs {
    /// Catalog JSON with every course and relation (`-` for stdin).
    pub catalog: PathBuf,

    /// Target course id, or its code.
    pub target: CourseId,

    /// Leave out corequisites of the prerequisites.
    #[arg(long)]
    pub no_corequisites: bool,
}

/// Execute `pensum route`.
///
/// # Errors
///
/// Fails when the catalog cannot be read, the target matches neither an id
/// nor a code, or the route contains prerequisite cycles.
pub fn run_route(args: &RouteArgs, config: &PensumConfig, output: OutputMode) -> anyhow::Result<()> {
    let catalog = load_catalog(&args.catalog, output)?;
    let target_id = resolve_course(&catalog, &args.target, output)?;

    let include_corequisites =
        config.build.include_prerequisite_corequisites && !args.no_corequisites;
    let closure = prerequisite_closure(&catalog, &target_id, include_corequisites)?;
    let totals = describe(&catalog, &target_id)?.totals;
    info!(
        course = %target_id,
        courses = closure.course_count(),
        credits = totals.required_credits_total,
        "route extracted from catalog"
    );

    let Some(target) = closure.course(&target_id).cloned() else {
        anyhow::bail!("course {target_id} missing from its own route");
    };
    let input = GraphInput::raw(target, closure.courses().cloned().collect(), closure.relations());

    match GraphBuilder::new(BuildOptions::from(&config.build)).build(input) {
        Ok(ready) => {
            let projection = project(&ready, &config.render);
            render_build(output, &BuildOutput::new(ready, projection).with_totals(totals))
        }
        Err(err) => {
            render_failure(output, &FailureReport::from_error(&err, &config.render))?;
            anyhow::bail!("{err}");
        }
    }
}
