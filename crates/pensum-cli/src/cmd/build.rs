//! `pensum build` — build and project one graph payload.

use std::path::PathBuf;

use clap::Args;
use pensum_core::config::PensumConfig;
use pensum_graph::{BuildOptions, FailureReport, GraphBuilder, project};

use super::{BuildOutput, load_payload, render_build, render_failure};
use crate::output::OutputMode;

/// Arguments for `pensum build`.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Graph payload JSON (`-` for stdin).
    pub payload: PathBuf,

    /// Recompute levels even when the payload carries valid ones.
    #[arg(long)]
    pub recompute: bool,
}

/// Execute `pensum build`.
///
/// # Errors
///
/// Fails when the payload cannot be read or decoded, or when the graph has
/// prerequisite cycles. The failure report is printed before returning.
pub fn run_build(args: &BuildArgs, config: &PensumConfig, output: OutputMode) -> anyhow::Result<()> {
    let payload = load_payload(&args.payload, output)?;

    let mut options = BuildOptions::from(&config.build);
    if args.recompute {
        options.trust_precomputed = false;
    }

    match GraphBuilder::new(options).build(payload.into()) {
        Ok(ready) => {
            let projection = project(&ready, &config.render);
            render_build(output, &BuildOutput::new(ready, projection))
        }
        Err(err) => {
            render_failure(output, &FailureReport::from_error(&err, &config.render))?;
            anyhow::bail!("{err}");
        }
    }
}
