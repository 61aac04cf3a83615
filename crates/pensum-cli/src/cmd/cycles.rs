//! `pensum cycles` — list prerequisite cycles in a catalog.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use pensum_core::CourseId;
use pensum_graph::graph::{Cycle, find_cycles};
use serde::Serialize;

use super::load_catalog;
use crate::output::{OutputMode, render_mode};

/// Arguments for `pensum cycles`.
#[derive(Args, Debug)]
pub struct CyclesArgs {
    /// Catalog JSON (`-` for stdin).
    pub catalog: PathBuf,
}

#[derive(Debug, Serialize)]
struct CyclesOutput {
    cycles: Vec<Cycle>,
    #[serde(skip)]
    codes: Vec<(CourseId, String)>,
}

/// Execute `pensum cycles`.
///
/// Finding cycles is not a failure; the command succeeds either way.
///
/// # Errors
///
/// Fails when the catalog cannot be read or decoded.
pub fn run_cycles(args: &CyclesArgs, output: OutputMode) -> anyhow::Result<()> {
    let catalog = load_catalog(&args.catalog, output)?;
    let cycles = find_cycles(&catalog);

    let codes = cycles
        .iter()
        .flat_map(Cycle::courses)
        .filter_map(|id| catalog.course(id).map(|course| (id.clone(), course.code.clone())))
        .collect();

    render_mode(
        output,
        &CyclesOutput { cycles, codes },
        render_cycles_text,
        render_cycles_pretty,
    )
}

fn render_cycles_text(payload: &CyclesOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for cycle in &payload.cycles {
        let ids: Vec<String> = cycle.courses().iter().map(ToString::to_string).collect();
        writeln!(w, "{}", ids.join("\t"))?;
    }
    Ok(())
}

fn render_cycles_pretty(payload: &CyclesOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if payload.cycles.is_empty() {
        writeln!(w, "No prerequisite cycles found.")?;
        return Ok(());
    }

    writeln!(w, "Prerequisite cycles ({})", payload.cycles.len())?;

    for (idx, cycle) in payload.cycles.iter().enumerate() {
        writeln!(w, "\nCycle {}: {cycle}", idx + 1)?;
        for id in cycle.courses() {
            match payload.codes.iter().find(|(known, _)| known == id) {
                Some((_, code)) => writeln!(w, "  - {id} — {code}")?,
                None => writeln!(w, "  - {id}")?,
            }
        }
    }

    Ok(())
}
