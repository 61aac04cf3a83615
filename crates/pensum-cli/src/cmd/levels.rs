//! `pensum levels` — layer a whole catalog, cycles included.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use pensum_graph::graph::{PartialLayering, partial_layers};
use serde::Serialize;

use super::load_catalog;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `pensum levels`.
#[derive(Args, Debug)]
pub struct LevelsArgs {
    /// Catalog JSON (`-` for stdin).
    pub catalog: PathBuf,
}

#[derive(Debug, Serialize)]
struct LevelsOutput {
    #[serde(flatten)]
    layering: PartialLayering,
    assigned: usize,
    total: usize,
}

/// Execute `pensum levels`.
///
/// # Errors
///
/// Fails when the catalog cannot be read or decoded.
pub fn run_levels(args: &LevelsArgs, output: OutputMode) -> anyhow::Result<()> {
    let catalog = load_catalog(&args.catalog, output)?;
    let layering = partial_layers(&catalog);
    let payload = LevelsOutput {
        assigned: layering.assigned_count(),
        total: layering.total_count(),
        layering,
    };
    render_mode(output, &payload, render_levels_text, render_levels_pretty)
}

fn render_levels_text(payload: &LevelsOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for (level, layer) in payload.layering.layers.iter().enumerate() {
        for id in layer {
            writeln!(w, "{level}\t{id}")?;
        }
    }
    for id in &payload.layering.unassigned {
        writeln!(w, "-\t{id}")?;
    }
    Ok(())
}

fn render_levels_pretty(payload: &LevelsOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Curriculum levels")?;
    pretty_kv(w, "Assigned", format!("{}/{}", payload.assigned, payload.total))?;

    for (level, layer) in payload.layering.layers.iter().enumerate() {
        let ids: Vec<String> = layer.iter().map(ToString::to_string).collect();
        writeln!(w, "  {level:>3}  {}", ids.join(", "))?;
    }

    if !payload.layering.unassigned.is_empty() {
        let ids: Vec<String> = payload
            .layering
            .unassigned
            .iter()
            .map(ToString::to_string)
            .collect();
        writeln!(w, "\nBlocked by cycles: {}", ids.join(", "))?;
    }
    Ok(())
}
