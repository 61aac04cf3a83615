//! Subcommand handlers and the helpers they share.

pub mod build;
pub mod completions;
pub mod cycles;
pub mod levels;
pub mod requires;
pub mod route;

use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::Context;
use pensum_core::{CatalogPayload, CourseId, ErrorCode, GraphPayload};
use pensum_graph::build::{Diagnostic, LevelSource};
use pensum_graph::{CourseGraph, FailureReport, Projection, RenderReadyGraph, RouteTotals};
use serde::Serialize;
use tracing::{debug, warn};

use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Read a whole input file, or stdin when `path` is `-`.
pub fn read_source(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn invalid_payload(
    output: OutputMode,
    path: &Path,
    err: &serde_json::Error,
) -> anyhow::Result<()> {
    render_error(
        output,
        &CliError::new(ErrorCode::InvalidPayload, format!("{}: {err}", path.display())),
    )
}

/// Decode a single-target graph payload.
pub fn load_payload(path: &Path, output: OutputMode) -> anyhow::Result<GraphPayload> {
    let text = read_source(path)?;
    match GraphPayload::from_json(&text) {
        Ok(payload) => Ok(payload),
        Err(err) => {
            invalid_payload(output, path, &err)?;
            anyhow::bail!("invalid graph payload");
        }
    }
}

/// Decode a catalog and load it into a graph.
///
/// Relations with unknown endpoints or linking a course to itself are
/// dropped with a warning.
pub fn load_catalog(path: &Path, output: OutputMode) -> anyhow::Result<CourseGraph> {
    let text = read_source(path)?;
    let catalog = match CatalogPayload::from_json(&text) {
        Ok(catalog) => catalog,
        Err(err) => {
            invalid_payload(output, path, &err)?;
            anyhow::bail!("invalid catalog payload");
        }
    };

    let mut graph = CourseGraph::new();
    for course in catalog.courses {
        graph.add_course(course);
    }
    for relation in &catalog.relations {
        if let Err(err) = graph.insert_relation(relation) {
            warn!(%relation, error = %err, "dropping catalog relation");
        }
    }
    debug!(
        courses = graph.course_count(),
        relations = graph.relation_count(),
        "catalog loaded"
    );
    Ok(graph)
}

/// Resolve a command-line course reference against `catalog`.
///
/// An exact id match wins; otherwise the reference is tried as a course
/// code. Fails with a rendered error when neither matches.
pub fn resolve_course(
    catalog: &CourseGraph,
    reference: &CourseId,
    output: OutputMode,
) -> anyhow::Result<CourseId> {
    if catalog.contains(reference) {
        return Ok(reference.clone());
    }
    if let Some(course) = catalog.find_by_code(&reference.to_string()) {
        debug!(code = %reference, course = %course.id, "course resolved by code");
        return Ok(course.id.clone());
    }
    let err = pensum_graph::GraphError::UnknownCourse(reference.clone());
    render_error(output, &CliError::from(&err))?;
    anyhow::bail!("{err}");
}

// ---------------------------------------------------------------------------
// Build output
// ---------------------------------------------------------------------------

/// Projection plus what the build recovered from.
#[derive(Debug, Serialize)]
pub struct BuildOutput {
    #[serde(flatten)]
    pub projection: Projection,
    pub level_source: LevelSource,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
    /// Set when the graph is a route carved out of a catalog.
    #[serde(flatten)]
    pub totals: Option<RouteTotals>,
}

impl BuildOutput {
    pub fn new(ready: RenderReadyGraph, projection: Projection) -> Self {
        Self {
            projection,
            level_source: ready.level_source,
            diagnostics: ready.diagnostics,
            totals: None,
        }
    }

    #[must_use]
    pub const fn with_totals(mut self, totals: RouteTotals) -> Self {
        self.totals = Some(totals);
        self
    }
}

pub fn render_build(output: OutputMode, report: &BuildOutput) -> anyhow::Result<()> {
    render_mode(output, report, render_build_text, render_build_pretty)
}

fn render_build_text(report: &BuildOutput, w: &mut dyn Write) -> io::Result<()> {
    for node in &report.projection.nodes {
        let level = node.level.map_or_else(|| "-".to_string(), |l| l.to_string());
        let code = node.label.lines().next().unwrap_or_default();
        let marker = if node.is_target { "*" } else { "" };
        writeln!(w, "{level}\t{}\t{code}{marker}", node.course_id)?;
    }
    Ok(())
}

fn render_build_pretty(report: &BuildOutput, w: &mut dyn Write) -> io::Result<()> {
    let projection = &report.projection;
    pretty_section(w, &format!("Route to {}", projection.target))?;
    pretty_kv(w, "Courses", projection.nodes.len().to_string())?;
    pretty_kv(w, "Relations", projection.edges.len().to_string())?;
    pretty_kv(w, "Levels", format!("{:?}", report.level_source).to_lowercase())?;
    pretty_kv(w, "Hash", &projection.content_hash)?;
    if let Some(totals) = &report.totals {
        pretty_kv(w, "Prior", totals.prerequisite_count.to_string())?;
        pretty_kv(w, "Credits", totals.required_credits_total.to_string())?;
    }

    for entry in &projection.legend {
        writeln!(w, "\nLevel {} ({})", entry.level, entry.hex)?;
        for node in projection
            .nodes
            .iter()
            .filter(|node| node.level == Some(entry.level))
        {
            let label = node.label.replace('\n', " · ");
            let marker = if node.is_target { "  ← target" } else { "" };
            writeln!(w, "  - {label}{marker}")?;
        }
    }

    if !report.diagnostics.is_empty() {
        writeln!(w, "\nDiagnostics ({})", report.diagnostics.len())?;
        for diagnostic in &report.diagnostics {
            writeln!(w, "  [{}] {}", diagnostic.code, diagnostic.message)?;
        }
    }
    Ok(())
}

/// Render a failed build to stdout. The caller still owns the exit code.
pub fn render_failure(output: OutputMode, report: &FailureReport) -> anyhow::Result<()> {
    render_mode(output, report, render_failure_text, render_failure_pretty)
}

fn render_failure_text(report: &FailureReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}\t{}\t{}", report.code, report.error_kind, report.message)?;
    for cycle in report.cycles.iter().flatten() {
        let ids: Vec<String> = cycle.iter().map(ToString::to_string).collect();
        writeln!(w, "cycle\t{}", ids.join("\t"))?;
    }
    Ok(())
}

fn render_failure_pretty(report: &FailureReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "error[{}]: {}", report.code, report.message)?;
    if let Some(cycles) = &report.cycles {
        for (idx, cycle) in cycles.iter().enumerate() {
            let mut ids: Vec<String> = cycle.iter().map(ToString::to_string).collect();
            if let Some(first) = cycle.first() {
                ids.push(first.to_string());
            }
            writeln!(w, "  cycle {}: {}", idx + 1, ids.join(" → "))?;
        }
    }
    if let Some(hint) = report.hint {
        writeln!(w, "  hint: {hint}")?;
    }
    Ok(())
}
