//! `pensum requires` — list what a course depends on.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use pensum_core::CourseId;
use pensum_graph::{ClosureReport, CourseGraph, describe};
use serde::Serialize;

use super::{load_catalog, resolve_course};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `pensum requires`.
#[derive(Args, Debug)]
pub struct RequiresArgs {
    /// Catalog JSON (`-` for stdin).
    pub catalog: PathBuf,

    /// Course id or code to describe.
    pub course: CourseId,
}

#[derive(Debug, Serialize)]
struct RequiresOutput {
    #[serde(flatten)]
    report: ClosureReport,
    #[serde(skip)]
    labels: Vec<(CourseId, String)>,
}

/// Execute `pensum requires`.
///
/// # Errors
///
/// Fails when the catalog cannot be read or the course is unknown.
pub fn run_requires(args: &RequiresArgs, output: OutputMode) -> anyhow::Result<()> {
    let catalog = load_catalog(&args.catalog, output)?;
    let course = resolve_course(&catalog, &args.course, output)?;

    let report = describe(&catalog, &course)?;
    let labels = labels_for(&catalog, &report);
    render_mode(
        output,
        &RequiresOutput { report, labels },
        render_requires_text,
        render_requires_pretty,
    )
}

fn labels_for(catalog: &CourseGraph, report: &ClosureReport) -> Vec<(CourseId, String)> {
    report
        .all_prerequisites
        .iter()
        .chain(&report.corequisites)
        .chain(std::iter::once(&report.target))
        .filter_map(|id| {
            catalog
                .course(id)
                .map(|course| (id.clone(), format!("{} {}", course.code, course.name)))
        })
        .collect()
}

fn label<'a>(output: &'a RequiresOutput, id: &CourseId) -> Option<&'a str> {
    output
        .labels
        .iter()
        .find(|(known, _)| known == id)
        .map(|(_, label)| label.as_str())
}

fn render_requires_text(output: &RequiresOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let report = &output.report;
    for id in &report.all_prerequisites {
        let kind = if report.direct_prerequisites.contains(id) {
            "direct"
        } else {
            "indirect"
        };
        writeln!(w, "{kind}\t{id}")?;
    }
    for id in &report.corequisites {
        writeln!(w, "corequisite\t{id}")?;
    }
    writeln!(w, "credits\t{}", report.totals.required_credits_total)?;
    Ok(())
}

fn render_requires_pretty(output: &RequiresOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let report = &output.report;
    let heading = label(output, &report.target).unwrap_or_default();
    pretty_section(w, &format!("{} {heading}", report.target))?;
    pretty_kv(w, "Direct", report.direct_prerequisites.len().to_string())?;
    pretty_kv(w, "Total", report.totals.prerequisite_count.to_string())?;
    pretty_kv(w, "Credits", report.totals.required_credits_total.to_string())?;
    if let Some(required) = report.totals.target_required_credits {
        pretty_kv(w, "Enrol after", format!("{required} credits"))?;
    }

    if report.all_prerequisites.is_empty() {
        writeln!(w, "\nNo prerequisites.")?;
    } else {
        writeln!(w, "\nPrerequisites")?;
        for id in &report.all_prerequisites {
            let marker = if report.direct_prerequisites.contains(id) {
                "*"
            } else {
                " "
            };
            writeln!(w, "  {marker} {id} {}", label(output, id).unwrap_or_default())?;
        }
    }

    if !report.corequisites.is_empty() {
        writeln!(w, "\nCorequisites")?;
        for id in &report.corequisites {
            writeln!(w, "    {id} {}", label(output, id).unwrap_or_default())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pensum_graph::RouteTotals;

    fn output() -> RequiresOutput {
        RequiresOutput {
            report: ClosureReport {
                target: CourseId::Numeric(3),
                direct_prerequisites: vec![CourseId::Numeric(2)],
                all_prerequisites: vec![CourseId::Numeric(1), CourseId::Numeric(2)],
                corequisites: vec![CourseId::Numeric(4)],
                totals: RouteTotals {
                    prerequisite_count: 2,
                    required_credits_total: 7,
                    target_required_credits: Some(60),
                },
            },
            labels: vec![(CourseId::Numeric(3), "MAT-301 Analysis".to_string())],
        }
    }

    #[test]
    fn text_marks_direct_and_indirect() {
        let mut buf = Vec::new();
        render_requires_text(&output(), &mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(text, "indirect\t1\ndirect\t2\ncorequisite\t4\ncredits\t7\n");
    }

    #[test]
    fn pretty_uses_known_labels() {
        let mut buf = Vec::new();
        render_requires_pretty(&output(), &mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.starts_with("3 MAT-301 Analysis"));
        assert!(text.contains("Corequisites"));
        assert!(text.contains("Credits:     7"));
        assert!(text.contains("Enrol after: 60 credits"));
    }

    #[test]
    fn json_omits_labels() {
        let value = serde_json::to_value(output()).expect("json");
        assert!(value.get("labels").is_none());
        assert_eq!(value["all_prerequisites"], serde_json::json!([1, 2]));
        assert_eq!(value["required_credits_total"], 7);
    }
}
