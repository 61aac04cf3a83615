//! Prerequisite closure of a target course.
//!
//! A catalog holds every course of a curriculum. Rendering one target only
//! needs the courses reachable backward from it: its direct and indirect
//! prerequisites, plus the corequisites of those prerequisites, since they
//! have to be taken alongside them.
//!
//! The target's own corequisites are not pulled in. They are taken with the
//! target, not before it.

use std::collections::{BTreeSet, VecDeque};

use pensum_core::CourseId;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::GraphError;
use crate::graph::model::CourseGraph;

/// Extract the sub-graph `target` depends on.
///
/// Walks prerequisite edges backward breadth-first from `target`. When
/// `include_corequisites` is set, corequisites of every prerequisite found
/// are added too (one hop, the target excluded). The result holds the
/// target, the collected courses and every relation among them.
///
/// # Errors
///
/// Returns [`GraphError::UnknownCourse`] if `target` is not in `catalog`.
#[instrument(skip_all, fields(course = %target))]
pub fn prerequisite_closure(
    catalog: &CourseGraph,
    target: &CourseId,
    include_corequisites: bool,
) -> Result<CourseGraph, GraphError> {
    let ancestors = ancestors_of(catalog, target)?;

    let mut keep: BTreeSet<CourseId> = ancestors.clone();
    if include_corequisites {
        for ancestor in &ancestors {
            keep.extend(
                catalog
                    .corequisites_of(ancestor)
                    .into_iter()
                    .filter(|id| *id != target)
                    .cloned(),
            );
        }
    }
    keep.insert(target.clone());

    debug!(
        prerequisites = ancestors.len(),
        courses = keep.len(),
        "closure collected"
    );
    Ok(catalog.subgraph(&keep))
}

/// Summary of what a course needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClosureReport {
    pub target: CourseId,
    /// Direct prerequisites, ascending.
    pub direct_prerequisites: Vec<CourseId>,
    /// Direct and indirect prerequisites, ascending.
    pub all_prerequisites: Vec<CourseId>,
    /// Courses to take alongside the target, ascending.
    pub corequisites: Vec<CourseId>,
    #[serde(flatten)]
    pub totals: RouteTotals,
}

/// Workload standing between a student and a course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RouteTotals {
    /// Direct and indirect prerequisites.
    pub prerequisite_count: usize,
    /// Credits of those prerequisites, summed.
    pub required_credits_total: u64,
    /// Accumulated credits the target demands before enrolling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_required_credits: Option<u32>,
}

impl RouteTotals {
    fn tally<'a>(
        catalog: &CourseGraph,
        target: &CourseId,
        prerequisites: impl IntoIterator<Item = &'a CourseId>,
    ) -> Self {
        let mut totals = Self {
            target_required_credits: catalog
                .course(target)
                .and_then(|course| course.required_credits),
            ..Self::default()
        };
        for course in prerequisites.into_iter().filter_map(|id| catalog.course(id)) {
            totals.prerequisite_count += 1;
            totals.required_credits_total += u64::from(course.credits);
        }
        totals
    }
}

/// Describe the requirements of `target`.
///
/// # Errors
///
/// Returns [`GraphError::UnknownCourse`] if `target` is not in `catalog`.
pub fn describe(catalog: &CourseGraph, target: &CourseId) -> Result<ClosureReport, GraphError> {
    let all = ancestors_of(catalog, target)?;
    let totals = RouteTotals::tally(catalog, target, &all);
    Ok(ClosureReport {
        target: target.clone(),
        direct_prerequisites: catalog
            .prerequisites_of(target)
            .into_iter()
            .cloned()
            .collect(),
        all_prerequisites: all.into_iter().collect(),
        corequisites: catalog
            .corequisites_of(target)
            .into_iter()
            .cloned()
            .collect(),
        totals,
    })
}

/// Every course reachable backward from `target`, target excluded.
///
/// Terminates on cyclic catalogs; a cycle through the target does not add
/// the target to the result.
fn ancestors_of(catalog: &CourseGraph, target: &CourseId) -> Result<BTreeSet<CourseId>, GraphError> {
    if !catalog.contains(target) {
        return Err(GraphError::UnknownCourse(target.clone()));
    }

    let mut seen: BTreeSet<CourseId> = BTreeSet::new();
    let mut queue: VecDeque<&CourseId> = VecDeque::from([target]);

    while let Some(current) = queue.pop_front() {
        for prerequisite in catalog.prerequisites_of(current) {
            if prerequisite != target && seen.insert(prerequisite.clone()) {
                queue.push_back(prerequisite);
            }
        }
    }

    Ok(seen)
}
