//! Node, edge and legend descriptors for a hierarchical diagram renderer.
//!
//! # Identity
//!
//! Node ids are dense indices: the position of the course in ascending
//! [`CourseId`] order. Edge ids are built from the endpoint node ids and the
//! relation kind (`"prerequisite:0-2"`). Nothing depends on time, randomness
//! or arena insertion order, so projecting the same graph twice yields
//! byte-identical output.
//!
//! # Edges
//!
//! Prerequisites project as directional edges. A corequisite projects as
//! exactly one non-directional edge from the smaller id to the larger id,
//! whichever side declared it. A prerequisite and a corequisite between the
//! same pair are two separate edges.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, BTreeSet};

use pensum_core::config::RenderConfig;
use pensum_core::{CourseId, RelationKind};
use serde::Serialize;

use crate::build::RenderReadyGraph;
use crate::graph::cycles::Cycle;
use crate::graph::layers::LevelMap;
use crate::graph::model::CourseGraph;

/// Sort method hint for hierarchical layouts: follow edge direction.
pub const SORT_METHOD: &str = "directed";

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

/// One diagram node per course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDescriptor {
    /// Dense index, stable for a given course set.
    pub id: u32,
    pub course_id: CourseId,
    pub label: String,
    /// `None` when the graph could not be leveled.
    pub level: Option<u32>,
    pub is_target: bool,
}

/// One diagram connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeDescriptor {
    /// `"{kind}:{from}-{to}"` over node ids.
    pub id: String,
    pub from: u32,
    pub to: u32,
    pub from_course: CourseId,
    pub to_course: CourseId,
    pub kind: RelationKind,
    pub directional: bool,
    /// Set on prerequisite edges lying on a reported cycle.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub in_cycle: bool,
}

/// Color assignment for one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub level: u32,
    /// Palette slot, `min(level, palette_len - 1)`.
    pub color: usize,
    pub hex: String,
}

/// Structural hints for the layout engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutHints {
    /// `"UD"` or `"LR"`.
    pub direction: &'static str,
    pub level_separation: u32,
    pub sort_method: &'static str,
}

impl From<&RenderConfig> for LayoutHints {
    fn from(config: &RenderConfig) -> Self {
        Self {
            direction: config.view.direction(),
            level_separation: config.view.level_separation(),
            sort_method: SORT_METHOD,
        }
    }
}

/// Everything the renderer needs for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Projection {
    pub target: CourseId,
    pub nodes: Vec<NodeDescriptor>,
    pub edges: Vec<EdgeDescriptor>,
    pub legend: Vec<LegendEntry>,
    pub target_color: String,
    pub layout: LayoutHints,
    /// `blake3:<hex>` over nodes, edges and legend.
    pub content_hash: String,
}

impl Projection {
    #[must_use]
    pub fn node(&self, course: &CourseId) -> Option<&NodeDescriptor> {
        self.nodes.iter().find(|node| node.course_id == *course)
    }

    /// The target's node. Always present in a projection.
    #[must_use]
    pub fn target_node(&self) -> Option<&NodeDescriptor> {
        self.nodes.iter().find(|node| node.is_target)
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Project a leveled graph.
#[must_use]
pub fn project(ready: &RenderReadyGraph, config: &RenderConfig) -> Projection {
    project_graph(
        &ready.graph,
        &ready.target,
        Some(&ready.levels),
        &BTreeSet::new(),
        config,
    )
}

/// Project a graph that could not be leveled because of `cycles`.
///
/// Nodes carry no level, the legend is empty and prerequisite edges on a
/// cycle are flagged `in_cycle`.
#[must_use]
pub fn project_partial(
    graph: &CourseGraph,
    target: &CourseId,
    cycles: &[Cycle],
    config: &RenderConfig,
) -> Projection {
    let cycle_edges: BTreeSet<(&CourseId, &CourseId)> =
        cycles.iter().flat_map(Cycle::edges).collect();
    project_graph(graph, target, None, &cycle_edges, config)
}

fn project_graph(
    graph: &CourseGraph,
    target: &CourseId,
    levels: Option<&LevelMap>,
    cycle_edges: &BTreeSet<(&CourseId, &CourseId)>,
    config: &RenderConfig,
) -> Projection {
    let dense: BTreeMap<&CourseId, u32> = graph
        .course_ids()
        .enumerate()
        .map(|(pos, id)| (id, u32::try_from(pos).unwrap_or(u32::MAX)))
        .collect();

    let nodes: Vec<NodeDescriptor> = graph
        .courses()
        .zip(0_u32..)
        .map(|(course, id)| NodeDescriptor {
            id,
            course_id: course.id.clone(),
            label: course.display_label(),
            level: levels.and_then(|levels| levels.level_of(&course.id)),
            is_target: course.id == *target,
        })
        .collect();

    let mut edges: Vec<EdgeDescriptor> = graph
        .relations()
        .into_iter()
        .filter_map(|relation| {
            let from = *dense.get(&relation.from)?;
            let to = *dense.get(&relation.to)?;
            let in_cycle = relation.kind == RelationKind::Prerequisite
                && cycle_edges.contains(&(&relation.from, &relation.to));
            Some(EdgeDescriptor {
                id: format!("{}:{from}-{to}", relation.kind),
                from,
                to,
                from_course: relation.from,
                to_course: relation.to,
                kind: relation.kind,
                directional: relation.kind.is_directional(),
                in_cycle,
            })
        })
        .collect();
    edges.sort_by_key(|edge| (edge.from, edge.to, edge.kind));

    let legend = levels.map_or_else(Vec::new, |levels| legend(levels, config));
    let content_hash = content_hash(&nodes, &edges, &legend);

    Projection {
        target: target.clone(),
        nodes,
        edges,
        legend,
        target_color: config.target_color.clone(),
        layout: LayoutHints::from(config),
        content_hash,
    }
}

/// One entry per level from 0 through the highest level present.
fn legend(levels: &LevelMap, config: &RenderConfig) -> Vec<LegendEntry> {
    let Some(max) = levels.max_level() else {
        return Vec::new();
    };
    (0..=max)
        .map(|level| {
            let color = config.color_index(level);
            LegendEntry {
                level,
                color,
                hex: config.palette.get(color).cloned().unwrap_or_default(),
            }
        })
        .collect()
}

fn content_hash(nodes: &[NodeDescriptor], edges: &[EdgeDescriptor], legend: &[LegendEntry]) -> String {
    let mut hasher = blake3::Hasher::new();
    for node in nodes {
        hasher.update(&node.id.to_le_bytes());
        hasher.update(node.course_id.to_string().as_bytes());
        hasher.update(b"\x00");
        hasher.update(node.label.as_bytes());
        hasher.update(b"\x00");
        match node.level {
            Some(level) => hasher.update(&level.to_le_bytes()),
            None => hasher.update(b"-"),
        };
        hasher.update(&[u8::from(node.is_target)]);
    }
    hasher.update(b"\x01");
    for edge in edges {
        hasher.update(edge.id.as_bytes());
        hasher.update(b"\x00");
        hasher.update(&[u8::from(edge.directional), u8::from(edge.in_cycle)]);
    }
    hasher.update(b"\x01");
    for entry in legend {
        hasher.update(&entry.level.to_le_bytes());
        hasher.update(entry.hex.as_bytes());
        hasher.update(b"\x00");
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
