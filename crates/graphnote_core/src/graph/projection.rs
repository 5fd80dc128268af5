//! Projection builders for the contents, areas and children layers.
//!
//! # Responsibility
//! - Turn a snapshot into node/edge lists for one layer.
//! - Merge manual, automatic and parent edges with their default styling.
//!
//! # Invariants
//! - Only closed contents become nodes; contents pointing at a missing area
//!   are left out, orphans (no area) are kept unless an area filter is set.
//! - Edges are emitted only between nodes of the same projection.
//! - Hierarchy-aware builders drop contents past the depth cap or outside
//!   their level's area scope, together with their edges.

use super::hierarchy::{
    clamp_max_levels, descendants_within, effective_level_config, HierarchyMap, LevelResolution,
};
use super::links::LinkIndex;
use super::style::StyleResolver;
use super::visual::{
    GraphProjection, NodeType, VisualEdge, VisualNode, AUTO_EDGE_COLOR, DEFAULT_AREA_COLOR,
    DEFAULT_CONTENT_COLOR, PARENT_EDGE_COLOR,
};
use crate::model::area::{Area, AreaId};
use crate::model::content::{Content, ContentId};
use crate::model::link::{ArrowMode, LineStyle, Link, LinkType};
use crate::model::snapshot::WorkspaceSnapshot;
use log::debug;
use std::collections::{HashMap, HashSet};

/// Options shared by the hierarchy-aware builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyOptions {
    /// Emit child-to-parent edges next to manual/auto edges.
    pub show_parent_edges: bool,
}

impl Default for HierarchyOptions {
    fn default() -> Self {
        Self {
            show_parent_edges: true,
        }
    }
}

/// Flat contents layer: every visible content, manual and auto edges.
pub fn build_flat_graph(snapshot: &WorkspaceSnapshot, area_filter: Option<AreaId>) -> GraphProjection {
    let index = LinkIndex::build(&snapshot.contents, &snapshot.links);
    let nodes: Vec<VisualNode> = visible_contents(snapshot, area_filter)
        .map(flat_content_node)
        .collect();
    let edges = non_hierarchical_edges(&index, &nodes);

    debug!(
        "event=build_flat_graph module=graph status=ok nodes={} edges={}",
        nodes.len(),
        edges.len()
    );
    GraphProjection { nodes, edges }
}

/// Area rollup layer: one unconnected node per area.
pub fn build_area_graph(snapshot: &WorkspaceSnapshot) -> GraphProjection {
    let mut counts: HashMap<AreaId, usize> = HashMap::new();
    for content in &snapshot.contents {
        if let Some(area_id) = content.area_id {
            *counts.entry(area_id).or_insert(0) += 1;
        }
    }

    let nodes: Vec<VisualNode> = snapshot
        .areas
        .iter()
        .map(|area| area_node(area, counts.get(&area.id).copied().unwrap_or(0)))
        .collect();

    debug!(
        "event=build_area_graph module=graph status=ok nodes={}",
        nodes.len()
    );
    GraphProjection {
        nodes,
        edges: Vec::new(),
    }
}

/// Hierarchy-aware contents layer.
///
/// Same population as [`build_flat_graph`], annotated with depth, level name
/// and resolved style; contents at depth `>= max_levels` are dropped.
pub fn build_hierarchy_graph(
    snapshot: &WorkspaceSnapshot,
    area_filter: Option<AreaId>,
    max_levels: usize,
    options: HierarchyOptions,
) -> GraphProjection {
    let max_levels = clamp_max_levels(max_levels);
    let index = LinkIndex::build(&snapshot.contents, &snapshot.links);
    let hierarchy = HierarchyMap::build(&snapshot.contents, &index);
    let styles = StyleResolver::new(&snapshot.contents, &index, max_levels);

    let mut beyond_cap = 0usize;
    let candidates = visible_contents(snapshot, area_filter).filter_map(|content| {
        match hierarchy.level_depth(content.id, max_levels) {
            Some(depth) => Some((content, depth)),
            None => {
                beyond_cap += 1;
                None
            }
        }
    });
    let candidates: Vec<(&Content, usize)> = candidates.collect();

    let projection = assemble_hierarchy(
        snapshot,
        &index,
        &hierarchy,
        &styles,
        candidates,
        None,
        options,
    );
    debug!(
        "event=build_hierarchy_graph module=graph status=ok max_levels={} nodes={} edges={} beyond_cap={}",
        max_levels,
        projection.nodes.len(),
        projection.edges.len(),
        beyond_cap
    );
    projection
}

/// Children layer: `parent_id` and its descendants.
///
/// Depth is counted from `parent_id`; `None` or an unknown parent yields an
/// empty projection.
pub fn build_children_graph(
    snapshot: &WorkspaceSnapshot,
    parent_id: Option<ContentId>,
    max_levels: usize,
    options: HierarchyOptions,
) -> GraphProjection {
    let Some(parent_id) = parent_id else {
        return GraphProjection::empty();
    };
    if snapshot.content(parent_id).is_none() {
        debug!("event=build_children_graph module=graph status=skipped reason=unknown_parent parent_id={parent_id}");
        return GraphProjection::empty();
    }

    let max_levels = clamp_max_levels(max_levels);
    let index = LinkIndex::build(&snapshot.contents, &snapshot.links);
    let hierarchy = HierarchyMap::build(&snapshot.contents, &index);
    let styles =
        StyleResolver::new(&snapshot.contents, &index, max_levels).with_boundary(parent_id);

    let known_areas = area_ids(snapshot);
    let by_id: HashMap<ContentId, &Content> = snapshot
        .contents
        .iter()
        .map(|content| (content.id, content))
        .collect();
    let candidates: Vec<(&Content, usize)> = descendants_within(&index, parent_id, max_levels)
        .into_iter()
        .filter_map(|(id, depth)| by_id.get(&id).map(|content| (*content, depth)))
        .filter(|(content, _)| is_renderable(content, &known_areas))
        .collect();

    // The chosen parent's own parent link is outside the subtree, even when
    // a loop brings that parent back in as a descendant.
    let projection = assemble_hierarchy(
        snapshot,
        &index,
        &hierarchy,
        &styles,
        candidates,
        Some(parent_id),
        options,
    );
    debug!(
        "event=build_children_graph module=graph status=ok parent_id={} max_levels={} nodes={} edges={}",
        parent_id,
        max_levels,
        projection.nodes.len(),
        projection.edges.len()
    );
    projection
}

fn assemble_hierarchy(
    snapshot: &WorkspaceSnapshot,
    index: &LinkIndex<'_>,
    hierarchy: &HierarchyMap,
    styles: &StyleResolver<'_, '_>,
    candidates: Vec<(&Content, usize)>,
    subtree_root: Option<ContentId>,
    options: HierarchyOptions,
) -> GraphProjection {
    let configs = snapshot.level_configs();
    let mut nodes = Vec::with_capacity(candidates.len());
    let mut kept_ids = Vec::with_capacity(candidates.len());

    for (content, depth) in candidates {
        let level = match effective_level_config(&configs, depth, content.area_id) {
            LevelResolution::Level(level) => level,
            LevelResolution::Excluded => continue,
        };
        let style = styles.resolve(content, &level.color);

        let mut node = VisualNode::new(
            content.id.to_string(),
            NodeType::Content,
            content.title.clone(),
            style.color,
        );
        node.content_id = Some(content.id);
        node.area_id = content.area_id;
        node.emoji = style.emoji;
        node.hierarchy_depth = Some(depth);
        node.level_name = Some(level.name.clone());
        node.is_inherited_style = Some(style.is_inherited_style);
        node.in_cycle = hierarchy.in_cycle(content.id);
        node.position = content.node_position;
        node.label_max_width = content.label_max_width;
        nodes.push(node);
        kept_ids.push(content.id);
    }

    let mut edges = non_hierarchical_edges(index, &nodes);
    if options.show_parent_edges {
        let kept: HashSet<ContentId> = kept_ids.iter().copied().collect();
        edges.extend(
            kept_ids
                .iter()
                .filter(|child| Some(**child) != subtree_root)
                .filter_map(|child| index.parent_link(*child))
                .filter(|link| kept.contains(&link.to_content_id))
                .map(link_edge),
        );
    }

    GraphProjection { nodes, edges }
}

fn area_ids(snapshot: &WorkspaceSnapshot) -> HashSet<AreaId> {
    snapshot.areas.iter().map(|area| area.id).collect()
}

fn is_renderable(content: &Content, known_areas: &HashSet<AreaId>) -> bool {
    if !content.is_graph_visible() {
        return false;
    }
    match content.area_id {
        Some(area_id) => known_areas.contains(&area_id),
        None => true,
    }
}

fn visible_contents(
    snapshot: &WorkspaceSnapshot,
    area_filter: Option<AreaId>,
) -> impl Iterator<Item = &Content> {
    let known_areas = area_ids(snapshot);
    snapshot.contents.iter().filter(move |content| {
        if let Some(area_id) = area_filter {
            if content.area_id != Some(area_id) {
                return false;
            }
        }
        is_renderable(content, &known_areas)
    })
}

fn flat_content_node(content: &Content) -> VisualNode {
    let mut node = VisualNode::new(
        content.id.to_string(),
        NodeType::Content,
        content.title.clone(),
        content.own_color().unwrap_or(DEFAULT_CONTENT_COLOR),
    );
    node.content_id = Some(content.id);
    node.area_id = content.area_id;
    node.emoji = content.own_emoji().map(str::to_string);
    node.position = content.node_position;
    node.label_max_width = content.label_max_width;
    node
}

fn area_node(area: &Area, content_count: usize) -> VisualNode {
    let color = area
        .background_color
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(DEFAULT_AREA_COLOR);
    let mut node = VisualNode::new(area.id.to_string(), NodeType::Area, area.name.clone(), color);
    node.area_id = Some(area.id);
    node.emoji = area.emoji.clone();
    node.position = area.node_position;
    node.content_count = Some(content_count);
    node
}

fn non_hierarchical_edges(index: &LinkIndex<'_>, nodes: &[VisualNode]) -> Vec<VisualEdge> {
    let present: HashSet<ContentId> = nodes.iter().filter_map(|node| node.content_id).collect();
    index
        .non_hierarchical()
        .iter()
        .filter(|link| {
            present.contains(&link.from_content_id) && present.contains(&link.to_content_id)
        })
        .map(|link| link_edge(link))
        .collect()
}

/// Edge for one link, with per-kind defaults under the link's own style.
pub(crate) fn link_edge(link: &Link) -> VisualEdge {
    let (default_color, default_line, default_arrow) = match link.link_type {
        LinkType::Manual => (None, LineStyle::Solid, ArrowMode::Forward),
        LinkType::Auto => (Some(AUTO_EDGE_COLOR), LineStyle::Dashed, ArrowMode::Both),
        LinkType::Parent => (Some(PARENT_EDGE_COLOR), LineStyle::Dashed, ArrowMode::Forward),
    };

    VisualEdge {
        id: link.id.to_string(),
        source: link.from_content_id.to_string(),
        target: link.to_content_id.to_string(),
        link_id: link.id,
        link_type: link.link_type,
        color: link
            .style
            .color
            .clone()
            .or_else(|| default_color.map(str::to_string)),
        line_style: Some(link.style.line_style.unwrap_or(default_line)),
        arrow_mode: Some(link.style.arrow_mode.unwrap_or(default_arrow)),
    }
}

#[cfg(test)]
mod tests {
    use super::link_edge;
    use crate::graph::visual::PARENT_EDGE_COLOR;
    use crate::model::link::{ArrowMode, LineStyle, Link, LinkType};
    use uuid::Uuid;

    #[test]
    fn manual_edge_defaults_to_solid() {
        let link = Link::new(Uuid::new_v4(), Uuid::new_v4(), LinkType::Manual).unwrap();
        let edge = link_edge(&link);
        assert_eq!(edge.line_style, Some(LineStyle::Solid));
        assert_eq!(edge.color, None);
    }

    #[test]
    fn auto_edge_is_dashed_and_keeps_own_color() {
        let mut link = Link::auto(Uuid::new_v4(), Uuid::new_v4(), "project").unwrap();
        link.style.color = Some("#ff0000".to_string());
        let edge = link_edge(&link);
        assert_eq!(edge.line_style, Some(LineStyle::Dashed));
        assert_eq!(edge.color.as_deref(), Some("#ff0000"));
    }

    #[test]
    fn parent_edge_points_at_parent() {
        let child = Uuid::new_v4();
        let parent = Uuid::new_v4();
        let edge = link_edge(&Link::parent(child, parent).unwrap());
        assert_eq!(edge.source, child.to_string());
        assert_eq!(edge.target, parent.to_string());
        assert_eq!(edge.arrow_mode, Some(ArrowMode::Forward));
        assert_eq!(edge.color.as_deref(), Some(PARENT_EDGE_COLOR));
    }
}
