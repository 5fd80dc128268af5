//! Query entry point: layer dispatch plus post-processing.

use super::filter::{apply_tag_filter, inject_frames, FrameScope};
use super::hierarchy::clamp_max_levels;
use super::projection::{
    build_area_graph, build_children_graph, build_flat_graph, build_hierarchy_graph,
    HierarchyOptions,
};
use super::visual::GraphProjection;
use crate::model::area::AreaId;
use crate::model::content::ContentId;
use crate::model::frame::LayerMode;
use crate::model::hierarchy::MAX_HIERARCHY_LEVELS;
use crate::model::snapshot::WorkspaceSnapshot;
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// View state the presentation layer asks a projection for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionQuery {
    pub layer: LayerMode,
    /// Area scope of the contents/children layers.
    pub area_id: Option<AreaId>,
    /// Clamped to `1..=MAX_HIERARCHY_LEVELS` when used.
    pub max_hierarchy_levels: usize,
    pub children_parent_id: Option<ContentId>,
    pub selected_tags: Vec<String>,
    /// Contents layer only: depth-aware nodes with level styling.
    pub hierarchy_enabled: bool,
    pub show_parent_edges: bool,
}

impl Default for ProjectionQuery {
    fn default() -> Self {
        Self {
            layer: LayerMode::Contents,
            area_id: None,
            max_hierarchy_levels: MAX_HIERARCHY_LEVELS,
            children_parent_id: None,
            selected_tags: Vec::new(),
            hierarchy_enabled: false,
            show_parent_edges: true,
        }
    }
}

impl ProjectionQuery {
    pub fn contents(area_id: Option<AreaId>) -> Self {
        Self {
            area_id,
            ..Self::default()
        }
    }

    pub fn hierarchy(area_id: Option<AreaId>, max_hierarchy_levels: usize) -> Self {
        Self {
            area_id,
            max_hierarchy_levels,
            hierarchy_enabled: true,
            ..Self::default()
        }
    }

    pub fn areas() -> Self {
        Self {
            layer: LayerMode::Areas,
            ..Self::default()
        }
    }

    pub fn children(parent_id: Option<ContentId>, max_hierarchy_levels: usize) -> Self {
        Self {
            layer: LayerMode::Children,
            children_parent_id: parent_id,
            max_hierarchy_levels,
            ..Self::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Frame scope matching this view.
    pub fn frame_scope(&self) -> FrameScope {
        match self.layer {
            LayerMode::Areas => FrameScope::new(LayerMode::Areas, None, None),
            LayerMode::Contents => FrameScope::new(LayerMode::Contents, self.area_id, None),
            LayerMode::Children => {
                FrameScope::new(LayerMode::Children, self.area_id, self.children_parent_id)
            }
        }
    }

    fn hierarchy_options(&self) -> HierarchyOptions {
        HierarchyOptions {
            show_parent_edges: self.show_parent_edges,
        }
    }
}

/// Builds the projection for `query` from `snapshot`.
///
/// Runs the layer's builder, then the tag filter, then frame injection.
/// A children query without a parent yields an empty projection, frames
/// included.
pub fn project(snapshot: &WorkspaceSnapshot, query: &ProjectionQuery) -> GraphProjection {
    let started_at = Instant::now();
    let max_levels = clamp_max_levels(query.max_hierarchy_levels);

    let base = match query.layer {
        LayerMode::Contents if query.hierarchy_enabled => build_hierarchy_graph(
            snapshot,
            query.area_id,
            max_levels,
            query.hierarchy_options(),
        ),
        LayerMode::Contents => build_flat_graph(snapshot, query.area_id),
        LayerMode::Areas => build_area_graph(snapshot),
        LayerMode::Children => {
            if query.children_parent_id.is_none() {
                debug!("event=project module=graph status=skipped layer=children reason=no_parent");
                return GraphProjection::empty();
            }
            build_children_graph(
                snapshot,
                query.children_parent_id,
                max_levels,
                query.hierarchy_options(),
            )
        }
    };

    let filtered = apply_tag_filter(base, snapshot, query.selected_tags.as_slice());
    let projection = inject_frames(filtered, &snapshot.graph_frames, &query.frame_scope());

    debug!(
        "event=project module=graph status=ok layer={} hierarchy={} tags={} nodes={} edges={} duration_us={}",
        query.layer.as_str(),
        query.hierarchy_enabled,
        query.selected_tags.len(),
        projection.nodes.len(),
        projection.edges.len(),
        started_at.elapsed().as_micros()
    );
    projection
}
