//! Post-processing shared by every layer: tag filtering and frame injection.

use super::visual::{FrameNodeData, GraphProjection, NodeType, VisualNode, DEFAULT_FRAME_COLOR};
use crate::model::area::AreaId;
use crate::model::content::{normalize_tags, Content, ContentId};
use crate::model::frame::{GraphFrame, LayerMode};
use crate::model::snapshot::WorkspaceSnapshot;
use std::collections::HashMap;

/// Keeps content nodes carrying every selected tag.
///
/// Tags compare after normalization. Area and frame nodes always pass, and
/// edges that lost an endpoint are dropped. An empty selection is a no-op.
pub fn apply_tag_filter<S: AsRef<str>>(
    mut projection: GraphProjection,
    snapshot: &WorkspaceSnapshot,
    selected_tags: &[S],
) -> GraphProjection {
    let required = normalize_tags(selected_tags);
    if required.is_empty() {
        return projection;
    }

    let by_id: HashMap<ContentId, &Content> = snapshot
        .contents
        .iter()
        .map(|content| (content.id, content))
        .collect();
    projection.retain_nodes(|node| match node.node_type {
        NodeType::Area | NodeType::Frame => true,
        NodeType::Content => node
            .content_id
            .and_then(|id| by_id.get(&id))
            .is_some_and(|content| content.has_all_tags(&required)),
    });
    projection
}

/// Layer plus scope a frame must have been created in to be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameScope {
    pub layer: LayerMode,
    pub area_id: Option<AreaId>,
    pub children_parent_id: Option<ContentId>,
}

impl FrameScope {
    pub fn new(
        layer: LayerMode,
        area_id: Option<AreaId>,
        children_parent_id: Option<ContentId>,
    ) -> Self {
        Self {
            layer,
            area_id,
            children_parent_id,
        }
    }

    /// Strict isolation: layer and scope must match exactly.
    pub fn admits(&self, frame: &GraphFrame) -> bool {
        if frame.created_in_layer != self.layer {
            return false;
        }
        match self.layer {
            LayerMode::Areas => true,
            LayerMode::Contents => frame.area_id == self.area_id,
            LayerMode::Children => {
                self.children_parent_id.is_some()
                    && frame.children_parent_id == self.children_parent_id
                    && frame.area_id == self.area_id
            }
        }
    }
}

/// Prepends one frame pseudo-node per frame admitted by `scope`.
///
/// Frames come first so renderers draw them beneath other nodes.
pub fn inject_frames(
    mut projection: GraphProjection,
    frames: &[GraphFrame],
    scope: &FrameScope,
) -> GraphProjection {
    let mut nodes: Vec<VisualNode> = frames
        .iter()
        .filter(|frame| scope.admits(frame))
        .map(|frame| frame_node(frame, scope.layer))
        .collect();
    if nodes.is_empty() {
        return projection;
    }

    nodes.append(&mut projection.nodes);
    projection.nodes = nodes;
    projection
}

fn frame_node(frame: &GraphFrame, layer: LayerMode) -> VisualNode {
    let color = frame
        .background_color
        .as_deref()
        .unwrap_or(DEFAULT_FRAME_COLOR);
    let mut node = VisualNode::new(frame.id.to_string(), NodeType::Frame, frame.title.clone(), color);
    node.area_id = frame.area_id;
    node.position = Some(frame.position);
    node.frame = Some(FrameNodeData {
        width: frame.width,
        height: frame.height,
        border_color: frame.border_color.clone(),
        text_annotations: frame
            .text_annotations
            .iter()
            .filter(|annotation| annotation.created_in_layer == layer)
            .cloned()
            .collect(),
        shape_annotations: frame
            .shape_annotations
            .iter()
            .filter(|annotation| annotation.created_in_layer == layer)
            .cloned()
            .collect(),
    });
    node
}

#[cfg(test)]
mod tests {
    use super::FrameScope;
    use crate::model::frame::{GraphFrame, LayerMode};
    use crate::model::Position;
    use uuid::Uuid;

    fn frame(layer: LayerMode) -> GraphFrame {
        GraphFrame::new(layer, "frame", Position::new(0.0, 0.0), 100.0, 80.0)
    }

    #[test]
    fn contents_scope_requires_same_area() {
        let area = Uuid::new_v4();
        let scoped = frame(LayerMode::Contents).in_area(area);
        assert!(FrameScope::new(LayerMode::Contents, Some(area), None).admits(&scoped));
        assert!(!FrameScope::new(LayerMode::Contents, None, None).admits(&scoped));
        assert!(!FrameScope::new(LayerMode::Contents, Some(Uuid::new_v4()), None).admits(&scoped));
    }

    #[test]
    fn children_scope_requires_same_parent() {
        let parent = Uuid::new_v4();
        let scoped = frame(LayerMode::Children).under_parent(parent);
        assert!(FrameScope::new(LayerMode::Children, None, Some(parent)).admits(&scoped));
        assert!(!FrameScope::new(LayerMode::Children, None, Some(Uuid::new_v4())).admits(&scoped));
        assert!(!FrameScope::new(LayerMode::Contents, None, None).admits(&scoped));
        assert!(!FrameScope::new(LayerMode::Areas, None, None).admits(&scoped));
    }
}
