//! Renderer-agnostic node/edge records produced by projections.

use crate::model::area::AreaId;
use crate::model::content::ContentId;
use crate::model::frame::{ShapeAnnotation, TextAnnotation};
use crate::model::link::{ArrowMode, LineStyle, LinkId, LinkType};
use crate::model::Position;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Fill color for content nodes with no own, inherited or level color.
pub const DEFAULT_CONTENT_COLOR: &str = "#94a3b8";
/// Fill color for area nodes without a background color.
pub const DEFAULT_AREA_COLOR: &str = "#e2e8f0";
/// Fill color for frames without a background color.
pub const DEFAULT_FRAME_COLOR: &str = "#f8fafc";
/// Default stroke of automatic (property-derived) edges.
pub const AUTO_EDGE_COLOR: &str = "#94a3b8";
/// Default stroke of parent-child edges.
pub const PARENT_EDGE_COLOR: &str = "#a855f7";

/// What a visual node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Area,
    Content,
    /// Container pseudo-node; never an edge endpoint.
    Frame,
}

impl NodeType {
    pub fn accepts_links(self) -> bool {
        match self {
            Self::Area | Self::Content => true,
            Self::Frame => false,
        }
    }
}

/// Geometry and annotations carried by frame pseudo-nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameNodeData {
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default)]
    pub text_annotations: Vec<TextAnnotation>,
    #[serde(default)]
    pub shape_annotations: Vec<ShapeAnnotation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<ContentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_id: Option<AreaId>,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    pub color: String,
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchy_depth: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_inherited_style: Option<bool>,
    /// Set when the content was cut out of a parent loop.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub in_cycle: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_max_width: Option<f64>,
    /// Member count of area nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<FrameNodeData>,
}

impl VisualNode {
    /// Bare node; builders fill the optional attributes they own.
    pub fn new(
        id: impl Into<String>,
        node_type: NodeType,
        label: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content_id: None,
            area_id: None,
            label: label.into(),
            emoji: None,
            color: color.into(),
            node_type,
            hierarchy_depth: None,
            level_name: None,
            is_inherited_style: None,
            in_cycle: false,
            position: None,
            label_max_width: None,
            content_count: None,
            frame: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub link_id: LinkId,
    pub link_type: LinkType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_style: Option<LineStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrow_mode: Option<ArrowMode>,
}

/// Node and edge lists for one layer and filter state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphProjection {
    pub nodes: Vec<VisualNode>,
    pub edges: Vec<VisualEdge>,
}

impl GraphProjection {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&VisualNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Keeps nodes matching `keep` and drops edges that lost an endpoint.
    pub fn retain_nodes(&mut self, mut keep: impl FnMut(&VisualNode) -> bool) {
        self.nodes.retain(|node| keep(node));
        let linkable: HashSet<&str> = self
            .nodes
            .iter()
            .filter(|node| node.node_type.accepts_links())
            .map(|node| node.id.as_str())
            .collect();
        self.edges.retain(|edge| {
            linkable.contains(edge.source.as_str()) && linkable.contains(edge.target.as_str())
        });
    }
}
