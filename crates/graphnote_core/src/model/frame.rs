//! Graph frame domain model.
//!
//! # Responsibility
//! - Define rectangular annotation regions drawn over a projection.
//!
//! # Invariants
//! - A frame belongs to exactly one layer + scope combination
//!   (`created_in_layer`, `area_id`, `children_parent_id`) and is shown
//!   nowhere else.
//! - `width` and `height` are positive.

use super::area::AreaId;
use super::content::ContentId;
use super::{now_epoch_ms, ModelValidationError, Position};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable frame identifier.
pub type FrameId = Uuid;

/// Projection layer the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerMode {
    /// Flat (optionally hierarchy-aware) contents graph.
    #[default]
    Contents,
    /// One node per area.
    Areas,
    /// Subtree of a chosen parent content.
    Children,
}

impl LayerMode {
    /// Stable lowercase name used in logs and storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contents => "contents",
            Self::Areas => "areas",
            Self::Children => "children",
        }
    }
}

/// Node type a frame groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameLevel {
    Area,
    Content,
}

impl FrameLevel {
    /// Node type grouped by frames drawn in `layer`.
    pub fn for_layer(layer: LayerMode) -> Self {
        match layer {
            LayerMode::Areas => Self::Area,
            LayerMode::Contents | LayerMode::Children => Self::Content,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Line,
    Arrow,
}

/// Free text placed inside a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnnotation {
    pub id: Uuid,
    pub text: String,
    pub position: Position,
    #[serde(default)]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub color: Option<String>,
    pub created_in_layer: LayerMode,
}

/// Simple vector shape placed inside a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeAnnotation {
    pub id: Uuid,
    pub shape: ShapeKind,
    pub position: Position,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub stroke_color: Option<String>,
    #[serde(default)]
    pub fill_color: Option<String>,
    pub created_in_layer: LayerMode,
}

/// Rectangular grouping region bound to one layer and scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphFrame {
    pub id: FrameId,
    pub created_in_layer: LayerMode,
    pub level: FrameLevel,
    #[serde(default)]
    pub area_id: Option<AreaId>,
    #[serde(default)]
    pub children_parent_id: Option<ContentId>,
    pub title: String,
    pub position: Position,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub border_color: Option<String>,
    #[serde(default)]
    pub text_annotations: Vec<TextAnnotation>,
    #[serde(default)]
    pub shape_annotations: Vec<ShapeAnnotation>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl GraphFrame {
    /// Creates a frame scoped to `layer` with no area or parent scope.
    pub fn new(
        layer: LayerMode,
        title: impl Into<String>,
        position: Position,
        width: f64,
        height: f64,
    ) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            created_in_layer: layer,
            level: FrameLevel::for_layer(layer),
            area_id: None,
            children_parent_id: None,
            title: title.into(),
            position,
            width,
            height,
            background_color: None,
            border_color: None,
            text_annotations: Vec::new(),
            shape_annotations: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Narrows the frame to an area scope.
    pub fn in_area(mut self, area_id: AreaId) -> Self {
        self.area_id = Some(area_id);
        self
    }

    /// Narrows the frame to a children-layer parent scope.
    pub fn under_parent(mut self, parent_id: ContentId) -> Self {
        self.children_parent_id = Some(parent_id);
        self
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.id.is_nil() {
            return Err(ModelValidationError::NilId);
        }
        if !is_positive(self.width) || !is_positive(self.height) {
            return Err(ModelValidationError::InvalidFrameSize);
        }
        Ok(())
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = now_epoch_ms();
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
