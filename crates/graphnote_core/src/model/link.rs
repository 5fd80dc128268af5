//! Link domain model.
//!
//! # Responsibility
//! - Define directed relations between two contents and their styling.
//!
//! # Invariants
//! - `from_content_id != to_content_id`.
//! - Parent links point from child (`from_content_id`) to parent
//!   (`to_content_id`); a child has at most one parent link.
//! - `property_id` is meaningful only for `LinkType::Auto`.

use super::content::ContentId;
use super::{now_epoch_ms, ModelValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable link identifier.
pub type LinkId = Uuid;

/// Relation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    /// Drawn by the user.
    Manual,
    /// Derived from a shared property.
    Auto,
    /// Child-to-parent hierarchy relation.
    Parent,
}

impl LinkType {
    /// Manual and auto links are shown regardless of hierarchy depth.
    pub fn is_hierarchical(self) -> bool {
        matches!(self, Self::Parent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrowMode {
    /// Arrow head at the target only.
    Forward,
    /// Arrow heads at both ends.
    Both,
}

/// Optional per-link style overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStyle {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub line_style: Option<LineStyle>,
    #[serde(default)]
    pub arrow_mode: Option<ArrowMode>,
}

/// Directed relation between two contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub from_content_id: ContentId,
    pub to_content_id: ContentId,
    /// Serialized as `type` to match the stored workspace shape.
    #[serde(rename = "type")]
    pub link_type: LinkType,
    #[serde(default)]
    pub property_id: Option<String>,
    #[serde(flatten)]
    pub style: LinkStyle,
    pub created_at: i64,
}

impl Link {
    /// Creates a link with a generated id.
    ///
    /// # Errors
    /// - `SelfLink` when both endpoints are the same content.
    pub fn new(
        from_content_id: ContentId,
        to_content_id: ContentId,
        link_type: LinkType,
    ) -> Result<Self, ModelValidationError> {
        let link = Self {
            id: Uuid::new_v4(),
            from_content_id,
            to_content_id,
            link_type,
            property_id: None,
            style: LinkStyle::default(),
            created_at: now_epoch_ms(),
        };
        link.validate()?;
        Ok(link)
    }

    /// Creates a parent link: `child` points at `parent`.
    pub fn parent(child: ContentId, parent: ContentId) -> Result<Self, ModelValidationError> {
        Self::new(child, parent, LinkType::Parent)
    }

    /// Creates an automatic link produced by `property_id`.
    pub fn auto(
        from_content_id: ContentId,
        to_content_id: ContentId,
        property_id: impl Into<String>,
    ) -> Result<Self, ModelValidationError> {
        let mut link = Self::new(from_content_id, to_content_id, LinkType::Auto)?;
        link.property_id = Some(property_id.into());
        Ok(link)
    }

    /// Validates write-path invariants.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.id.is_nil() {
            return Err(ModelValidationError::NilId);
        }
        if self.is_self_link() {
            return Err(ModelValidationError::SelfLink);
        }
        Ok(())
    }

    pub fn is_self_link(&self) -> bool {
        self.from_content_id == self.to_content_id
    }

    /// Whether either endpoint is `content_id`.
    pub fn touches(&self, content_id: ContentId) -> bool {
        self.from_content_id == content_id || self.to_content_id == content_id
    }
}

#[cfg(test)]
mod tests {
    use super::{Link, LinkType};
    use crate::model::ModelValidationError;
    use uuid::Uuid;

    #[test]
    fn self_link_is_rejected() {
        let id = Uuid::new_v4();
        assert_eq!(
            Link::new(id, id, LinkType::Manual).unwrap_err(),
            ModelValidationError::SelfLink
        );
    }

    #[test]
    fn parent_link_points_from_child_to_parent() {
        let child = Uuid::new_v4();
        let parent = Uuid::new_v4();
        let link = Link::parent(child, parent).unwrap();
        assert_eq!(link.from_content_id, child);
        assert_eq!(link.to_content_id, parent);
        assert!(link.link_type.is_hierarchical());
    }
}
