//! Content (note card) domain model.
//!
//! # Responsibility
//! - Define the note record that becomes a content node once closed.
//! - Own tag normalization shared by write paths and the tag filter.
//!
//! # Invariants
//! - A content belongs to at most one area (`area_id`).
//! - Tags are stored lowercase, trimmed and deduplicated.
//! - Only `ContentStatus::Closed` contents are rendered as graph nodes.

use super::area::AreaId;
use super::{now_epoch_ms, Position};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Stable content identifier.
pub type ContentId = Uuid;

/// Editing state of a content card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    /// Being edited on the canvas; hidden from the graph.
    Open,
    /// Appears as a graph node.
    #[default]
    Closed,
}

/// Value kind of a typed property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    #[default]
    Text,
    Number,
    Date,
    Select,
    Checkbox,
    Url,
}

/// Typed key/value attached to a content.
///
/// `id` names the property definition; two contents holding the same `id`
/// with equal values are candidates for an automatic link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: PropertyKind,
    #[serde(default)]
    pub value: String,
}

impl Property {
    pub fn new(id: impl Into<String>, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: PropertyKind::Text,
            value: value.into(),
        }
    }

    /// Value used for equality when deriving automatic links.
    ///
    /// Returns `None` for blank values, which never produce links.
    pub fn link_key(&self) -> Option<String> {
        let trimmed = self.value.trim();
        if trimmed.is_empty() {
            return None;
        }
        match self.kind {
            PropertyKind::Text | PropertyKind::Select | PropertyKind::Url => {
                Some(trimmed.to_lowercase())
            }
            PropertyKind::Number | PropertyKind::Date | PropertyKind::Checkbox => {
                Some(trimmed.to_string())
            }
        }
    }
}

/// Single note/card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub id: ContentId,
    #[serde(default)]
    pub area_id: Option<AreaId>,
    pub title: String,
    #[serde(default)]
    pub status: ContentStatus,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub node_color: Option<String>,
    #[serde(default)]
    pub node_position: Option<Position>,
    #[serde(default)]
    pub label_max_width: Option<f64>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Content {
    /// Creates a closed content with a generated id.
    pub fn new(area_id: Option<AreaId>, title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), area_id, title)
    }

    /// Creates a closed content with a caller-provided id.
    pub fn with_id(id: ContentId, area_id: Option<AreaId>, title: impl Into<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            id,
            area_id,
            title: title.into(),
            status: ContentStatus::Closed,
            properties: Vec::new(),
            emoji: None,
            node_color: None,
            node_position: None,
            label_max_width: None,
            tags: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the content is rendered as a graph node.
    pub fn is_graph_visible(&self) -> bool {
        self.status == ContentStatus::Closed
    }

    /// Returns own emoji when set and non-blank.
    pub fn own_emoji(&self) -> Option<&str> {
        non_blank(self.emoji.as_deref())
    }

    /// Returns own node color when set and non-blank.
    pub fn own_color(&self) -> Option<&str> {
        non_blank(self.node_color.as_deref())
    }

    /// Whether the content carries every tag in `required` (already normalized).
    ///
    /// Stored tags are normalized before comparing; imported snapshots may
    /// carry them verbatim.
    pub fn has_all_tags<'a>(&self, required: impl IntoIterator<Item = &'a String>) -> bool {
        let own: BTreeSet<String> = self
            .tags
            .iter()
            .filter_map(|tag| normalize_tag(tag))
            .collect();
        required.into_iter().all(|tag| own.contains(tag))
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = now_epoch_ms();
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

/// Normalizes one tag value: trimmed, lowercase, `None` when blank.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes and deduplicates tag values, dropping blanks.
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> BTreeSet<String> {
    tags.iter()
        .filter_map(|tag| normalize_tag(tag.as_ref()))
        .collect()
}
