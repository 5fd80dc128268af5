//! Area domain model.
//!
//! # Responsibility
//! - Define the named grouping that owns an ordered list of contents.
//!
//! # Invariants
//! - `content_ids` keeps the user-visible member order.
//! - A content id appears in at most one area's `content_ids`.

use super::content::ContentId;
use super::{now_epoch_ms, Position};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable area identifier.
pub type AreaId = Uuid;

/// Named grouping of contents, rendered as one node in the area layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
    /// Ordered member contents.
    #[serde(default)]
    pub content_ids: Vec<ContentId>,
    /// Cached position when shown in the area-rollup layer.
    #[serde(default)]
    pub node_position: Option<Position>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Area {
    /// Creates an empty area with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Creates an empty area with a caller-provided id.
    pub fn with_id(id: AreaId, name: impl Into<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            id,
            name: name.into(),
            description: None,
            emoji: None,
            background_color: None,
            content_ids: Vec::new(),
            node_position: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn contains(&self, content_id: ContentId) -> bool {
        self.content_ids.contains(&content_id)
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = now_epoch_ms();
    }
}
