//! Hierarchy level configuration.
//!
//! # Responsibility
//! - Define per-depth display name, color and area scope.
//! - Provide the built-in eight-level table and per-depth fallbacks.
//!
//! # Invariants
//! - `depth < MAX_HIERARCHY_LEVELS`.
//! - `area_ids` is consulted only when `area_scope == AreaScope::Specific`.

use super::area::AreaId;
use super::{normalize_color, normalize_name, ModelValidationError};
use serde::{Deserialize, Serialize};

/// Hard cap on hierarchy depth levels.
pub const MAX_HIERARCHY_LEVELS: usize = 8;

/// Deterministic per-depth palette used by the default table and fallbacks.
pub const LEVEL_PALETTE: [&str; MAX_HIERARCHY_LEVELS] = [
    "#6366f1", "#0ea5e9", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#ec4899", "#64748b",
];

/// Which areas a level applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaScope {
    #[default]
    All,
    Specific,
}

/// Visual and scope configuration of one hierarchy depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyLevelConfig {
    pub depth: usize,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub area_scope: AreaScope,
    #[serde(default)]
    pub area_ids: Vec<AreaId>,
}

impl HierarchyLevelConfig {
    /// Fallback entry for a depth with no configured row.
    pub fn fallback(depth: usize) -> Self {
        Self {
            depth,
            name: format!("Level {}", depth + 1),
            color: palette_color(depth).to_string(),
            area_scope: AreaScope::All,
            area_ids: Vec::new(),
        }
    }

    /// Built-in table covering every supported depth.
    pub fn default_table() -> Vec<Self> {
        (0..MAX_HIERARCHY_LEVELS).map(Self::fallback).collect()
    }

    /// Whether contents of `area_id` are covered by this level.
    ///
    /// Contents without an area are covered only by `AreaScope::All`.
    pub fn applies_to(&self, area_id: Option<AreaId>) -> bool {
        match self.area_scope {
            AreaScope::All => true,
            AreaScope::Specific => area_id.is_some_and(|id| self.area_ids.contains(&id)),
        }
    }

    /// Validates and normalizes a user-edited level row.
    pub fn normalized(mut self) -> Result<Self, ModelValidationError> {
        if self.depth >= MAX_HIERARCHY_LEVELS {
            return Err(ModelValidationError::DepthOutOfRange(self.depth));
        }
        self.name = normalize_name(&self.name)?;
        self.color = normalize_color(&self.color)?;
        let mut seen = Vec::with_capacity(self.area_ids.len());
        self.area_ids.retain(|id| {
            if seen.contains(id) {
                false
            } else {
                seen.push(*id);
                true
            }
        });
        Ok(self)
    }
}

/// Palette color for a depth, wrapping past the table size.
pub fn palette_color(depth: usize) -> &'static str {
    LEVEL_PALETTE[depth % LEVEL_PALETTE.len()]
}
