//! Workspace snapshot: the full in-memory state the graph engine reads.
//!
//! # Invariants
//! - Vectors keep user-visible order; projections follow this order.
//! - `hierarchy_level_configs == None` means the built-in table applies.

use super::area::{Area, AreaId};
use super::content::{Content, ContentId};
use super::frame::{FrameId, GraphFrame};
use super::hierarchy::HierarchyLevelConfig;
use super::link::{Link, LinkId};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    #[serde(default)]
    pub areas: Vec<Area>,
    #[serde(default)]
    pub contents: Vec<Content>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub graph_frames: Vec<GraphFrame>,
    #[serde(default)]
    pub hierarchy_level_configs: Option<Vec<HierarchyLevelConfig>>,
}

impl WorkspaceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn area(&self, id: AreaId) -> Option<&Area> {
        self.areas.iter().find(|area| area.id == id)
    }

    pub fn area_mut(&mut self, id: AreaId) -> Option<&mut Area> {
        self.areas.iter_mut().find(|area| area.id == id)
    }

    pub fn content(&self, id: ContentId) -> Option<&Content> {
        self.contents.iter().find(|content| content.id == id)
    }

    pub fn content_mut(&mut self, id: ContentId) -> Option<&mut Content> {
        self.contents.iter_mut().find(|content| content.id == id)
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.iter().find(|link| link.id == id)
    }

    pub fn link_mut(&mut self, id: LinkId) -> Option<&mut Link> {
        self.links.iter_mut().find(|link| link.id == id)
    }

    pub fn frame_mut(&mut self, id: FrameId) -> Option<&mut GraphFrame> {
        self.graph_frames.iter_mut().find(|frame| frame.id == id)
    }

    /// Effective level table: configured rows or the built-in default.
    pub fn level_configs(&self) -> Cow<'_, [HierarchyLevelConfig]> {
        match self.hierarchy_level_configs.as_deref() {
            Some(configs) => Cow::Borrowed(configs),
            None => Cow::Owned(HierarchyLevelConfig::default_table()),
        }
    }

    /// Contents whose `area_id` is `area_id`, in snapshot order.
    pub fn contents_in_area(&self, area_id: AreaId) -> impl Iterator<Item = &Content> {
        self.contents
            .iter()
            .filter(move |content| content.area_id == Some(area_id))
    }
}
