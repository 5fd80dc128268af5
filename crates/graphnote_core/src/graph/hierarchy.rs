//! Hierarchy walker: depths, cycle detection and level resolution.
//!
//! # Responsibility
//! - Compute the depth of every content from its nearest parentless
//!   ancestor.
//! - Break parent cycles: nodes on a loop become depth-0 synthetic roots and
//!   are flagged `in_cycle`.
//! - Resolve the effective `HierarchyLevelConfig` for a depth and area.
//!
//! # Invariants
//! - Walks are bounded by a visited set, never by recursion.
//! - `depth(child) == depth(parent) + 1` unless the child sits on a loop.
//! - Building the map is O(V + E): each content is walked once.

use super::links::LinkIndex;
use crate::model::area::AreaId;
use crate::model::content::{Content, ContentId};
use crate::model::hierarchy::{HierarchyLevelConfig, MAX_HIERARCHY_LEVELS};
use log::warn;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet, VecDeque};

/// Depth of one content and whether it was cut out of a parent loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthInfo {
    pub depth: usize,
    pub in_cycle: bool,
}

/// Memoized depths for every content of a snapshot.
#[derive(Debug, Clone, Default)]
pub struct HierarchyMap {
    depths: HashMap<ContentId, DepthInfo>,
    cycle_members: Vec<ContentId>,
}

enum WalkEnd {
    /// Last node on the path has no parent.
    Root,
    /// Last node's parent already has a known depth.
    Known(usize),
    /// Path revisited the node at this path index.
    Loop(usize),
}

impl HierarchyMap {
    /// Computes depths for `contents` using parent links from `index`.
    pub fn build(contents: &[Content], index: &LinkIndex<'_>) -> Self {
        let mut map = Self::default();

        for content in contents {
            if map.depths.contains_key(&content.id) {
                continue;
            }

            let mut path: Vec<ContentId> = Vec::new();
            let mut on_path: HashMap<ContentId, usize> = HashMap::new();
            let mut cursor = content.id;
            let end = loop {
                if let Some(info) = map.depths.get(&cursor) {
                    break WalkEnd::Known(info.depth);
                }
                if let Some(&at) = on_path.get(&cursor) {
                    break WalkEnd::Loop(at);
                }
                on_path.insert(cursor, path.len());
                path.push(cursor);
                match index.parent_of(cursor) {
                    Some(parent) => cursor = parent,
                    None => break WalkEnd::Root,
                }
            };

            let len = path.len();
            match end {
                WalkEnd::Root => {
                    for (position, id) in path.into_iter().enumerate() {
                        map.insert(id, len - 1 - position, false);
                    }
                }
                WalkEnd::Known(base) => {
                    for (position, id) in path.into_iter().enumerate() {
                        map.insert(id, base + len - position, false);
                    }
                }
                WalkEnd::Loop(at) => {
                    warn!(
                        "event=hierarchy_cycle module=graph status=degraded cycle_len={} entry={}",
                        len - at,
                        path[at]
                    );
                    for (position, id) in path.into_iter().enumerate() {
                        if position >= at {
                            map.cycle_members.push(id);
                            map.insert(id, 0, true);
                        } else {
                            map.insert(id, at - position, false);
                        }
                    }
                }
            }
        }

        map
    }

    fn insert(&mut self, id: ContentId, depth: usize, in_cycle: bool) {
        self.depths.insert(id, DepthInfo { depth, in_cycle });
    }

    pub fn info(&self, id: ContentId) -> Option<DepthInfo> {
        self.depths.get(&id).copied()
    }

    /// Uncapped depth of `id`.
    pub fn depth(&self, id: ContentId) -> Option<usize> {
        self.info(id).map(|info| info.depth)
    }

    /// Depth of `id` if it fits under `max_levels`, else `None`.
    pub fn level_depth(&self, id: ContentId, max_levels: usize) -> Option<usize> {
        self.depth(id).filter(|depth| *depth < max_levels)
    }

    pub fn in_cycle(&self, id: ContentId) -> bool {
        self.info(id).is_some_and(|info| info.in_cycle)
    }

    /// Contents that sat on a parent loop, in discovery order.
    pub fn cycle_members(&self) -> &[ContentId] {
        &self.cycle_members
    }
}

/// Clamps a requested level count to `1..=MAX_HIERARCHY_LEVELS`.
pub fn clamp_max_levels(requested: usize) -> usize {
    requested.clamp(1, MAX_HIERARCHY_LEVELS)
}

/// `root` and its descendants with depths counted from `root`.
///
/// Breadth-first in link order; descendants at depth `>= max_levels` are
/// left out, and a visited set stops loops.
pub fn descendants_within(
    index: &LinkIndex<'_>,
    root: ContentId,
    max_levels: usize,
) -> Vec<(ContentId, usize)> {
    let mut ordered = Vec::new();
    if max_levels == 0 {
        return ordered;
    }

    let mut visited = HashSet::from([root]);
    let mut queue = VecDeque::from([(root, 0usize)]);
    while let Some((current, depth)) = queue.pop_front() {
        ordered.push((current, depth));
        if depth + 1 >= max_levels {
            continue;
        }
        for child in index.children_of(current) {
            if visited.insert(*child) {
                queue.push_back((*child, depth + 1));
            }
        }
    }
    ordered
}

/// Outcome of resolving a level config for one content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelResolution<'a> {
    /// The content is shown with this level's name and color.
    Level(Cow<'a, HierarchyLevelConfig>),
    /// The level is scoped to other areas; the content is hidden.
    Excluded,
}

/// Resolves the level config for `depth` and the content's `area_id`.
///
/// A depth with no configured row falls back to `"Level N"` with the
/// palette color for that depth.
pub fn effective_level_config(
    configs: &[HierarchyLevelConfig],
    depth: usize,
    area_id: Option<AreaId>,
) -> LevelResolution<'_> {
    match configs.iter().find(|config| config.depth == depth) {
        Some(config) if config.applies_to(area_id) => LevelResolution::Level(Cow::Borrowed(config)),
        Some(_) => LevelResolution::Excluded,
        None => LevelResolution::Level(Cow::Owned(HierarchyLevelConfig::fallback(depth))),
    }
}
