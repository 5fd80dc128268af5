//! Style inheritance: emoji and color flow down the parent chain.

use super::links::LinkIndex;
use crate::model::content::{Content, ContentId};
use std::collections::{HashMap, HashSet};

/// Emoji/color a node is drawn with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStyle {
    pub emoji: Option<String>,
    pub color: String,
    /// `true` when emoji or color came from an ancestor.
    pub is_inherited_style: bool,
}

/// Resolves own-or-inherited styles against one snapshot.
///
/// Emoji and color are inherited independently from the nearest ancestor
/// that sets them. Walks climb at most `max_levels - 1` parents, stop at an
/// optional boundary content, and carry a visited set.
pub struct StyleResolver<'s, 'a> {
    contents: HashMap<ContentId, &'s Content>,
    index: &'s LinkIndex<'a>,
    max_steps: usize,
    boundary: Option<ContentId>,
}

impl<'s, 'a> StyleResolver<'s, 'a> {
    pub fn new(contents: &'s [Content], index: &'s LinkIndex<'a>, max_levels: usize) -> Self {
        Self {
            contents: contents.iter().map(|content| (content.id, content)).collect(),
            index,
            max_steps: max_levels.saturating_sub(1),
            boundary: None,
        }
    }

    /// Stops inheritance walks at `root`: nothing above it is consulted.
    pub fn with_boundary(mut self, root: ContentId) -> Self {
        self.boundary = Some(root);
        self
    }

    /// Style for `content`, falling back to `level_color` and no emoji.
    pub fn resolve(&self, content: &Content, level_color: &str) -> ResolvedStyle {
        let (emoji, emoji_inherited) = match content.own_emoji() {
            Some(emoji) => (Some(emoji), false),
            None => {
                let inherited = self.nearest_ancestor_value(content.id, Content::own_emoji);
                (inherited, inherited.is_some())
            }
        };
        let (color, color_inherited) = match content.own_color() {
            Some(color) => (color, false),
            None => match self.nearest_ancestor_value(content.id, Content::own_color) {
                Some(color) => (color, true),
                None => (level_color, false),
            },
        };

        ResolvedStyle {
            emoji: emoji.map(str::to_string),
            color: color.to_string(),
            is_inherited_style: emoji_inherited || color_inherited,
        }
    }

    fn nearest_ancestor_value(
        &self,
        start: ContentId,
        pick: fn(&Content) -> Option<&str>,
    ) -> Option<&'s str> {
        if self.boundary == Some(start) {
            return None;
        }

        let mut visited = HashSet::from([start]);
        let mut cursor = self.index.parent_of(start);
        let mut steps = 0;
        while let Some(current) = cursor {
            if steps >= self.max_steps || !visited.insert(current) {
                return None;
            }
            steps += 1;

            let ancestor: &'s Content = self.contents.get(&current).copied()?;
            if let Some(value) = pick(ancestor) {
                return Some(value);
            }
            if self.boundary == Some(current) {
                return None;
            }
            cursor = self.index.parent_of(current);
        }
        None
    }
}
