//! Link resolver: classifies links and builds parent/child adjacency.
//!
//! # Invariants
//! - Parent links are read as `from = child`, `to = parent`.
//! - The first parent link for a child wins; later ones are ignored.
//! - Self links and links to unknown contents are dropped, not reported as
//!   errors.

use crate::model::content::{Content, ContentId};
use crate::model::link::{Link, LinkType};
use log::warn;
use std::collections::{HashMap, HashSet};

/// Counters for links the resolver had to drop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkAnomalies {
    pub self_links: usize,
    pub dangling: usize,
    pub duplicate_parents: usize,
}

impl LinkAnomalies {
    pub fn is_clean(&self) -> bool {
        self.self_links == 0 && self.dangling == 0 && self.duplicate_parents == 0
    }
}

/// Adjacency lookups derived from a flat link list.
#[derive(Debug, Default)]
pub struct LinkIndex<'a> {
    parent_links: HashMap<ContentId, &'a Link>,
    children_of: HashMap<ContentId, Vec<ContentId>>,
    non_hierarchical: Vec<&'a Link>,
    anomalies: LinkAnomalies,
}

impl<'a> LinkIndex<'a> {
    /// Builds the index in one pass over `links`.
    pub fn build(contents: &[Content], links: &'a [Link]) -> Self {
        let known: HashSet<ContentId> = contents.iter().map(|content| content.id).collect();
        let mut index = Self::default();

        for link in links {
            if link.is_self_link() {
                index.anomalies.self_links += 1;
                continue;
            }
            if !known.contains(&link.from_content_id) || !known.contains(&link.to_content_id) {
                index.anomalies.dangling += 1;
                continue;
            }

            match link.link_type {
                LinkType::Manual | LinkType::Auto => index.non_hierarchical.push(link),
                LinkType::Parent => {
                    let child = link.from_content_id;
                    if index.parent_links.contains_key(&child) {
                        index.anomalies.duplicate_parents += 1;
                        continue;
                    }
                    index.parent_links.insert(child, link);
                    index
                        .children_of
                        .entry(link.to_content_id)
                        .or_default()
                        .push(child);
                }
            }
        }

        if !index.anomalies.is_clean() {
            warn!(
                "event=link_index module=graph status=degraded self_links={} dangling={} duplicate_parents={}",
                index.anomalies.self_links,
                index.anomalies.dangling,
                index.anomalies.duplicate_parents
            );
        }
        index
    }

    /// Parent of `child`, if it has a (kept) parent link.
    pub fn parent_of(&self, child: ContentId) -> Option<ContentId> {
        self.parent_links
            .get(&child)
            .map(|link| link.to_content_id)
    }

    /// The parent link kept for `child`.
    pub fn parent_link(&self, child: ContentId) -> Option<&'a Link> {
        self.parent_links.get(&child).copied()
    }

    /// Direct children of `parent` in link order.
    pub fn children_of(&self, parent: ContentId) -> &[ContentId] {
        self.children_of
            .get(&parent)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Manual and auto links in input order.
    pub fn non_hierarchical(&self) -> &[&'a Link] {
        &self.non_hierarchical
    }

    pub fn anomalies(&self) -> LinkAnomalies {
        self.anomalies
    }
}

#[cfg(test)]
mod tests {
    use super::LinkIndex;
    use crate::model::content::Content;
    use crate::model::link::{Link, LinkType};

    fn contents(count: usize) -> Vec<Content> {
        (0..count)
            .map(|index| Content::new(None, format!("c{index}")))
            .collect()
    }

    #[test]
    fn duplicate_parent_links_keep_first() {
        let items = contents(3);
        let links = vec![
            Link::parent(items[0].id, items[1].id).unwrap(),
            Link::parent(items[0].id, items[2].id).unwrap(),
        ];

        let index = LinkIndex::build(&items, &links);
        assert_eq!(index.parent_of(items[0].id), Some(items[1].id));
        assert_eq!(index.children_of(items[1].id), &[items[0].id]);
        assert!(index.children_of(items[2].id).is_empty());
        assert_eq!(index.anomalies().duplicate_parents, 1);
    }

    #[test]
    fn self_and_dangling_links_are_dropped() {
        let items = contents(2);
        let mut self_link = Link::new(items[0].id, items[1].id, LinkType::Manual).unwrap();
        self_link.to_content_id = items[0].id;
        let dangling = Link::new(items[0].id, uuid::Uuid::new_v4(), LinkType::Manual).unwrap();
        let kept = Link::new(items[1].id, items[0].id, LinkType::Auto).unwrap();
        let links = vec![self_link, dangling, kept.clone()];

        let index = LinkIndex::build(&items, &links);
        assert_eq!(index.non_hierarchical().len(), 1);
        assert_eq!(index.non_hierarchical()[0].id, kept.id);
        assert_eq!(index.anomalies().self_links, 1);
        assert_eq!(index.anomalies().dangling, 1);
    }

    #[test]
    fn parent_links_are_not_listed_as_non_hierarchical() {
        let items = contents(2);
        let links = vec![Link::parent(items[1].id, items[0].id).unwrap()];
        let index = LinkIndex::build(&items, &links);
        assert!(index.non_hierarchical().is_empty());
        assert!(index.anomalies().is_clean());
    }
}
