//! Workspace mutation service.
//!
//! # Responsibility
//! - Apply area/content/link/frame/level edits on top of the stored snapshot.
//! - Keep area membership, parent links and auto links consistent.
//! - Hand the current snapshot to the graph engine for projection.
//!
//! # Invariants
//! - Every mutation edits a copy; the copy is persisted before it replaces
//!   the in-memory snapshot, so a failed save leaves state untouched.
//! - A content has at most one parent link and parent chains never loop.
//! - A content id is listed in at most one area's `content_ids`, and only in
//!   the area its `area_id` names.

use crate::graph::query::{project, ProjectionQuery};
use crate::graph::visual::GraphProjection;
use crate::model::area::{Area, AreaId};
use crate::model::content::{normalize_tags, Content, ContentId, ContentStatus, Property};
use crate::model::frame::{FrameId, GraphFrame};
use crate::model::hierarchy::HierarchyLevelConfig;
use crate::model::link::{Link, LinkId, LinkStyle, LinkType};
use crate::model::snapshot::WorkspaceSnapshot;
use crate::model::{normalize_color, normalize_name, ModelValidationError, Position};
use crate::repo::workspace_repo::{RepoError, WorkspaceRepository};
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

const UNTITLED_CONTENT: &str = "Untitled";

/// What happens to member contents when an area is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaDeletePolicy {
    /// Keep contents and detach them from the area.
    Orphan,
    /// Delete member contents together with their links.
    DeleteContents,
}

/// Errors from workspace service operations.
#[derive(Debug)]
pub enum WorkspaceServiceError {
    AreaNotFound(AreaId),
    ContentNotFound(ContentId),
    LinkNotFound(LinkId),
    FrameNotFound(FrameId),
    /// Parent assignment would make the parent chain loop.
    CycleDetected {
        child_id: ContentId,
        parent_id: ContentId,
    },
    /// Input rejected by model validation.
    Validation(ModelValidationError),
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for WorkspaceServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AreaNotFound(id) => write!(f, "area not found: {id}"),
            Self::ContentNotFound(id) => write!(f, "content not found: {id}"),
            Self::LinkNotFound(id) => write!(f, "link not found: {id}"),
            Self::FrameNotFound(id) => write!(f, "frame not found: {id}"),
            Self::CycleDetected {
                child_id,
                parent_id,
            } => write!(
                f,
                "parent link would create cycle: content {child_id} under parent {parent_id}"
            ),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for WorkspaceServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for WorkspaceServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ModelValidationError> for WorkspaceServiceError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type ServiceResult<T> = Result<T, WorkspaceServiceError>;

/// Workspace service facade.
pub struct WorkspaceService<R: WorkspaceRepository> {
    repo: R,
    snapshot: WorkspaceSnapshot,
}

impl<R: WorkspaceRepository> WorkspaceService<R> {
    /// Creates service and loads the stored snapshot.
    pub fn new(repo: R) -> ServiceResult<Self> {
        let snapshot = repo.load_snapshot()?;
        Ok(Self { repo, snapshot })
    }

    /// Current committed snapshot.
    pub fn snapshot(&self) -> &WorkspaceSnapshot {
        &self.snapshot
    }

    /// Projects the current snapshot for one view.
    pub fn project(&self, query: &ProjectionQuery) -> GraphProjection {
        project(&self.snapshot, query)
    }

    /// Replaces the whole workspace, e.g. after an import.
    pub fn replace_snapshot(&mut self, snapshot: WorkspaceSnapshot) -> ServiceResult<()> {
        self.commit(snapshot)
    }

    // Areas

    pub fn create_area(&mut self, name: &str) -> ServiceResult<Area> {
        let name = normalize_name(name)?;
        self.mutate(|snapshot| {
            let area = Area::new(name);
            snapshot.areas.push(area.clone());
            Ok(area)
        })
    }

    pub fn rename_area(&mut self, area_id: AreaId, name: &str) -> ServiceResult<()> {
        let name = normalize_name(name)?;
        self.mutate(|snapshot| {
            let area = area_mut(snapshot, area_id)?;
            area.name = name;
            area.touch();
            Ok(())
        })
    }

    /// Sets area emoji and background color; `None` clears the value.
    pub fn set_area_style(
        &mut self,
        area_id: AreaId,
        emoji: Option<&str>,
        background_color: Option<&str>,
    ) -> ServiceResult<()> {
        let emoji = normalize_emoji(emoji);
        let background_color = background_color.map(normalize_color).transpose()?;
        self.mutate(|snapshot| {
            let area = area_mut(snapshot, area_id)?;
            area.emoji = emoji;
            area.background_color = background_color;
            area.touch();
            Ok(())
        })
    }

    pub fn set_area_position(
        &mut self,
        area_id: AreaId,
        position: Option<Position>,
    ) -> ServiceResult<()> {
        self.mutate(|snapshot| {
            let area = area_mut(snapshot, area_id)?;
            area.node_position = position;
            Ok(())
        })
    }

    /// Deletes an area.
    ///
    /// Frames scoped to the area and the area's entries in level scopes are
    /// removed with it.
    pub fn delete_area(&mut self, area_id: AreaId, policy: AreaDeletePolicy) -> ServiceResult<()> {
        self.mutate(|snapshot| {
            let index = snapshot
                .areas
                .iter()
                .position(|area| area.id == area_id)
                .ok_or(WorkspaceServiceError::AreaNotFound(area_id))?;
            snapshot.areas.remove(index);

            match policy {
                AreaDeletePolicy::Orphan => {
                    for content in snapshot
                        .contents
                        .iter_mut()
                        .filter(|content| content.area_id == Some(area_id))
                    {
                        content.area_id = None;
                        content.touch();
                    }
                }
                AreaDeletePolicy::DeleteContents => {
                    let removed: HashSet<ContentId> = snapshot
                        .contents_in_area(area_id)
                        .map(|content| content.id)
                        .collect();
                    remove_contents(snapshot, &removed);
                }
            }

            snapshot
                .graph_frames
                .retain(|frame| frame.area_id != Some(area_id));
            for level in snapshot.hierarchy_level_configs.iter_mut().flatten() {
                level.area_ids.retain(|id| *id != area_id);
            }
            Ok(())
        })
    }

    // Contents

    /// Creates a closed content, appended to `area_id` when given.
    pub fn create_content(
        &mut self,
        area_id: Option<AreaId>,
        title: &str,
    ) -> ServiceResult<Content> {
        let title = normalize_title(title);
        self.mutate(|snapshot| {
            let content = Content::new(area_id, title);
            if let Some(area_id) = area_id {
                let area = area_mut(snapshot, area_id)?;
                area.content_ids.push(content.id);
                area.touch();
            }
            snapshot.contents.push(content.clone());
            Ok(content)
        })
    }

    pub fn rename_content(&mut self, content_id: ContentId, title: &str) -> ServiceResult<()> {
        let title = normalize_title(title);
        self.mutate(|snapshot| {
            let content = content_mut(snapshot, content_id)?;
            content.title = title;
            content.touch();
            Ok(())
        })
    }

    /// Opens a content for editing or closes it back into the graph.
    pub fn set_content_status(
        &mut self,
        content_id: ContentId,
        status: ContentStatus,
    ) -> ServiceResult<()> {
        self.mutate(|snapshot| {
            let content = content_mut(snapshot, content_id)?;
            content.status = status;
            content.touch();
            Ok(())
        })
    }

    pub fn set_content_style(
        &mut self,
        content_id: ContentId,
        emoji: Option<&str>,
        node_color: Option<&str>,
    ) -> ServiceResult<()> {
        let emoji = normalize_emoji(emoji);
        let node_color = node_color.map(normalize_color).transpose()?;
        self.mutate(|snapshot| {
            let content = content_mut(snapshot, content_id)?;
            content.emoji = emoji;
            content.node_color = node_color;
            content.touch();
            Ok(())
        })
    }

    pub fn set_content_position(
        &mut self,
        content_id: ContentId,
        position: Option<Position>,
    ) -> ServiceResult<()> {
        self.mutate(|snapshot| {
            let content = content_mut(snapshot, content_id)?;
            content.node_position = position;
            Ok(())
        })
    }

    /// Replaces content tags with the normalized set of `tags`.
    pub fn set_content_tags<S: AsRef<str>>(
        &mut self,
        content_id: ContentId,
        tags: &[S],
    ) -> ServiceResult<()> {
        let tags = normalize_tags(tags);
        self.mutate(|snapshot| {
            let content = content_mut(snapshot, content_id)?;
            content.tags = tags;
            content.touch();
            Ok(())
        })
    }

    /// Replaces content properties. Auto links are refreshed by
    /// [`Self::sync_auto_links`].
    pub fn set_content_properties(
        &mut self,
        content_id: ContentId,
        properties: Vec<Property>,
    ) -> ServiceResult<()> {
        self.mutate(|snapshot| {
            let content = content_mut(snapshot, content_id)?;
            content.properties = properties;
            content.touch();
            Ok(())
        })
    }

    /// Moves a content into `target_area` (or out of every area) at
    /// `target_index` of the member list.
    ///
    /// # Contract
    /// - `target_index` past the end appends.
    /// - Moving within the same area reorders.
    pub fn move_content(
        &mut self,
        content_id: ContentId,
        target_area: Option<AreaId>,
        target_index: usize,
    ) -> ServiceResult<()> {
        self.mutate(|snapshot| {
            content_mut(snapshot, content_id)?;
            if let Some(area_id) = target_area {
                area_mut(snapshot, area_id)?;
            }

            for area in snapshot.areas.iter_mut() {
                if area.contains(content_id) {
                    area.content_ids.retain(|id| *id != content_id);
                    area.touch();
                }
            }
            if let Some(area_id) = target_area {
                let area = area_mut(snapshot, area_id)?;
                let index = target_index.min(area.content_ids.len());
                area.content_ids.insert(index, content_id);
                area.touch();
            }

            let content = content_mut(snapshot, content_id)?;
            content.area_id = target_area;
            content.touch();
            Ok(())
        })
    }

    /// Deletes a content, its links, and frames scoped under it.
    pub fn delete_content(&mut self, content_id: ContentId) -> ServiceResult<()> {
        self.mutate(|snapshot| {
            content_mut(snapshot, content_id)?;
            remove_contents(snapshot, &HashSet::from([content_id]));
            Ok(())
        })
    }

    // Links

    pub fn create_manual_link(
        &mut self,
        from_content_id: ContentId,
        to_content_id: ContentId,
        style: LinkStyle,
    ) -> ServiceResult<Link> {
        let style = normalize_link_style(style)?;
        self.mutate(|snapshot| {
            ensure_content(snapshot, from_content_id)?;
            ensure_content(snapshot, to_content_id)?;
            let mut link = Link::new(from_content_id, to_content_id, LinkType::Manual)?;
            link.style = style;
            snapshot.links.push(link.clone());
            Ok(link)
        })
    }

    pub fn update_link_style(&mut self, link_id: LinkId, style: LinkStyle) -> ServiceResult<()> {
        let style = normalize_link_style(style)?;
        self.mutate(|snapshot| {
            let link = snapshot
                .link_mut(link_id)
                .ok_or(WorkspaceServiceError::LinkNotFound(link_id))?;
            link.style = style;
            Ok(())
        })
    }

    pub fn delete_link(&mut self, link_id: LinkId) -> ServiceResult<()> {
        self.mutate(|snapshot| {
            let before = snapshot.links.len();
            snapshot.links.retain(|link| link.id != link_id);
            if snapshot.links.len() == before {
                return Err(WorkspaceServiceError::LinkNotFound(link_id));
            }
            Ok(())
        })
    }

    /// Sets or clears the parent of `child_id`.
    ///
    /// Returns the new parent link, or `None` when the parent was cleared.
    ///
    /// # Errors
    /// - `CycleDetected` when `parent_id` is the child itself or one of its
    ///   descendants.
    pub fn set_parent(
        &mut self,
        child_id: ContentId,
        parent_id: Option<ContentId>,
    ) -> ServiceResult<Option<Link>> {
        self.mutate(|snapshot| {
            ensure_content(snapshot, child_id)?;
            if let Some(parent_id) = parent_id {
                ensure_content(snapshot, parent_id)?;
                if would_create_cycle(snapshot, child_id, parent_id) {
                    return Err(WorkspaceServiceError::CycleDetected {
                        child_id,
                        parent_id,
                    });
                }
            }

            snapshot.links.retain(|link| {
                !(link.link_type == LinkType::Parent && link.from_content_id == child_id)
            });
            let link = parent_id
                .map(|parent_id| Link::parent(child_id, parent_id))
                .transpose()?;
            if let Some(link) = &link {
                snapshot.links.push(link.clone());
            }
            Ok(link)
        })
    }

    /// Regenerates automatic links from shared property values.
    ///
    /// Two contents are linked when they hold the same property id with the
    /// same non-blank value (case-insensitive for text-like kinds). Each pair
    /// gets at most one auto link, and no auto link is added next to an
    /// existing manual or parent link between the same pair.
    ///
    /// Returns the number of auto links after the sync.
    pub fn sync_auto_links(&mut self) -> ServiceResult<usize> {
        self.mutate(|snapshot| {
            snapshot
                .links
                .retain(|link| link.link_type != LinkType::Auto);

            let mut linked_pairs: HashSet<(ContentId, ContentId)> = snapshot
                .links
                .iter()
                .map(|link| unordered_pair(link.from_content_id, link.to_content_id))
                .collect();

            let mut groups: Vec<((&str, String), Vec<ContentId>)> = Vec::new();
            let mut group_index: HashMap<(&str, String), usize> = HashMap::new();
            for content in &snapshot.contents {
                for property in &content.properties {
                    let Some(key) = property.link_key() else {
                        continue;
                    };
                    let group_key = (property.id.as_str(), key);
                    match group_index.get(&group_key) {
                        Some(index) => groups[*index].1.push(content.id),
                        None => {
                            group_index.insert(group_key.clone(), groups.len());
                            groups.push((group_key, vec![content.id]));
                        }
                    }
                }
            }

            let mut created = Vec::new();
            for ((property_id, _), members) in &groups {
                for (position, from) in members.iter().enumerate() {
                    for to in &members[position + 1..] {
                        if from == to || !linked_pairs.insert(unordered_pair(*from, *to)) {
                            continue;
                        }
                        created.push(Link::auto(*from, *to, *property_id)?);
                    }
                }
            }

            let count = created.len();
            snapshot.links.extend(created);
            debug!(
                "event=auto_links_sync module=service status=ok groups={} links={}",
                groups.len(),
                count
            );
            Ok(count)
        })
    }

    // Frames

    /// Adds a frame after checking its scope references.
    pub fn create_frame(&mut self, frame: GraphFrame) -> ServiceResult<GraphFrame> {
        frame.validate()?;
        let frame = normalize_frame_colors(frame)?;
        self.mutate(|snapshot| {
            if let Some(area_id) = frame.area_id {
                ensure_area(snapshot, area_id)?;
            }
            if let Some(parent_id) = frame.children_parent_id {
                ensure_content(snapshot, parent_id)?;
            }
            snapshot.graph_frames.push(frame.clone());
            Ok(frame)
        })
    }

    pub fn update_frame_geometry(
        &mut self,
        frame_id: FrameId,
        position: Position,
        width: f64,
        height: f64,
    ) -> ServiceResult<()> {
        self.mutate(|snapshot| {
            let frame = snapshot
                .frame_mut(frame_id)
                .ok_or(WorkspaceServiceError::FrameNotFound(frame_id))?;
            frame.position = position;
            frame.width = width;
            frame.height = height;
            frame.validate()?;
            frame.touch();
            Ok(())
        })
    }

    pub fn delete_frame(&mut self, frame_id: FrameId) -> ServiceResult<()> {
        self.mutate(|snapshot| {
            let before = snapshot.graph_frames.len();
            snapshot.graph_frames.retain(|frame| frame.id != frame_id);
            if snapshot.graph_frames.len() == before {
                return Err(WorkspaceServiceError::FrameNotFound(frame_id));
            }
            Ok(())
        })
    }

    // Hierarchy levels

    /// Stores one level row, starting from the default table when the
    /// workspace has no customized levels yet.
    pub fn set_level_config(&mut self, config: HierarchyLevelConfig) -> ServiceResult<()> {
        let config = config.normalized()?;
        self.mutate(|snapshot| {
            for area_id in &config.area_ids {
                ensure_area(snapshot, *area_id)?;
            }
            let levels = snapshot
                .hierarchy_level_configs
                .get_or_insert_with(HierarchyLevelConfig::default_table);
            match levels.iter_mut().find(|level| level.depth == config.depth) {
                Some(level) => *level = config,
                None => {
                    levels.push(config);
                    levels.sort_by_key(|level| level.depth);
                }
            }
            Ok(())
        })
    }

    /// Drops customized levels so the default table applies again.
    pub fn reset_level_configs(&mut self) -> ServiceResult<()> {
        self.mutate(|snapshot| {
            snapshot.hierarchy_level_configs = None;
            Ok(())
        })
    }

    fn mutate<T>(
        &mut self,
        apply: impl FnOnce(&mut WorkspaceSnapshot) -> ServiceResult<T>,
    ) -> ServiceResult<T> {
        let mut next = self.snapshot.clone();
        let output = apply(&mut next)?;
        self.commit(next)?;
        Ok(output)
    }

    fn commit(&mut self, next: WorkspaceSnapshot) -> ServiceResult<()> {
        self.repo.save_snapshot(&next)?;
        self.snapshot = next;
        info!(
            "event=workspace_commit module=service status=ok areas={} contents={} links={}",
            self.snapshot.areas.len(),
            self.snapshot.contents.len(),
            self.snapshot.links.len()
        );
        Ok(())
    }
}

fn area_mut(snapshot: &mut WorkspaceSnapshot, area_id: AreaId) -> ServiceResult<&mut Area> {
    snapshot
        .area_mut(area_id)
        .ok_or(WorkspaceServiceError::AreaNotFound(area_id))
}

fn content_mut(
    snapshot: &mut WorkspaceSnapshot,
    content_id: ContentId,
) -> ServiceResult<&mut Content> {
    snapshot
        .content_mut(content_id)
        .ok_or(WorkspaceServiceError::ContentNotFound(content_id))
}

fn ensure_area(snapshot: &WorkspaceSnapshot, area_id: AreaId) -> ServiceResult<()> {
    snapshot
        .area(area_id)
        .map(|_| ())
        .ok_or(WorkspaceServiceError::AreaNotFound(area_id))
}

fn ensure_content(snapshot: &WorkspaceSnapshot, content_id: ContentId) -> ServiceResult<()> {
    snapshot
        .content(content_id)
        .map(|_| ())
        .ok_or(WorkspaceServiceError::ContentNotFound(content_id))
}

fn remove_contents(snapshot: &mut WorkspaceSnapshot, removed: &HashSet<ContentId>) {
    if removed.is_empty() {
        return;
    }
    snapshot
        .contents
        .retain(|content| !removed.contains(&content.id));
    snapshot.links.retain(|link| {
        !removed.contains(&link.from_content_id) && !removed.contains(&link.to_content_id)
    });
    snapshot.graph_frames.retain(|frame| {
        frame
            .children_parent_id
            .map_or(true, |parent_id| !removed.contains(&parent_id))
    });
    for area in snapshot.areas.iter_mut() {
        area.content_ids.retain(|id| !removed.contains(id));
    }
}

/// Walks up from `candidate_parent` through parent links; reaching `child`
/// means the new link would close a loop.
///
/// The first parent link per child wins, matching the projection engine. A
/// loop above `candidate_parent` that never passes through `child` ends the
/// walk without a cycle.
fn would_create_cycle(
    snapshot: &WorkspaceSnapshot,
    child_id: ContentId,
    candidate_parent: ContentId,
) -> bool {
    let mut parents: HashMap<ContentId, ContentId> = HashMap::new();
    for link in snapshot
        .links
        .iter()
        .filter(|link| link.link_type == LinkType::Parent && !link.is_self_link())
    {
        parents
            .entry(link.from_content_id)
            .or_insert(link.to_content_id);
    }

    let mut visited = HashSet::new();
    let mut cursor = Some(candidate_parent);
    while let Some(current) = cursor {
        if current == child_id {
            return true;
        }
        if !visited.insert(current) {
            return false;
        }
        cursor = parents.get(&current).copied();
    }
    false
}

fn unordered_pair(a: ContentId, b: ContentId) -> (ContentId, ContentId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn normalize_title(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        UNTITLED_CONTENT.to_string()
    } else {
        trimmed.to_string()
    }
}

fn normalize_emoji(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn normalize_link_style(style: LinkStyle) -> Result<LinkStyle, ModelValidationError> {
    Ok(LinkStyle {
        color: style.color.as_deref().map(normalize_color).transpose()?,
        ..style
    })
}

fn normalize_frame_colors(mut frame: GraphFrame) -> Result<GraphFrame, ModelValidationError> {
    frame.background_color = frame
        .background_color
        .as_deref()
        .map(normalize_color)
        .transpose()?;
    frame.border_color = frame
        .border_color
        .as_deref()
        .map(normalize_color)
        .transpose()?;
    Ok(frame)
}
