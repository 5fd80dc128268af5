//! Workspace snapshot repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist and reload the full workspace snapshot (areas, contents, tags,
//!   links, frames, hierarchy levels).
//! - Keep SQL details and row ordering inside the repository boundary.
//!
//! # Invariants
//! - `save_snapshot` replaces all stored rows in one immediate transaction.
//! - Load order equals save order (`sort_order ASC`).
//! - Nested values (member lists, properties, annotations, level area ids)
//!   are stored as JSON text.
//! - No stored level rows means the built-in level table applies.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::area::Area;
use crate::model::content::{Content, ContentStatus};
use crate::model::frame::{FrameLevel, GraphFrame, LayerMode};
use crate::model::hierarchy::{AreaScope, HierarchyLevelConfig, MAX_HIERARCHY_LEVELS};
use crate::model::link::{ArrowMode, LineStyle, Link, LinkStyle, LinkType};
use crate::model::snapshot::WorkspaceSnapshot;
use crate::model::{ModelValidationError, Position};
use log::{error, info};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from workspace repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Snapshot rejected by model validation before writing.
    Validation(ModelValidationError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "workspace repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "workspace repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid workspace data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Storage contract for workspace snapshots.
pub trait WorkspaceRepository {
    /// Loads the full stored snapshot; an empty store yields an empty one.
    fn load_snapshot(&self) -> RepoResult<WorkspaceSnapshot>;
    /// Replaces the stored snapshot with `snapshot`.
    fn save_snapshot(&self, snapshot: &WorkspaceSnapshot) -> RepoResult<()>;
}

/// SQLite-backed workspace repository.
pub struct SqliteWorkspaceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWorkspaceRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_workspace_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl WorkspaceRepository for SqliteWorkspaceRepository<'_> {
    fn load_snapshot(&self) -> RepoResult<WorkspaceSnapshot> {
        let started_at = Instant::now();
        let levels = load_levels(self.conn)?;
        let snapshot = WorkspaceSnapshot {
            areas: load_areas(self.conn)?,
            contents: load_contents(self.conn)?,
            links: load_links(self.conn)?,
            graph_frames: load_frames(self.conn)?,
            hierarchy_level_configs: if levels.is_empty() { None } else { Some(levels) },
        };

        info!(
            "event=workspace_load module=repo status=ok areas={} contents={} links={} frames={} duration_ms={}",
            snapshot.areas.len(),
            snapshot.contents.len(),
            snapshot.links.len(),
            snapshot.graph_frames.len(),
            started_at.elapsed().as_millis()
        );
        Ok(snapshot)
    }

    fn save_snapshot(&self, snapshot: &WorkspaceSnapshot) -> RepoResult<()> {
        let started_at = Instant::now();
        validate_snapshot(snapshot)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        match write_snapshot(&tx, snapshot) {
            Ok(()) => {
                tx.commit()?;
                info!(
                    "event=workspace_save module=repo status=ok areas={} contents={} links={} frames={} duration_ms={}",
                    snapshot.areas.len(),
                    snapshot.contents.len(),
                    snapshot.links.len(),
                    snapshot.graph_frames.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=workspace_save module=repo status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn validate_snapshot(snapshot: &WorkspaceSnapshot) -> RepoResult<()> {
    for link in &snapshot.links {
        link.validate()?;
    }
    for frame in &snapshot.graph_frames {
        frame.validate()?;
    }
    for level in snapshot.hierarchy_level_configs.iter().flatten() {
        if level.depth >= MAX_HIERARCHY_LEVELS {
            return Err(ModelValidationError::DepthOutOfRange(level.depth).into());
        }
    }
    Ok(())
}

fn write_snapshot(tx: &Transaction<'_>, snapshot: &WorkspaceSnapshot) -> RepoResult<()> {
    tx.execute_batch(
        "DELETE FROM content_tags;
         DELETE FROM links;
         DELETE FROM contents;
         DELETE FROM areas;
         DELETE FROM graph_frames;
         DELETE FROM hierarchy_levels;",
    )?;

    for (index, area) in snapshot.areas.iter().enumerate() {
        let (node_x, node_y) = split_position(area.node_position);
        tx.execute(
            "INSERT INTO areas (
                id, name, description, emoji, background_color, content_ids,
                node_x, node_y, sort_order, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                area.id.to_string(),
                area.name.as_str(),
                area.description.as_deref(),
                area.emoji.as_deref(),
                area.background_color.as_deref(),
                to_json(&area.content_ids, "areas.content_ids")?,
                node_x,
                node_y,
                index as i64,
                area.created_at,
                area.updated_at,
            ],
        )?;
    }

    for (index, content) in snapshot.contents.iter().enumerate() {
        let (node_x, node_y) = split_position(content.node_position);
        tx.execute(
            "INSERT INTO contents (
                id, area_id, title, status, properties, emoji, node_color,
                node_x, node_y, label_max_width, sort_order, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);",
            params![
                content.id.to_string(),
                content.area_id.map(|value| value.to_string()),
                content.title.as_str(),
                content_status_to_db(content.status),
                to_json(&content.properties, "contents.properties")?,
                content.emoji.as_deref(),
                content.node_color.as_deref(),
                node_x,
                node_y,
                content.label_max_width,
                index as i64,
                content.created_at,
                content.updated_at,
            ],
        )?;
        for tag in &content.tags {
            tx.execute(
                "INSERT OR IGNORE INTO content_tags (content_id, tag) VALUES (?1, ?2);",
                params![content.id.to_string(), tag.as_str()],
            )?;
        }
    }

    for (index, link) in snapshot.links.iter().enumerate() {
        tx.execute(
            "INSERT INTO links (
                id, from_content_id, to_content_id, type, property_id,
                color, line_style, arrow_mode, sort_order, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                link.id.to_string(),
                link.from_content_id.to_string(),
                link.to_content_id.to_string(),
                link_type_to_db(link.link_type),
                link.property_id.as_deref(),
                link.style.color.as_deref(),
                link.style.line_style.map(line_style_to_db),
                link.style.arrow_mode.map(arrow_mode_to_db),
                index as i64,
                link.created_at,
            ],
        )?;
    }

    for (index, frame) in snapshot.graph_frames.iter().enumerate() {
        tx.execute(
            "INSERT INTO graph_frames (
                id, created_in_layer, level, area_id, children_parent_id, title,
                pos_x, pos_y, width, height, background_color, border_color,
                text_annotations, shape_annotations, sort_order, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17);",
            params![
                frame.id.to_string(),
                frame.created_in_layer.as_str(),
                frame_level_to_db(frame.level),
                frame.area_id.map(|value| value.to_string()),
                frame.children_parent_id.map(|value| value.to_string()),
                frame.title.as_str(),
                frame.position.x,
                frame.position.y,
                frame.width,
                frame.height,
                frame.background_color.as_deref(),
                frame.border_color.as_deref(),
                to_json(&frame.text_annotations, "graph_frames.text_annotations")?,
                to_json(&frame.shape_annotations, "graph_frames.shape_annotations")?,
                index as i64,
                frame.created_at,
                frame.updated_at,
            ],
        )?;
    }

    for level in snapshot.hierarchy_level_configs.iter().flatten() {
        tx.execute(
            "INSERT OR REPLACE INTO hierarchy_levels (depth, name, color, area_scope, area_ids)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                level.depth as i64,
                level.name.as_str(),
                level.color.as_str(),
                area_scope_to_db(level.area_scope),
                to_json(&level.area_ids, "hierarchy_levels.area_ids")?,
            ],
        )?;
    }

    Ok(())
}

fn load_areas(conn: &Connection) -> RepoResult<Vec<Area>> {
    let mut stmt = conn.prepare(
        "SELECT
            id, name, description, emoji, background_color, content_ids,
            node_x, node_y, created_at, updated_at
         FROM areas
         ORDER BY sort_order ASC, id ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut areas = Vec::new();
    while let Some(row) = rows.next()? {
        let id_text: String = row.get("id")?;
        let content_ids_text: String = row.get("content_ids")?;
        areas.push(Area {
            id: parse_uuid(&id_text, "areas.id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            emoji: row.get("emoji")?,
            background_color: row.get("background_color")?,
            content_ids: from_json(&content_ids_text, "areas.content_ids")?,
            node_position: read_position(row, "node_x", "node_y")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        });
    }
    Ok(areas)
}

fn load_contents(conn: &Connection) -> RepoResult<Vec<Content>> {
    let mut tags = load_tags(conn)?;
    let mut stmt = conn.prepare(
        "SELECT
            id, area_id, title, status, properties, emoji, node_color,
            node_x, node_y, label_max_width, created_at, updated_at
         FROM contents
         ORDER BY sort_order ASC, id ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut contents = Vec::new();
    while let Some(row) = rows.next()? {
        let id_text: String = row.get("id")?;
        let status_text: String = row.get("status")?;
        let properties_text: String = row.get("properties")?;
        let status = parse_content_status(&status_text).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid status `{status_text}` in contents.status"))
        })?;
        contents.push(Content {
            id: parse_uuid(&id_text, "contents.id")?,
            area_id: parse_optional_uuid(row.get("area_id")?, "contents.area_id")?,
            title: row.get("title")?,
            status,
            properties: from_json(&properties_text, "contents.properties")?,
            emoji: row.get("emoji")?,
            node_color: row.get("node_color")?,
            node_position: read_position(row, "node_x", "node_y")?,
            label_max_width: row.get("label_max_width")?,
            tags: tags.remove(&id_text).unwrap_or_default(),
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        });
    }
    Ok(contents)
}

fn load_tags(conn: &Connection) -> RepoResult<HashMap<String, BTreeSet<String>>> {
    let mut stmt = conn.prepare("SELECT content_id, tag FROM content_tags ORDER BY tag ASC;")?;
    let mut rows = stmt.query([])?;
    let mut tags: HashMap<String, BTreeSet<String>> = HashMap::new();
    while let Some(row) = rows.next()? {
        let content_id: String = row.get(0)?;
        let tag: String = row.get(1)?;
        tags.entry(content_id).or_default().insert(tag);
    }
    Ok(tags)
}

fn load_links(conn: &Connection) -> RepoResult<Vec<Link>> {
    let mut stmt = conn.prepare(
        "SELECT
            id, from_content_id, to_content_id, type, property_id,
            color, line_style, arrow_mode, created_at
         FROM links
         ORDER BY sort_order ASC, id ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut links = Vec::new();
    while let Some(row) = rows.next()? {
        let id_text: String = row.get("id")?;
        let from_text: String = row.get("from_content_id")?;
        let to_text: String = row.get("to_content_id")?;
        let type_text: String = row.get("type")?;
        let link_type = parse_link_type(&type_text).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid link type `{type_text}` in links.type"))
        })?;
        let line_style = row
            .get::<_, Option<String>>("line_style")?
            .map(|value| {
                parse_line_style(&value).ok_or_else(|| {
                    RepoError::InvalidData(format!("invalid line style `{value}` in links.line_style"))
                })
            })
            .transpose()?;
        let arrow_mode = row
            .get::<_, Option<String>>("arrow_mode")?
            .map(|value| {
                parse_arrow_mode(&value).ok_or_else(|| {
                    RepoError::InvalidData(format!("invalid arrow mode `{value}` in links.arrow_mode"))
                })
            })
            .transpose()?;

        links.push(Link {
            id: parse_uuid(&id_text, "links.id")?,
            from_content_id: parse_uuid(&from_text, "links.from_content_id")?,
            to_content_id: parse_uuid(&to_text, "links.to_content_id")?,
            link_type,
            property_id: row.get("property_id")?,
            style: LinkStyle {
                color: row.get("color")?,
                line_style,
                arrow_mode,
            },
            created_at: row.get("created_at")?,
        });
    }
    Ok(links)
}

fn load_frames(conn: &Connection) -> RepoResult<Vec<GraphFrame>> {
    let mut stmt = conn.prepare(
        "SELECT
            id, created_in_layer, level, area_id, children_parent_id, title,
            pos_x, pos_y, width, height, background_color, border_color,
            text_annotations, shape_annotations, created_at, updated_at
         FROM graph_frames
         ORDER BY sort_order ASC, id ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut frames = Vec::new();
    while let Some(row) = rows.next()? {
        let id_text: String = row.get("id")?;
        let layer_text: String = row.get("created_in_layer")?;
        let level_text: String = row.get("level")?;
        let texts: String = row.get("text_annotations")?;
        let shapes: String = row.get("shape_annotations")?;
        let created_in_layer = parse_layer_mode(&layer_text).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid layer `{layer_text}` in graph_frames.created_in_layer"
            ))
        })?;
        let level = parse_frame_level(&level_text).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid level `{level_text}` in graph_frames.level"))
        })?;

        frames.push(GraphFrame {
            id: parse_uuid(&id_text, "graph_frames.id")?,
            created_in_layer,
            level,
            area_id: parse_optional_uuid(row.get("area_id")?, "graph_frames.area_id")?,
            children_parent_id: parse_optional_uuid(
                row.get("children_parent_id")?,
                "graph_frames.children_parent_id",
            )?,
            title: row.get("title")?,
            position: Position::new(row.get("pos_x")?, row.get("pos_y")?),
            width: row.get("width")?,
            height: row.get("height")?,
            background_color: row.get("background_color")?,
            border_color: row.get("border_color")?,
            text_annotations: from_json(&texts, "graph_frames.text_annotations")?,
            shape_annotations: from_json(&shapes, "graph_frames.shape_annotations")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        });
    }
    Ok(frames)
}

fn load_levels(conn: &Connection) -> RepoResult<Vec<HierarchyLevelConfig>> {
    let mut stmt = conn.prepare(
        "SELECT depth, name, color, area_scope, area_ids
         FROM hierarchy_levels
         ORDER BY depth ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut levels = Vec::new();
    while let Some(row) = rows.next()? {
        let depth: i64 = row.get("depth")?;
        let scope_text: String = row.get("area_scope")?;
        let area_ids_text: String = row.get("area_ids")?;
        let depth = usize::try_from(depth)
            .ok()
            .filter(|depth| *depth < MAX_HIERARCHY_LEVELS)
            .ok_or_else(|| {
                RepoError::InvalidData(format!("invalid depth `{depth}` in hierarchy_levels.depth"))
            })?;
        let area_scope = parse_area_scope(&scope_text).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid scope `{scope_text}` in hierarchy_levels.area_scope"
            ))
        })?;

        levels.push(HierarchyLevelConfig {
            depth,
            name: row.get("name")?,
            color: row.get("color")?,
            area_scope,
            area_ids: from_json(&area_ids_text, "hierarchy_levels.area_ids")?,
        });
    }
    Ok(levels)
}

fn split_position(position: Option<Position>) -> (Option<f64>, Option<f64>) {
    match position {
        Some(position) => (Some(position.x), Some(position.y)),
        None => (None, None),
    }
}

fn read_position(row: &Row<'_>, x_column: &str, y_column: &str) -> RepoResult<Option<Position>> {
    let x: Option<f64> = row.get(x_column)?;
    let y: Option<f64> = row.get(y_column)?;
    Ok(match (x, y) {
        (Some(x), Some(y)) => Some(Position::new(x, y)),
        _ => None,
    })
}

fn to_json<T: Serialize + ?Sized>(value: &T, column: &'static str) -> RepoResult<String> {
    serde_json::to_string(value)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode {column}: {err}")))
}

fn from_json<T: DeserializeOwned>(value: &str, column: &'static str) -> RepoResult<T> {
    serde_json::from_str(value)
        .map_err(|err| RepoError::InvalidData(format!("invalid json in {column}: {err}")))
}

fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn parse_optional_uuid(value: Option<String>, column: &'static str) -> RepoResult<Option<Uuid>> {
    value.map(|value| parse_uuid(&value, column)).transpose()
}

fn content_status_to_db(value: ContentStatus) -> &'static str {
    match value {
        ContentStatus::Open => "open",
        ContentStatus::Closed => "closed",
    }
}

fn parse_content_status(value: &str) -> Option<ContentStatus> {
    match value {
        "open" => Some(ContentStatus::Open),
        "closed" => Some(ContentStatus::Closed),
        _ => None,
    }
}

fn link_type_to_db(value: LinkType) -> &'static str {
    match value {
        LinkType::Manual => "manual",
        LinkType::Auto => "auto",
        LinkType::Parent => "parent",
    }
}

fn parse_link_type(value: &str) -> Option<LinkType> {
    match value {
        "manual" => Some(LinkType::Manual),
        "auto" => Some(LinkType::Auto),
        "parent" => Some(LinkType::Parent),
        _ => None,
    }
}

fn line_style_to_db(value: LineStyle) -> &'static str {
    match value {
        LineStyle::Solid => "solid",
        LineStyle::Dashed => "dashed",
    }
}

fn parse_line_style(value: &str) -> Option<LineStyle> {
    match value {
        "solid" => Some(LineStyle::Solid),
        "dashed" => Some(LineStyle::Dashed),
        _ => None,
    }
}

fn arrow_mode_to_db(value: ArrowMode) -> &'static str {
    match value {
        ArrowMode::Forward => "forward",
        ArrowMode::Both => "both",
    }
}

fn parse_arrow_mode(value: &str) -> Option<ArrowMode> {
    match value {
        "forward" => Some(ArrowMode::Forward),
        "both" => Some(ArrowMode::Both),
        _ => None,
    }
}

fn parse_layer_mode(value: &str) -> Option<LayerMode> {
    match value {
        "contents" => Some(LayerMode::Contents),
        "areas" => Some(LayerMode::Areas),
        "children" => Some(LayerMode::Children),
        _ => None,
    }
}

fn frame_level_to_db(value: FrameLevel) -> &'static str {
    match value {
        FrameLevel::Area => "area",
        FrameLevel::Content => "content",
    }
}

fn parse_frame_level(value: &str) -> Option<FrameLevel> {
    match value {
        "area" => Some(FrameLevel::Area),
        "content" => Some(FrameLevel::Content),
        _ => None,
    }
}

fn area_scope_to_db(value: AreaScope) -> &'static str {
    match value {
        AreaScope::All => "all",
        AreaScope::Specific => "specific",
    }
}

fn parse_area_scope(value: &str) -> Option<AreaScope> {
    match value {
        "all" => Some(AreaScope::All),
        "specific" => Some(AreaScope::Specific),
        _ => None,
    }
}

fn ensure_workspace_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in [
        "areas",
        "contents",
        "content_tags",
        "links",
        "graph_frames",
        "hierarchy_levels",
    ] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
