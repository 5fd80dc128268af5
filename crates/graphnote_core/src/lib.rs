//! Core domain logic for GraphNote.
//! Holds the workspace model, the graph projection engine and the SQLite store.

pub mod db;
pub mod graph;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use graph::query::{project, ProjectionQuery};
pub use graph::visual::{GraphProjection, NodeType, VisualEdge, VisualNode};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::area::{Area, AreaId};
pub use model::content::{Content, ContentId, ContentStatus, Property, PropertyKind};
pub use model::frame::{GraphFrame, LayerMode};
pub use model::hierarchy::{AreaScope, HierarchyLevelConfig, MAX_HIERARCHY_LEVELS};
pub use model::link::{ArrowMode, LineStyle, Link, LinkStyle, LinkType};
pub use model::snapshot::WorkspaceSnapshot;
pub use model::{ModelValidationError, Position};
pub use repo::workspace_repo::{
    RepoError, RepoResult, SqliteWorkspaceRepository, WorkspaceRepository,
};
pub use service::workspace_service::{AreaDeletePolicy, WorkspaceService, WorkspaceServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
