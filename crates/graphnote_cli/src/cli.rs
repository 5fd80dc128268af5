use clap::{Args, Parser, Subcommand, ValueEnum};
use graphnote_core::{LayerMode, ProjectionQuery};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "graphnote")]
#[command(about = "Project a GraphNote workspace into graph nodes and edges")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (trace|debug|info|warn|error); defaults per build mode
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the projection for one view as JSON
    Project(ProjectArgs),

    /// Load a JSON snapshot into a workspace database
    Import(ImportArgs),

    /// Print the stored workspace snapshot as JSON
    Export(ExportArgs),

    /// Print core linkage info
    Ping,
}

/// Where the workspace is read from.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// SQLite workspace database
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// JSON workspace snapshot file
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Layer to project
    #[arg(long, value_enum, default_value = "contents")]
    pub layer: LayerArg,

    /// Area scope for the contents/children layers
    #[arg(long)]
    pub area: Option<Uuid>,

    /// Parent content of the children layer
    #[arg(long)]
    pub parent: Option<Uuid>,

    /// Required tags (comma-separated, all must match)
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Maximum hierarchy levels (1-8)
    #[arg(long, default_value = "8")]
    pub levels: usize,

    /// Hierarchy-aware contents layer
    #[arg(long)]
    pub hierarchy: bool,

    /// Hide parent edges in hierarchy/children layers
    #[arg(long)]
    pub no_parent_edges: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl ProjectArgs {
    pub fn to_query(&self) -> ProjectionQuery {
        ProjectionQuery {
            layer: self.layer.into(),
            area_id: self.area,
            max_hierarchy_levels: self.levels,
            children_parent_id: self.parent,
            selected_tags: self.tags.clone(),
            hierarchy_enabled: self.hierarchy,
            show_parent_edges: !self.no_parent_edges,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    /// JSON workspace snapshot file
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Target SQLite database (created when missing, contents replaced)
    #[arg(long)]
    pub db: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// SQLite workspace database
    #[arg(long)]
    pub db: PathBuf,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerArg {
    Contents,
    Areas,
    Children,
}

impl From<LayerArg> for LayerMode {
    fn from(value: LayerArg) -> Self {
        match value {
            LayerArg::Contents => LayerMode::Contents,
            LayerArg::Areas => LayerMode::Areas,
            LayerArg::Children => LayerMode::Children,
        }
    }
}
