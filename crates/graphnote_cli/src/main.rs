//! GraphNote command-line entry point.
//!
//! # Responsibility
//! - Load a workspace from SQLite or a JSON snapshot.
//! - Print projections and snapshots as JSON on stdout.
//! - Report failures on stderr with a non-zero exit code.

mod cli;

use clap::Parser;
use cli::{Cli, Command, ExportArgs, ImportArgs, ProjectArgs, SourceArgs};
use graphnote_core::{
    default_log_level, init_logging, open_db, project, SqliteWorkspaceRepository,
    WorkspaceRepository, WorkspaceSnapshot,
};
use log::info;
use serde::Serialize;
use std::path::Path;

fn main() {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, &log_dir.to_string_lossy()) {
            eprintln!("graphnote: logging disabled: {err}");
        }
    }

    let result = match cli.command {
        Command::Project(args) => cmd_project(&args),
        Command::Import(args) => cmd_import(&args),
        Command::Export(args) => cmd_export(&args),
        Command::Ping => {
            println!("graphnote_core ping={}", graphnote_core::ping());
            println!("graphnote_core version={}", graphnote_core::core_version());
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("graphnote: {err}");
        std::process::exit(1);
    }
}

fn cmd_project(args: &ProjectArgs) -> Result<(), String> {
    let snapshot = load_source(&args.source)?;
    let query = args.to_query();
    let projection = project(&snapshot, &query);
    info!(
        "event=cli_project module=cli status=ok layer={} nodes={} edges={}",
        query.layer.as_str(),
        projection.nodes.len(),
        projection.edges.len()
    );
    print_json(&projection, args.pretty)
}

fn cmd_import(args: &ImportArgs) -> Result<(), String> {
    let snapshot = read_snapshot_file(&args.snapshot)?;
    let conn = open_db(&args.db).map_err(|err| err.to_string())?;
    let repo = SqliteWorkspaceRepository::try_new(&conn).map_err(|err| err.to_string())?;
    repo.save_snapshot(&snapshot)
        .map_err(|err| err.to_string())?;
    println!(
        "imported areas={} contents={} links={} frames={}",
        snapshot.areas.len(),
        snapshot.contents.len(),
        snapshot.links.len(),
        snapshot.graph_frames.len()
    );
    Ok(())
}

fn cmd_export(args: &ExportArgs) -> Result<(), String> {
    let snapshot = load_db(&args.db)?;
    print_json(&snapshot, args.pretty)
}

fn load_source(source: &SourceArgs) -> Result<WorkspaceSnapshot, String> {
    match (&source.db, &source.snapshot) {
        (Some(db), _) => load_db(db),
        (None, Some(path)) => read_snapshot_file(path),
        (None, None) => Err("either --db or --snapshot is required".to_string()),
    }
}

fn load_db(path: &Path) -> Result<WorkspaceSnapshot, String> {
    let conn = open_db(path).map_err(|err| err.to_string())?;
    let repo = SqliteWorkspaceRepository::try_new(&conn).map_err(|err| err.to_string())?;
    repo.load_snapshot().map_err(|err| err.to_string())
}

fn read_snapshot_file(path: &Path) -> Result<WorkspaceSnapshot, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| format!("cannot read `{}`: {err}", path.display()))?;
    serde_json::from_str(&raw)
        .map_err(|err| format!("invalid snapshot `{}`: {err}", path.display()))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|err| err.to_string())?;
    println!("{rendered}");
    Ok(())
}
