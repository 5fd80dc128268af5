//! Graph projection engine.
//!
//! # Responsibility
//! - Index links by kind (`links`), compute hierarchy depths and level
//!   configs (`hierarchy`), resolve inherited node styles (`style`).
//! - Assemble node/edge projections per layer (`projection`) and apply the
//!   tag filter and frame injection (`filter`).
//! - Expose one query entry point (`query::project`).
//!
//! # Invariants
//! - Every builder is pure: it reads a `WorkspaceSnapshot` and never
//!   mutates it or keeps state between calls.
//! - Malformed input never fails a projection; offending entities are left
//!   out and the rest is still rendered.
//! - Output order follows snapshot order, so equal snapshots give equal
//!   projections.

pub mod filter;
pub mod hierarchy;
pub mod links;
pub mod projection;
pub mod query;
pub mod style;
pub mod visual;
