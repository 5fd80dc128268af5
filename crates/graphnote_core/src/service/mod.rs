//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate snapshot edits and persistence into use-case level APIs.
//! - Keep CLI/UI layers decoupled from storage details.

pub mod workspace_service;
