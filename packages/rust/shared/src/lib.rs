//! Shared types, error model, and configuration for the advisor workspace.
//!
//! This crate is the foundation depended on by all other advisor crates.
//! It provides:
//! - [`AdvisorError`]: the unified error type
//! - Domain types ([`ProfileContext`], [`TagList`], [`AgentKind`],
//!   [`GenerationRequest`], [`GenerationResult`])
//! - Configuration ([`AppConfig`], [`CompletionSettings`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AgentOverride, AppConfig, CompletionConfig, CompletionSettings, config_dir, config_file_path,
    init_config, load_config, load_config_from, resolve_completion_settings,
};
pub use error::{AdvisorError, Result};
pub use types::{
    AgentKind, GenerationOptions, GenerationRequest, GenerationResult, ProfileContext, TagList,
};
