//! Shared types, error model, and configuration for docbinder.
//!
//! This crate is the foundation depended on by all other docbinder crates.
//! It provides:
//! - [`DocbinderError`] — the unified error type
//! - Domain types ([`Category`], [`Tutorial`], [`Chapter`], [`ChapterSection`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CategoryEntry, CollectConfig, FetchConfig, OutputConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{DocbinderError, Result};
pub use types::{Category, Chapter, ChapterFailure, ChapterSection, Tutorial};
