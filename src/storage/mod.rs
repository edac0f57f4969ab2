//! # Storage Layer
//!
//! Persistence for minipm projects in git-friendly file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | JSONL (one JSON per line) | `.minipm/tasks.jsonl` |
//! | Config | TOML | `.minipm/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`TaskStore`] uses file locking (`fs2`) for concurrent access
//! - Full rewrites are atomic (temp file + rename), which is what makes
//!   persisting a schedule all-or-nothing
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for accessing a project
//! - [`TaskStore`] - Read/write tasks as JSONL
//! - [`Config`] - Project and global configuration

mod config;
mod jsonl;
mod project;

pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig, ScheduleConfig};
pub use jsonl::{find_task, TaskStore};
pub use project::{Project, ProjectError};
