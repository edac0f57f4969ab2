//! Project management
//!
//! Handles project initialization and provides access to stores.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::{Config, TaskStore};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a minipm project. Run 'minipm init' first.")]
    NotInProject,
}

/// A minipm project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let project_dir = root.join(".minipm");

        if !project_dir.is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let project_dir = root.join(".minipm");

        fs::create_dir_all(&project_dir).with_context(|| {
            format!(
                "Failed to create .minipm directory: {}",
                project_dir.display()
            )
        })?;

        // Create default config
        let config_path = project_dir.join("config.toml");
        if !config_path.exists() {
            let default_config = r#"# minipm configuration

[schedule]
# Write the computed order back onto stored tasks
persist_order = true

# Schedule completed tasks along with open ones
include_completed = true
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        // Create .gitignore for .minipm
        let gitignore_path = project_dir.join(".gitignore");
        if !gitignore_path.exists() {
            let gitignore = r#"# Ignore interrupted atomic writes
*.tmp

# Store write lock
*.lock
"#;
            fs::write(&gitignore_path, gitignore).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .minipm directory path
    pub fn project_dir(&self) -> PathBuf {
        self.root.join(".minipm")
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the task store
    pub fn task_store(&self) -> TaskStore {
        TaskStore::for_project(&self.root)
    }
}
