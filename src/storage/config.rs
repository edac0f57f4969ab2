//! Configuration handling
//!
//! Configuration is stored in `.minipm/config.toml` (project) and
//! `~/.config/minipm/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Scheduling behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Write the computed order back onto stored tasks
    pub persist_order: bool,

    /// Schedule completed tasks along with open ones
    pub include_completed: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            persist_order: true,
            include_completed: true,
        }
    }
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProjectConfig {
    /// Scheduler settings
    pub schedule: ScheduleConfig,
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Configuration of an open project
///
/// The global config is loaded separately by [`Config::load_global`].
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
}

impl Config {
    /// Loads configuration for a specific project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let project = Self::load_project_config(project_root)?;
        Ok(Self { project })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "minipm", "minipm").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    pub fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads project configuration from a specific root
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(".minipm").join("config.toml");

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")
    }

    /// Finds the project root by looking for `.minipm/` in the current directory or a parent
    pub fn find_project_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_project_root_from(&current)
    }

    /// Finds the project root starting from `start`
    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| dir.join(".minipm").is_dir())
            .map(Path::to_path_buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = ProjectConfig::default();
        assert!(config.schedule.persist_order);
        assert!(config.schedule.include_completed);
        assert_eq!(GlobalConfig::default().default_format, OutputFormat::Text);
    }

    #[test]
    fn parse_project_config() {
        let toml = r#"
[schedule]
persist_order = false
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert!(!config.schedule.persist_order);
        // Unset keys keep their defaults
        assert!(config.schedule.include_completed);
    }

    #[test]
    fn parse_global_config() {
        let config: GlobalConfig = toml::from_str(r#"default_format = "json""#).unwrap();
        assert_eq!(config.default_format, OutputFormat::Json);
    }

    #[test]
    fn find_project_root_from_subdirectory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".minipm")).unwrap();

        let sub_dir = dir.path().join("sub").join("dir");
        fs::create_dir_all(&sub_dir).unwrap();

        let root = Config::find_project_root_from(&sub_dir);
        assert_eq!(root.as_deref(), Some(dir.path()));
    }

    #[test]
    fn find_project_root_outside_project() {
        let dir = TempDir::new().unwrap();
        assert!(Config::find_project_root_from(dir.path()).is_none());
    }

    #[test]
    fn project_config_loaded_from_disk() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".minipm")).unwrap();
        fs::write(
            dir.path().join(".minipm").join("config.toml"),
            "[schedule]\ninclude_completed = false\n",
        )
        .unwrap();

        let config = Config::for_project(dir.path()).unwrap();
        assert!(!config.project.schedule.include_completed);
        assert!(config.project.schedule.persist_order);
    }

    #[test]
    fn missing_project_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::for_project(dir.path()).unwrap();
        assert!(config.project.schedule.persist_order);
    }

    #[test]
    fn malformed_project_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".minipm")).unwrap();
        fs::write(dir.path().join(".minipm").join("config.toml"), "[schedule\n").unwrap();

        assert!(Config::for_project(dir.path()).is_err());
    }
}
