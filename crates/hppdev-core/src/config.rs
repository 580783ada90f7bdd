//! Configuration loading for hppdev

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths::Paths;

/// hppdev configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Shared build-rule directory, relative to a package root
    #[serde(default = "default_build_aux_dir")]
    pub build_aux_dir: String,

    /// Rule files included by every top-level build description, in order
    #[serde(default = "default_includes")]
    pub includes: Vec<String>,

    /// Author recorded in generated files (falls back to git config)
    #[serde(default)]
    pub author: Option<String>,

    /// Author email recorded in generated files (falls back to git config)
    #[serde(default)]
    pub email: Option<String>,

    /// Refuse to scaffold when a declared dependency is not in the workspace
    #[serde(default)]
    pub check_dependencies: bool,

    /// Default workspace directory (current directory when unset)
    #[serde(default)]
    pub workspace: Option<PathBuf>,
}

fn default_build_aux_dir() -> String {
    "build-aux".to_string()
}

fn default_includes() -> Vec<String> {
    vec![
        "doc-recursive.mk".to_string(),
        "pkg-config.mk".to_string(),
        "git-version.mk".to_string(),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            build_aux_dir: default_build_aux_dir(),
            includes: default_includes(),
            author: None,
            email: None,
            check_dependencies: false,
            workspace: None,
        }
    }
}

impl Config {
    /// Load configuration from the standard location or use defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {:?}", path))?;

        Ok(config)
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        Paths::new().config_file()
    }

    /// Resolve the workspace directory to scaffold into
    pub fn workspace_dir(&self) -> Result<PathBuf> {
        match &self.workspace {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("Failed to get current directory"),
        }
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.build_aux_dir, "build-aux");
        assert_eq!(
            config.includes,
            vec!["doc-recursive.mk", "pkg-config.mk", "git-version.mk"]
        );
        assert!(!config.check_dependencies);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "check_dependencies = true\nauthor = \"Jane\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.check_dependencies);
        assert_eq!(config.author.as_deref(), Some("Jane"));
        assert_eq!(config.includes.len(), 3);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "includes = 3").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_workspace_override() {
        let config = Config {
            workspace: Some(PathBuf::from("/tmp/ws")),
            ..Default::default()
        };
        assert_eq!(config.workspace_dir().unwrap(), PathBuf::from("/tmp/ws"));
    }
}
