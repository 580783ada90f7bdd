//! Standard paths used by hppdev tools

use std::path::PathBuf;

/// Standard hppdev paths
pub struct Paths {
    /// Config directory (~/.config/hppdev)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("hppdev");

        Self { config }
    }

    /// Get the config file path, honoring HPPDEV_CONFIG
    pub fn config_file(&self) -> PathBuf {
        std::env::var("HPPDEV_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| self.config.join("config.toml"))
    }
}
