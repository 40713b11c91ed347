use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::external::CommandSpec;
use crate::repository::{ResolutionMode, MAVEN_CENTRAL};

/// Global configuration loaded from `~/.config/depot/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepotConfig {
    /// Where artifacts are cached. None = `~/.cache/depot/lib`.
    #[serde(default)]
    pub save_dir: Option<PathBuf>,
    /// Global repository base URLs, consulted for every artifact.
    #[serde(default = "default_repositories")]
    pub repositories: Vec<String>,
    /// Whether an artifact's own repositories come before or after the global ones.
    #[serde(default)]
    pub resolution_mode: ResolutionMode,
    /// External namespace rewriter. Required only for artifacts with relocations.
    #[serde(default)]
    pub relocator: Option<CommandSpec>,
    /// External dependency graph resolver. Required only for transitive resolution.
    #[serde(default)]
    pub dependency_resolver: Option<CommandSpec>,
}

fn default_repositories() -> Vec<String> {
    vec![MAVEN_CENTRAL.to_string()]
}

impl Default for DepotConfig {
    fn default() -> Self {
        Self {
            save_dir: None,
            repositories: default_repositories(),
            resolution_mode: ResolutionMode::Default,
            relocator: None,
            dependency_resolver: None,
        }
    }
}

impl DepotConfig {
    /// Configured save directory, or the XDG cache default (created if missing).
    pub fn save_dir(&self) -> Result<PathBuf> {
        match &self.save_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_save_dir(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Ok(toml::from_str(&data)?)
    }
}

pub fn default_save_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("depot")?;
    Ok(xdg_dirs.create_cache_directory("lib")?)
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("depot")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<DepotConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = DepotConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    DepotConfig::from_path(&path)
}
