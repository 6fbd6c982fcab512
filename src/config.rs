use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::layerindex::client::DEFAULT_BASE_URL;

/// Default refresh interval in milliseconds (24 hours)
pub const DEFAULT_REFRESH_INTERVAL_MS: i64 = 24 * 60 * 60 * 1000;

const APP_DIR: &str = "oe-recipe-resolver";

/// Resolver configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverConfig {
    /// Largest accepted distance for a nearest-version match
    pub max_oe_version_distance: i64,
    pub layer_index: LayerIndexConfig,
    /// Folder holding `oe_*.json` snapshots of the layer index
    pub data_folder: Option<PathBuf>,
}

/// Layer index access configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LayerIndexConfig {
    /// Base URL of the layer index REST API
    pub url: String,
    /// Cache refresh interval in milliseconds
    pub refresh_interval: i64,
    /// Never contact the layer index
    pub offline: bool,
}

impl Default for LayerIndexConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BASE_URL.to_string(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL_MS,
            offline: false,
        }
    }
}

impl ResolverConfig {
    /// Read a JSON configuration file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Returns the path to the data directory for oe-recipe-resolver.
/// Uses $XDG_DATA_HOME/oe-recipe-resolver if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/oe-recipe-resolver,
/// or ./oe-recipe-resolver if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the snapshot database file.
pub fn db_path() -> PathBuf {
    data_dir().join("layerindex.db")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("oe-recipe-resolver.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join(APP_DIR)
}
