//! Runtime configuration loaded from `config.json`

use crate::api::share::SHARE_BASE_URL;
use crate::api::ygoprodeck::{YgoProDeckClient, BASE_URL};
use crate::collection::SortPolicy;
use crate::error::Result;
use crate::io::MAX_FILE_SIZE;
use crate::pricing::{default_price_sources, PriceSource};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub share_base_url: String,
    /// Minimum spacing between card database requests
    pub rate_limit_ms: u64,
    /// Upload limit in bytes
    pub max_file_size: u64,
    /// Vendors considered for price comparison, in report order
    pub price_sources: Vec<PriceSource>,
    pub sort: SortPolicy,
    pub use_cache: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: BASE_URL.to_string(),
            share_base_url: SHARE_BASE_URL.to_string(),
            rate_limit_ms: 100,
            max_file_size: MAX_FILE_SIZE,
            price_sources: default_price_sources(),
            sort: SortPolicy::None,
            use_cache: true,
        }
    }
}

impl AppConfig {
    /// `<config_dir>/deck_check/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("deck_check").join("config.json"))
    }

    /// Reads a config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Loads `path` when given. Otherwise the default location is tried and
    /// a missing file yields the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn client(&self) -> YgoProDeckClient {
        YgoProDeckClient::new(&self.api_base_url, Duration::from_millis(self.rate_limit_ms))
    }
}
