//! Application configuration file.
//!
//! ```json
//! {
//!   "title": "Plant viewer",
//!   "services": {
//!     "ExplodeService": { "magnitude": 1.5, "active": false }
//!   },
//!   "disabled_services": ["SpaceMouseService"]
//! }
//! ```
//!
//! Every field is optional. Per-service objects are validated by the service
//! they configure when they are applied, not when the file is parsed.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    /// Service name to configuration object.
    pub services: BTreeMap<String, Value>,
    /// Services left out of the registry.
    pub disabled_services: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "HOOPS UI".to_string(),
            services: BTreeMap::new(),
            disabled_services: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let json = fs::read_to_string(path).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load from `path` if given. Otherwise load the file at
    /// [`AppConfig::default_path`], falling back to defaults when there is none.
    pub fn load_or_default(path: Option<&Path>) -> AppResult<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => {
                log::info!("Loading config from {}", path.display());
                Self::load(&path)
            }
            _ => {
                log::debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// `<local data dir>/hoops-ui/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .map(|base| base.join("hoops-ui").join("config.json"))
    }

    pub fn is_enabled(&self, service: &str) -> bool {
        !self.disabled_services.iter().any(|name| name == service)
    }
}
