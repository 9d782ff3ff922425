//! User configuration, read from `config.json` in the platform config directory.
//!
//! Every field is optional. Command-line flags and environment variables take
//! precedence over the file.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "TradeGuide";
const APP_NAME: &str = "TradeGuide";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Project URL of the hosted market database.
    pub supabase_url: Option<String>,
    /// Public (anon) API key for the hosted market database.
    pub supabase_anon_key: Option<String>,
    /// Offline snapshot used instead of the hosted database.
    pub snapshot_path: Option<PathBuf>,
    /// How long fetched market tables are reused, in seconds.
    pub cache_ttl_secs: Option<u64>,
    pub defaults: PlanDefaults,
}

/// Fallbacks for `plan` arguments the player did not pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanDefaults {
    pub origin: Option<String>,
    pub stamina: Option<u64>,
    pub max_weight: Option<u64>,
}

impl AppConfig {
    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Loads the config. An explicit path must exist; the default location may be absent.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match explicit {
        Some(path) => read_config(path),
        None => match default_config_path() {
            Some(path) if path.exists() => read_config(&path),
            _ => {
                debug!("no config file found, using defaults");
                Ok(AppConfig::default())
            }
        },
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = serde_json::from_str(&data).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}
