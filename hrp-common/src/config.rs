//! Configuration loading
//!
//! Settings are resolved in priority order:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables (`HRP_API_URL`, `HRP_API_TOKEN`)
//! 3. TOML config file (`--config`, `HRP_CONFIG`, then platform locations)
//! 4. Compiled defaults (fallback)
//!
//! A missing or malformed TOML file never aborts startup: a warning is logged
//! and the compiled defaults are used.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::{Error, Result};

pub const ENV_CONFIG_PATH: &str = "HRP_CONFIG";
pub const ENV_API_URL: &str = "HRP_API_URL";
pub const ENV_API_TOKEN: &str = "HRP_API_TOKEN";

/// Compiled defaults
pub mod defaults {
    pub const API_BASE_URL: &str = "http://127.0.0.1:8080/api";
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
    pub const BOARD_BIND_ADDRESS: &str = "127.0.0.1";
    pub const BOARD_PORT: u16 = 5830;
    pub const REFETCH_AFTER_MOVE: u32 = 1;
    pub const REFETCH_AFTER_EDIT: u32 = 2;
    pub const LOG_LEVEL: &str = "info";
}

/// Full configuration as read from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upstream pipeline API connection
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    /// Bearer token sent with every request (optional)
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Board service listener
#[derive(Debug, Clone, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Refetch-after-write behaviour of a pipeline session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_refetch_after_move")]
    pub refetch_after_move: u32,
    /// Edits refetch more than once to absorb upstream read lag
    #[serde(default = "default_refetch_after_edit")]
    pub refetch_after_edit: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_api_base_url() -> String {
    defaults::API_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    defaults::REQUEST_TIMEOUT_SECS
}

fn default_bind_address() -> String {
    defaults::BOARD_BIND_ADDRESS.to_string()
}

fn default_port() -> u16 {
    defaults::BOARD_PORT
}

fn default_refetch_after_move() -> u32 {
    defaults::REFETCH_AFTER_MOVE
}

fn default_refetch_after_edit() -> u32 {
    defaults::REFETCH_AFTER_EDIT
}

fn default_log_level() -> String {
    defaults::LOG_LEVEL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refetch_after_move: default_refetch_after_move(),
            refetch_after_edit: default_refetch_after_edit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl SessionConfig {
    /// A successful write is always followed by at least one refetch
    pub fn normalized(self) -> Self {
        if self.refetch_after_move == 0 || self.refetch_after_edit == 0 {
            warn!("Refetch counts below 1 are not allowed, raising to 1");
        }
        Self {
            refetch_after_move: self.refetch_after_move.max(1),
            refetch_after_edit: self.refetch_after_edit.max(1),
        }
    }
}

/// Command-line values that take precedence over every other source
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub port: Option<u16>,
}

impl TomlConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Read and parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Resolve the effective configuration from all sources
    pub fn resolve(overrides: &ConfigOverrides) -> Self {
        let mut config = match locate_config_file(overrides.config_path.as_deref()) {
            Some(path) => match Self::from_file(&path) {
                Ok(config) => {
                    info!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!(
                        "Could not load config file {} ({}), using defaults",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            None => {
                debug!("No config file found, using compiled defaults");
                Self::default()
            }
        };

        if let Some(url) = non_empty_env(ENV_API_URL) {
            config.api.base_url = url;
        }
        if let Some(token) = non_empty_env(ENV_API_TOKEN) {
            config.api.token = Some(token);
        }

        if let Some(url) = &overrides.api_url {
            config.api.base_url = url.clone();
        }
        if let Some(token) = &overrides.token {
            config.api.token = Some(token.clone());
        }
        if let Some(port) = overrides.port {
            config.board.port = port;
        }

        config.session = config.session.normalized();
        config
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Explicit path first (must exist), then `HRP_CONFIG`, then
/// `<config dir>/hrp/config.toml`, then `/etc/hrp/config.toml` on Unix
fn locate_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Some(path) = non_empty_env(ENV_CONFIG_PATH) {
        return Some(PathBuf::from(path));
    }

    let user_config = dirs::config_dir().map(|d| d.join("hrp").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/hrp/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
