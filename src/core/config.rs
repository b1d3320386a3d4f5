//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.codelens/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::api::DEFAULT_BACKEND_URL;
use crate::core::chat::DEFAULT_MAX_HISTORY;
use crate::core::session::DEFAULT_SESSION;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CodelensConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PollingConfig {
    pub interval_secs: Option<u64>,
    pub loader_min_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ChatConfig {
    pub max_history: Option<usize>,
    pub session: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_LOADER_MIN_MS: u64 = 7000;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub backend_url: String,
    pub poll_interval: Duration,
    pub loader_min: Duration,
    pub max_history: usize,
    pub session: String,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            loader_min: Duration::from_millis(DEFAULT_LOADER_MIN_MS),
            max_history: DEFAULT_MAX_HISTORY,
            session: DEFAULT_SESSION.to_string(),
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.codelens/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".codelens").join("config.toml"))
}

/// Load config from `~/.codelens/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `CodelensConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<CodelensConfig, ConfigError> {
    let Some(path) = config_path() else {
        warn!("Could not determine home directory, using default config");
        return Ok(CodelensConfig::default());
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(CodelensConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: CodelensConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &PathBuf) {
    let default_content = r#"# CodeLens Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [backend]
# base_url = "http://localhost:5000"   # Or set CODELENS_BACKEND_URL

# [polling]
# interval_secs = 30                   # Health/cache refresh period
# loader_min_ms = 7000                 # Minimum time the startup loader stays up

# [chat]
# max_history = 500                    # Oldest entries are evicted past this
# session = "default"                  # Or set CODELENS_SESSION / --session
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_backend_url` and `cli_session` come from CLI flags (None = not specified).
pub fn resolve(
    config: &CodelensConfig,
    cli_backend_url: Option<&str>,
    cli_session: Option<&str>,
) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    // Backend URL: CLI → env → config → default
    let backend_url = cli_backend_url
        .map(|s| s.to_string())
        .or_else(|| std::env::var("CODELENS_BACKEND_URL").ok())
        .or_else(|| config.backend.base_url.clone())
        .unwrap_or(defaults.backend_url);

    // Session: CLI → env → config → default
    let session = cli_session
        .map(|s| s.to_string())
        .or_else(|| std::env::var("CODELENS_SESSION").ok())
        .or_else(|| config.chat.session.clone())
        .unwrap_or(defaults.session);

    ResolvedConfig {
        backend_url,
        poll_interval: config
            .polling
            .interval_secs
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.poll_interval),
        loader_min: config
            .polling
            .loader_min_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.loader_min),
        max_history: config.chat.max_history.unwrap_or(defaults.max_history),
        session,
    }
}
