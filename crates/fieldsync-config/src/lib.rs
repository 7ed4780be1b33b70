//! Shared configuration for fieldsync connectors.
//!
//! TOML profiles layered with `FIELDSYNC_` environment variables,
//! translation to `fieldsync_core::ConnectorConfig`, and tracing
//! subscriber setup for the embedding process.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use fieldsync_core::{ConnectorConfig, ConnectorId, DEFAULT_CONNECTOR_IDENTIFIER};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no profile named '{profile}'")]
    NoProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named explicitly.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named connector profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Resolve a profile by name, falling back to `default_profile`.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ConfigError::NoProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Persist property value state.
    #[serde(default = "default_state_storage")]
    pub state_storage: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            state_storage: default_state_storage(),
        }
    }
}

fn default_log_level() -> String {
    "warn".into()
}
fn default_state_storage() -> bool {
    true
}

/// A named connector profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// UUID stamped on every device this connector creates.
    pub connector_id: String,

    /// Connector slug used in log fields.
    #[serde(default = "default_identifier")]
    pub identifier: String,

    /// Override the global state storage setting.
    pub state_storage: Option<bool>,
}

fn default_identifier() -> String {
    DEFAULT_CONNECTOR_IDENTIFIER.into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "fieldsync", "fieldsync").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("fieldsync");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from an explicit file, layered over defaults and under
/// `FIELDSYNC_` environment variables (`__` separates nested keys, e.g.
/// `FIELDSYNC_DEFAULTS__LOG_LEVEL`). A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("FIELDSYNC_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ConnectorConfig` from a profile and the global defaults.
pub fn profile_to_connector_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ConnectorConfig, ConfigError> {
    let connector_id = profile
        .connector_id
        .parse::<ConnectorId>()
        .map_err(|e| ConfigError::Validation {
            field: "connector_id".into(),
            reason: format!("'{}' is not a UUID: {e}", profile.connector_id),
        })?;

    let identifier = profile.identifier.trim();
    if identifier.is_empty() {
        return Err(ConfigError::Validation {
            field: "identifier".into(),
            reason: "must not be empty".into(),
        });
    }

    Ok(ConnectorConfig {
        connector_id,
        identifier: identifier.to_owned(),
        state_storage: profile.state_storage.unwrap_or(defaults.state_storage),
    })
}

// ── Tracing ─────────────────────────────────────────────────────────

/// Install the global tracing subscriber. `RUST_LOG` wins over the
/// configured level. Fails if a subscriber is already installed.
pub fn init_tracing(defaults: &Defaults) -> Result<(), ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&defaults.log_level))
        .map_err(|e| ConfigError::Validation {
            field: "log_level".into(),
            reason: e.to_string(),
        })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match defaults.log_format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    installed.map_err(|e| ConfigError::Validation {
        field: "tracing".into(),
        reason: e.to_string(),
    })
}
