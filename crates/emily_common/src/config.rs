//! Emily Configuration
//!
//! User configuration for the assistant shell and its directive engine.
//!
//! Configuration lives in `$EMILY_CONFIG` or `<config dir>/emily/config.toml`.
//! A missing file means defaults; an unreadable or malformed one is an error.

use crate::apps::{AppRegistry, AppRegistryError};
use crate::home_assistant::HomeAssistantSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment override for the config file path
pub const CONFIG_ENV: &str = "EMILY_CONFIG";
const CONFIG_DIR_NAME: &str = "emily";
const CONFIG_FILE: &str = "config.toml";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write config: {0}")]
    Write(#[from] std::io::Error),
}

/// Assistant identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_assistant_name")]
    pub name: String,

    /// Name the model addresses the user by
    #[serde(default = "default_user_name")]
    pub user_name: String,
}

fn default_assistant_name() -> String {
    "Emily".to_string()
}

fn default_user_name() -> String {
    "User".to_string()
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: default_assistant_name(),
            user_name: default_user_name(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// App registry location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppsConfig {
    /// Path to the `{"apps": [...]}` JSON blob; relative paths resolve against the config dir
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<PathBuf>,
}

/// Complete Emily configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmilyConfig {
    #[serde(default)]
    pub assistant: AssistantConfig,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub apps: AppsConfig,

    #[serde(default)]
    pub home_assistant: HomeAssistantSettings,
}

impl EmilyConfig {
    /// Load from the default location
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path())
    }

    /// Load from `path`; defaults when the file doesn't exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_path())
    }

    /// Save to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Registry path resolved against `base` (normally the config file's directory)
    pub fn registry_path(&self, base: &Path) -> Option<PathBuf> {
        self.apps.registry.as_ref().map(|p| {
            if p.is_relative() {
                base.join(p)
            } else {
                p.clone()
            }
        })
    }

    /// Load the app registry; empty when none is configured
    pub fn load_registry(&self, base: &Path) -> Result<AppRegistry, AppRegistryError> {
        match self.registry_path(base) {
            Some(path) => AppRegistry::load(&path),
            None => Ok(AppRegistry::empty()),
        }
    }
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }
    config_dir().join(CONFIG_FILE)
}

/// Get the config directory
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}
