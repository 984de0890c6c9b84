//! Home Assistant integration
//!
//! Two read/write paths over the Home Assistant REST API:
//! - service calls issued by `type=home` directives
//! - the entity/service catalog used to advertise valid directives to the model

pub mod catalog;
pub mod client;
pub mod fake;
pub mod synth;

pub use catalog::{EntityState, HomeCatalog, ServiceCatalog};
pub use client::HttpHomeAssistant;
pub use fake::FakeHomeAssistant;
pub use synth::{render_commands, synthesize_commands, NO_ENTITIES};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Connection settings (`[home_assistant]` config section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeAssistantSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_url")]
    pub url: String,

    /// Long-lived access token
    #[serde(default)]
    pub token: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_url() -> String {
    "http://localhost:8123".to_string()
}

fn default_timeout() -> u64 {
    10
}

impl Default for HomeAssistantSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_url(),
            token: String::new(),
            timeout_secs: default_timeout(),
        }
    }
}

impl HomeAssistantSettings {
    /// Enabled and carrying a token.
    pub fn is_usable(&self) -> bool {
        self.enabled && !self.token.trim().is_empty()
    }

    /// Whether `url` names an http(s) endpoint.
    pub fn has_web_url(&self) -> bool {
        let url = self.url.trim().to_lowercase();
        url.starts_with("http://") || url.starts_with("https://")
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

/// Home Assistant errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum HomeAssistantError {
    #[error("Home Assistant is not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Home Assistant returned HTTP {0}")]
    Status(u16),

    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),
}

/// Issues service calls (`POST /api/services/{domain}/{action}`).
pub trait HomeAutomation {
    fn call_service(
        &self,
        entity: &str,
        action: &str,
        params: &Map<String, Value>,
    ) -> Result<(), HomeAssistantError>;
}

/// Fetches the live entity states and service catalog.
pub trait HomeCatalogSource {
    fn fetch_catalog(&self) -> Result<HomeCatalog, HomeAssistantError>;
}
