//! Blocking REST client for Home Assistant

use super::catalog::{DomainServices, EntityState, HomeCatalog};
use super::{HomeAssistantError, HomeAssistantSettings, HomeAutomation, HomeCatalogSource};
use crate::directive::kind::entity_domain;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Real client: bearer-token auth, one blocking request per call.
pub struct HttpHomeAssistant {
    settings: HomeAssistantSettings,
    client: reqwest::blocking::Client,
}

impl HttpHomeAssistant {
    pub fn new(settings: HomeAssistantSettings) -> Result<Self, HomeAssistantError> {
        if settings.token.trim().is_empty() {
            return Err(HomeAssistantError::NotConfigured);
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| HomeAssistantError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { settings, client })
    }

    /// Build a client only when the settings are enabled and complete.
    pub fn from_settings(settings: &HomeAssistantSettings) -> Option<Self> {
        if !settings.is_usable() {
            return None;
        }
        match Self::new(settings.clone()) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(error = %e, "Home Assistant client unavailable");
                None
            }
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url(), path)
    }

    fn map_send_error(&self, e: reqwest::Error) -> HomeAssistantError {
        if e.is_timeout() {
            HomeAssistantError::Timeout(self.settings.timeout_secs)
        } else {
            HomeAssistantError::Http(format!("Request failed: {}", e))
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, HomeAssistantError> {
        let response = self
            .client
            .get(self.endpoint(path))
            .bearer_auth(&self.settings.token)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(HomeAssistantError::Status(response.status().as_u16()));
        }

        response
            .json()
            .map_err(|e| HomeAssistantError::InvalidJson(format!("{} : {}", path, e)))
    }
}

impl HomeAutomation for HttpHomeAssistant {
    fn call_service(
        &self,
        entity: &str,
        action: &str,
        params: &Map<String, Value>,
    ) -> Result<(), HomeAssistantError> {
        let domain = entity_domain(entity);
        let url = self.endpoint(&format!("/api/services/{}/{}", domain, action));

        let mut payload = Map::new();
        payload.insert("entity_id".to_string(), Value::from(entity));
        // Caller-supplied fields win, including an explicit entity_id
        payload.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));

        debug!(%url, entity, action, "Calling Home Assistant service");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.settings.token)
            .json(&Value::Object(payload))
            .send()
            .map_err(|e| self.map_send_error(e))?;

        match response.status().as_u16() {
            200 | 201 => Ok(()),
            code => Err(HomeAssistantError::Status(code)),
        }
    }
}

impl HomeCatalogSource for HttpHomeAssistant {
    fn fetch_catalog(&self) -> Result<HomeCatalog, HomeAssistantError> {
        let entities: Vec<EntityState> = self.get_json("/api/states")?;
        let services: Vec<DomainServices> = self.get_json("/api/services")?;
        debug!(
            entities = entities.len(),
            domains = services.len(),
            "Fetched Home Assistant catalog"
        );
        Ok(HomeCatalog::from_payloads(entities, services))
    }
}
