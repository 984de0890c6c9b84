//! In-memory Home Assistant for tests and offline runs

use super::catalog::HomeCatalog;
use super::{HomeAssistantError, HomeAutomation, HomeCatalogSource};
use serde_json::{Map, Value};
use std::sync::Mutex;

/// A recorded service call: (entity, action, params).
pub type RecordedCall = (String, String, Map<String, Value>);

/// Records every service call and serves a fixed catalog.
pub struct FakeHomeAssistant {
    catalog: Result<HomeCatalog, HomeAssistantError>,
    call_result: Result<(), HomeAssistantError>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeHomeAssistant {
    pub fn new(catalog: HomeCatalog) -> Self {
        Self {
            catalog: Ok(catalog),
            call_result: Ok(()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every request fails with `error`.
    pub fn failing(error: HomeAssistantError) -> Self {
        Self {
            catalog: Err(error.clone()),
            call_result: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Default for FakeHomeAssistant {
    fn default() -> Self {
        Self::new(HomeCatalog::default())
    }
}

impl HomeAutomation for FakeHomeAssistant {
    fn call_service(
        &self,
        entity: &str,
        action: &str,
        params: &Map<String, Value>,
    ) -> Result<(), HomeAssistantError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((entity.to_string(), action.to_string(), params.clone()));
        }
        self.call_result.clone()
    }
}

impl HomeCatalogSource for FakeHomeAssistant {
    fn fetch_catalog(&self) -> Result<HomeCatalog, HomeAssistantError> {
        self.catalog.clone()
    }
}
