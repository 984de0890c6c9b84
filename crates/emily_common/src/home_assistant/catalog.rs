//! Catalog payloads from `/api/states` and `/api/services`

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::directive::kind::entity_domain;

/// One entry of `/api/states`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub entity_id: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl EntityState {
    pub fn domain(&self) -> &str {
        entity_domain(&self.entity_id)
    }

    /// `friendly_name` attribute, or the entity id.
    pub fn friendly_name(&self) -> String {
        match self.attributes.get("friendly_name") {
            Some(Value::String(name)) => name.clone(),
            Some(Value::Null) | None => self.entity_id.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn supports_color_mode(&self, mode: &str) -> bool {
        self.attributes
            .get("supported_color_modes")
            .and_then(Value::as_array)
            .is_some_and(|modes| modes.iter().any(|m| m.as_str() == Some(mode)))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ServiceInfo {
    #[serde(default)]
    pub fields: IndexMap<String, Value>,
}

/// One entry of `/api/services`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DomainServices {
    pub domain: String,
    #[serde(default)]
    pub services: IndexMap<String, ServiceInfo>,
}

/// domain -> service -> field names, in API order.
pub type ServiceCatalog = IndexMap<String, IndexMap<String, Vec<String>>>;

/// Everything the synthesizer needs from a live instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeCatalog {
    pub entities: Vec<EntityState>,
    pub services: ServiceCatalog,
}

impl HomeCatalog {
    /// Build from the raw API payloads. A repeated domain replaces the earlier one.
    pub(crate) fn from_payloads(entities: Vec<EntityState>, services: Vec<DomainServices>) -> Self {
        let services = services
            .into_iter()
            .map(|svc| {
                let actions = svc
                    .services
                    .into_iter()
                    .map(|(name, info)| (name, info.fields.into_keys().collect()))
                    .collect();
                (svc.domain, actions)
            })
            .collect();
        Self { entities, services }
    }

    /// Parse the JSON bodies of `/api/states` and `/api/services`.
    pub fn from_json(states: &str, services: &str) -> Result<Self, serde_json::Error> {
        let entities: Vec<EntityState> = serde_json::from_str(states)?;
        let services: Vec<DomainServices> = serde_json::from_str(services)?;
        Ok(Self::from_payloads(entities, services))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: &str = r#"[
        {"entity_id": "light.desk", "state": "on",
         "attributes": {"friendly_name": "Desk Lamp", "supported_color_modes": ["rgb", "onoff"]}},
        {"entity_id": "sensor.temp", "state": "21", "attributes": {}}
    ]"#;

    const SERVICES: &str = r#"[
        {"domain": "light", "services": {
            "turn_on": {"fields": {"entity_id": {}, "brightness": {}, "rgb_color": {}}},
            "turn_off": {"fields": {}}
        }},
        {"domain": "homeassistant", "services": {"restart": {}}}
    ]"#;

    #[test]
    fn test_parse_payloads_in_order() {
        let catalog = HomeCatalog::from_json(STATES, SERVICES).unwrap();
        assert_eq!(catalog.entities.len(), 2);
        let light = &catalog.services["light"];
        let names: Vec<_> = light.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["turn_on", "turn_off"]);
        assert_eq!(light["turn_on"], vec!["entity_id", "brightness", "rgb_color"]);
        assert!(catalog.services["homeassistant"]["restart"].is_empty());
    }

    #[test]
    fn test_entity_helpers() {
        let catalog = HomeCatalog::from_json(STATES, SERVICES).unwrap();
        let desk = &catalog.entities[0];
        assert_eq!(desk.domain(), "light");
        assert_eq!(desk.friendly_name(), "Desk Lamp");
        assert!(desk.supports_color_mode("rgb"));
        assert!(!desk.has_attribute("color_temp"));
        assert_eq!(catalog.entities[1].friendly_name(), "sensor.temp");
    }
}
