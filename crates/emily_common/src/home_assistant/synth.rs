//! Home Assistant command synthesizer
//!
//! Renders one example directive per (entity, service) pair whose domains match,
//! to prime the model with directive syntax. Values are placeholders, not live state.
//!
//! The `rgb_color=[255,0,0]` example does not survive extraction unchanged: a span
//! ends at its first `]`, so the dispatcher sees `rgb_color=[255`.

use super::catalog::{EntityState, HomeCatalog};
use super::HomeCatalogSource;
use crate::SYSTEM_MARKER;
use once_cell::sync::Lazy;
use tracing::{info, warn};

/// Returned when the catalog has no entity with a matching service domain.
pub static NO_ENTITIES: Lazy<String> =
    Lazy::new(|| format!("{} No controllable entities found.", SYSTEM_MARKER));

/// Fetch the live catalog and render it. Never fails: connection problems become
/// a single diagnostic line the caller can embed verbatim.
pub fn synthesize_commands(source: &dyn HomeCatalogSource) -> String {
    match source.fetch_catalog() {
        Ok(catalog) => {
            let rendered = render_commands(&catalog);
            info!(
                entities = catalog.entities.len(),
                domains = catalog.services.len(),
                "Synthesized Home Assistant commands"
            );
            rendered
        }
        Err(e) => {
            warn!(error = %e, "Home Assistant catalog fetch failed");
            format!(
                "{} Failed to connect to Home Assistant API: {}",
                SYSTEM_MARKER, e
            )
        }
    }
}

/// Render every offered directive, blocks separated by a blank line.
pub fn render_commands(catalog: &HomeCatalog) -> String {
    let mut output = Vec::new();

    for entity in &catalog.entities {
        let Some(actions) = catalog.services.get(entity.domain()) else {
            continue;
        };
        let friendly_name = entity.friendly_name();

        for (action, fields) in actions {
            let mut parts = vec![
                "type=home".to_string(),
                format!("action={}", action),
                format!("entity={}", entity.entity_id),
            ];
            parts.extend(
                fields
                    .iter()
                    .filter_map(|field| placeholder(entity, field)),
            );
            output.push(format!("# {}\n@cmd[{}]", friendly_name, parts.join(", ")));
        }
    }

    if output.is_empty() {
        NO_ENTITIES.to_string()
    } else {
        output.join("\n\n")
    }
}

/// `field=example` for one service field, or `None` when the entity can't use it.
fn placeholder(entity: &EntityState, field: &str) -> Option<String> {
    let value = match field {
        "entity_id" => return None,
        "rgb_color" => {
            if !entity.has_attribute("rgb_color") && !entity.supports_color_mode("rgb") {
                return None;
            }
            "[255,0,0]"
        }
        "color_temp_kelvin" | "color_temp" => {
            if !entity.has_attribute(field) {
                return None;
            }
            "3000"
        }
        "brightness" => "180",
        "brightness_pct" => "75",
        "temperature" => "24",
        _ => "value",
    };
    Some(format!("{}={}", field, value))
}
