//! Chat-session bootstrap context
//!
//! The first message sent to the model in a new chat: who the user is, which apps
//! it may open, and which home directives are valid right now.

use crate::apps::AppLookup;
use crate::home_assistant::{synthesize_commands, HomeAssistantSettings, HomeCatalogSource};
use crate::SYSTEM_MARKER;
use tracing::debug;

/// Availability of Home Assistant commands for the setup message.
pub enum HomeCommands<'a> {
    Disabled,
    /// Enabled but no token configured
    Unconfigured,
    /// Token present but the settings can't produce a client
    Invalid,
    Live(&'a dyn HomeCatalogSource),
}

impl<'a> HomeCommands<'a> {
    /// Choose the variant from settings and an optional live source.
    ///
    /// A missing source with a token configured means building the client failed.
    pub fn from_settings(
        settings: &HomeAssistantSettings,
        source: Option<&'a dyn HomeCatalogSource>,
    ) -> Self {
        if !settings.enabled {
            return HomeCommands::Disabled;
        }
        if settings.token.trim().is_empty() {
            return HomeCommands::Unconfigured;
        }
        match source {
            Some(source) if settings.has_web_url() => HomeCommands::Live(source),
            _ => HomeCommands::Invalid,
        }
    }

    fn render(&self) -> String {
        match self {
            HomeCommands::Disabled => "home assistant commands are not available".to_string(),
            HomeCommands::Unconfigured => {
                "home assistant commands are not available (no configuration)".to_string()
            }
            HomeCommands::Invalid => {
                "home assistant commands are not available (invalid configuration)".to_string()
            }
            HomeCommands::Live(source) => synthesize_commands(*source),
        }
    }
}

/// Builds the setup message.
pub struct SetupContext<'a> {
    pub user_name: &'a str,
    pub apps: &'a dyn AppLookup,
    pub home: HomeCommands<'a>,
}

impl<'a> SetupContext<'a> {
    pub fn render(&self) -> String {
        let apps = if self.apps.entries().is_empty() {
            "No apps configured.".to_string()
        } else {
            self.apps
                .entries()
                .iter()
                .map(|entry| format!("- {} ({})", entry.display_name(), entry.code))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let home = self.home.render();
        debug!(
            apps = self.apps.entries().len(),
            home_bytes = home.len(),
            "Rendered session setup context"
        );

        format!(
            "{marker} No need to reply to this message. This is a system message with user and system information.\n\
             User's name is {user}\n\
             Apps you can open, with their codes:\n{apps}\n\
             Available Home Assistant commands for controlling devices:\n{home}",
            marker = SYSTEM_MARKER,
            user = self.user_name,
            apps = apps,
            home = home,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::{AppEntry, AppRegistry};
    use crate::home_assistant::{FakeHomeAssistant, HomeAssistantError, HomeCatalog};

    fn apps() -> AppRegistry {
        AppRegistry::new(vec![AppEntry {
            name: "Spotify".to_string(),
            code: "spotify".to_string(),
            path: "/opt/spotify".to_string(),
            args: vec![],
        }])
    }

    #[test]
    fn test_disabled_home() {
        let registry = apps();
        let context = SetupContext {
            user_name: "Sam",
            apps: &registry,
            home: HomeCommands::from_settings(&HomeAssistantSettings::default(), None),
        };
        let text = context.render();
        assert!(text.starts_with(SYSTEM_MARKER));
        assert!(text.contains("User's name is Sam"));
        assert!(text.contains("- Spotify (spotify)"));
        assert!(text.ends_with("home assistant commands are not available"));
    }

    #[test]
    fn test_unconfigured_home() {
        let settings = HomeAssistantSettings {
            enabled: true,
            ..Default::default()
        };
        let registry = AppRegistry::empty();
        let context = SetupContext {
            user_name: "Sam",
            apps: &registry,
            home: HomeCommands::from_settings(&settings, None),
        };
        let text = context.render();
        assert!(text.contains("No apps configured."));
        assert!(text.ends_with("(no configuration)"));
    }

    #[test]
    fn test_invalid_home_settings() {
        let settings = HomeAssistantSettings {
            enabled: true,
            token: "t".to_string(),
            ..Default::default()
        };
        let fake = FakeHomeAssistant::default();
        let registry = AppRegistry::empty();

        let no_client = SetupContext {
            user_name: "Sam",
            apps: &registry,
            home: HomeCommands::from_settings(&settings, None),
        };
        assert!(no_client.render().ends_with("(invalid configuration)"));

        let bad_url = HomeAssistantSettings {
            url: "localhost:8123".to_string(),
            ..settings
        };
        let context = SetupContext {
            user_name: "Sam",
            apps: &registry,
            home: HomeCommands::from_settings(&bad_url, Some(&fake)),
        };
        assert!(context.render().ends_with("(invalid configuration)"));
    }

    #[test]
    fn test_live_home_embeds_sentinel_on_failure() {
        let settings = HomeAssistantSettings {
            enabled: true,
            token: "t".to_string(),
            ..Default::default()
        };
        let fake = FakeHomeAssistant::failing(HomeAssistantError::Timeout(10));
        let registry = apps();
        let context = SetupContext {
            user_name: "Sam",
            apps: &registry,
            home: HomeCommands::from_settings(&settings, Some(&fake)),
        };
        assert!(context
            .render()
            .contains(&format!("{} Failed to connect", SYSTEM_MARKER)));
    }

    #[test]
    fn test_live_home_lists_commands() {
        let catalog = HomeCatalog::from_json(
            r#"[{"entity_id": "switch.fan", "attributes": {"friendly_name": "Fan"}}]"#,
            r#"[{"domain": "switch", "services": {"toggle": {"fields": {}}}}]"#,
        )
        .unwrap();
        let fake = FakeHomeAssistant::new(catalog);
        let registry = apps();
        let context = SetupContext {
            user_name: "Sam",
            apps: &registry,
            home: HomeCommands::Live(&fake),
        };
        assert!(context
            .render()
            .ends_with("# Fan\n@cmd[type=home, action=toggle, entity=switch.fan]"));
    }
}
