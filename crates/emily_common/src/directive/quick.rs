//! Quick-command pre-pass
//!
//! Runs on the raw reply before extraction. Matches exact marker spans only:
//! list markers are replaced by generated text, UI markers emit a signal.

use super::block::DirectiveBlock;
use crate::apps::AppLookup;
use crate::launch::{UiSignal, UiSignals};
use tracing::debug;

pub const LIST_APPS: &str = "@cmd[meta=list_apps]";
pub const LIST_COMMANDS: &str = "@cmd[meta=list_commands]";
pub const CLEAR_DATA: &str = "@cmd[action=clear_data]";
pub const EXIT: &str = "@cmd[action=Exit]";
pub const SPEECH_ON: &str = "@cmd[config=speech_on]";
pub const SPEECH_OFF: &str = "@cmd[config=speech_off]";

/// Overview shown for `meta=list_commands`.
pub const COMMAND_LIST: &str = "Available Commands:

1. App Opening:
   - Opens the apps configured in settings, by name.
   - Needs to be enabled in the settings.

2. URL Opening:
   - Opens websites in the default browser.

3. Home Assistant Control:
   - Controls Home Assistant devices.
   - Needs to be enabled in the settings.

4. System Commands:
   - Clear chat history
   - Exit application
   - Enable voice mode
   - Disable voice mode
   - Show this command list

5. Other Commands:
   - Get live time
   - Live information from the internet
";

/// Markdown list of configured app names for `meta=list_apps`.
pub fn supported_apps_text(apps: &dyn AppLookup) -> String {
    let mut text = String::from("**Supported Apps:**\n");
    if apps.entries().is_empty() {
        text.push_str("No apps configured.");
    } else {
        for entry in apps.entries() {
            text.push_str(&format!("• **{}**\n", entry.display_name()));
        }
    }
    text
}

/// Rewrite `text` and fire UI signals; returns the new text and the runs to record.
///
/// `clear_data` is left in the text: the dispatcher records it.
pub fn quick_commands(
    text: &str,
    apps: &dyn AppLookup,
    ui: &dyn UiSignals,
) -> (String, Vec<DirectiveBlock>) {
    let mut text = text.to_string();
    let mut runs = Vec::new();

    if text.contains(LIST_APPS) {
        text = text.replace(LIST_APPS, &supported_apps_text(apps));
        debug!("Inserted app list");
    }

    if text.contains(CLEAR_DATA) {
        ui.emit(UiSignal::ConfirmClearHistory);
    }

    if text.contains(EXIT) {
        runs.push(DirectiveBlock::from_pairs([("action", "Exit")]));
        ui.emit(UiSignal::Exit);
    }

    if text.contains(LIST_COMMANDS) {
        text = text.replace(LIST_COMMANDS, COMMAND_LIST);
        debug!("Inserted command list");
    }

    if text.contains(SPEECH_ON) {
        ui.emit(UiSignal::SpeechOn);
        runs.push(DirectiveBlock::from_pairs([("config", "speech_on")]));
    }

    if text.contains(SPEECH_OFF) {
        ui.emit(UiSignal::SpeechOff);
        runs.push(DirectiveBlock::from_pairs([("config", "speech_off")]));
    }

    (text, runs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::{AppEntry, AppRegistry};
    use crate::launch::RecordingUi;

    fn registry() -> AppRegistry {
        AppRegistry::new(vec![AppEntry {
            name: "Spotify".to_string(),
            code: "spotify".to_string(),
            path: "/opt/spotify".to_string(),
            args: vec![],
        }])
    }

    #[test]
    fn test_list_apps_replaced() {
        let ui = RecordingUi::new();
        let (text, runs) = quick_commands("Here you go:\n@cmd[meta=list_apps]", &registry(), &ui);
        assert_eq!(text, "Here you go:\n**Supported Apps:**\n• **Spotify**\n");
        assert!(runs.is_empty());
        assert!(ui.signals().is_empty());
    }

    #[test]
    fn test_list_apps_empty_registry() {
        let (text, _) = quick_commands(LIST_APPS, &AppRegistry::empty(), &RecordingUi::new());
        assert_eq!(text, "**Supported Apps:**\nNo apps configured.");
    }

    #[test]
    fn test_list_commands_replaced() {
        let (text, runs) = quick_commands(LIST_COMMANDS, &registry(), &RecordingUi::new());
        assert_eq!(text, COMMAND_LIST);
        assert!(runs.is_empty());
    }

    #[test]
    fn test_ui_markers_signal_and_record() {
        let ui = RecordingUi::new();
        let input = "Bye @cmd[config=speech_off] @cmd[action=Exit] @cmd[action=clear_data]";
        let (text, runs) = quick_commands(input, &registry(), &ui);
        assert_eq!(text, input);
        assert_eq!(
            ui.signals(),
            vec![UiSignal::ConfirmClearHistory, UiSignal::Exit, UiSignal::SpeechOff]
        );
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].get("action"), Some("Exit"));
        assert_eq!(runs[1].get("config"), Some("speech_off"));
    }

    #[test]
    fn test_markers_are_exact() {
        let ui = RecordingUi::new();
        let (text, runs) = quick_commands("@cmd[meta = list_apps] @cmd[action=exit]", &registry(), &ui);
        assert_eq!(text, "@cmd[meta = list_apps] @cmd[action=exit]");
        assert!(runs.is_empty());
        assert!(ui.signals().is_empty());
    }
}
