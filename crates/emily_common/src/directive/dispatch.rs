//! Directive dispatcher
//!
//! Runs the side effect for each classified block and builds the audit list.
//! Failure isolation is per directive: nothing here returns an error, and a
//! failing side effect never stops the remaining directives.

use super::block::DirectiveBlock;
use super::clean::clean;
use super::extract::extract;
use super::kind::{is_web_url, Directive, HomeCall};
use super::quick::quick_commands;
use crate::apps::AppLookup;
use crate::home_assistant::HomeAutomation;
use crate::launch::{Launcher, UiSignals, UrlOpener};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Capability handles passed explicitly into each dispatch call.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub apps: &'a dyn AppLookup,
    pub launcher: &'a dyn Launcher,
    pub urls: &'a dyn UrlOpener,
    /// `None` when Home Assistant is disabled; home directives are then recorded but not sent
    pub home: Option<&'a dyn HomeAutomation>,
    pub ui: &'a dyn UiSignals,
}

/// Why a side effect did not happen (or did not succeed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnknownApp,
    LaunchFailed,
    NotAUrl,
    IncompleteHome,
    HomeNotConfigured,
    HomeCallFailed,
    Unrecognized,
}

/// One skipped or failed step, tied to the block's position in extraction order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub index: usize,
    pub kind: DiagnosticKind,
    pub detail: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchOutcome {
    /// Audit list: every block that reached a handler, in order
    pub executed: Vec<DirectiveBlock>,
    /// Informational only; never affects `executed`
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of processing one model reply.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessedResponse {
    /// Reply text with every directive removed
    pub cleaned: String,
    /// Quick-command runs followed by dispatched directives
    pub executed: Vec<DirectiveBlock>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Dispatch blocks in order.
pub fn dispatch(
    blocks: impl IntoIterator<Item = DirectiveBlock>,
    ctx: &Collaborators<'_>,
) -> DispatchOutcome {
    let mut outcome = DispatchOutcome::default();

    for (index, block) in blocks.into_iter().enumerate() {
        let directive = Directive::classify(&block);
        debug!(index, kind = directive.label(), block = %block.describe(), "Dispatching directive");

        let mut report = |kind: DiagnosticKind, detail: String| {
            outcome.diagnostics.push(Diagnostic { index, kind, detail });
        };
        let recorded = directive.is_recorded();

        match directive {
            Directive::Open { codes } => open_apps(&codes, ctx, &mut report),
            Directive::Link { urls } => open_links(&urls, ctx, &mut report),
            Directive::Session(action) => {
                debug!(action = action.as_str(), "Session action left to the UI");
            }
            Directive::Meta(meta) => debug!(meta, "Meta directive"),
            Directive::Home(Some(call)) => call_home(&call, ctx, &mut report),
            Directive::Home(None) => {
                warn!(block = %block.describe(), "Invalid home command: entity and action required");
                report(
                    DiagnosticKind::IncompleteHome,
                    "entity and action are required".to_string(),
                );
            }
            Directive::Unrecognized => {
                debug!(block = %block.describe(), "No handler for directive, dropped");
                report(DiagnosticKind::Unrecognized, block.describe());
            }
        }

        if recorded {
            outcome.executed.push(block);
        }
    }

    outcome
}

fn open_apps(
    codes: &[&str],
    ctx: &Collaborators<'_>,
    report: &mut impl FnMut(DiagnosticKind, String),
) {
    for &code in codes {
        let Some(entry) = ctx.apps.lookup(code) else {
            warn!(code, "Unknown app code");
            report(DiagnosticKind::UnknownApp, code.to_string());
            continue;
        };

        let ok = ctx.launcher.launch_detached(&entry.path, &entry.args);
        if ok {
            info!(code, path = %entry.path, "Launched app");
        } else {
            warn!(code, path = %entry.path, "Launch failed");
            report(DiagnosticKind::LaunchFailed, code.to_string());
        }
    }
}

fn open_links(
    urls: &[String],
    ctx: &Collaborators<'_>,
    report: &mut impl FnMut(DiagnosticKind, String),
) {
    for url in urls {
        if is_web_url(url) {
            ctx.urls.open_url(url);
        } else {
            debug!(value = %url, "Skipped non-URL value");
            report(DiagnosticKind::NotAUrl, url.clone());
        }
    }
}

// The call's result is logged and reported, the audit entry is kept either way.
fn call_home(
    call: &HomeCall,
    ctx: &Collaborators<'_>,
    report: &mut impl FnMut(DiagnosticKind, String),
) {
    let Some(home) = ctx.home else {
        warn!(entity = %call.entity, action = %call.action, "Home Assistant not configured");
        report(DiagnosticKind::HomeNotConfigured, call.entity.clone());
        return;
    };

    match home.call_service(&call.entity, &call.action, &call.params) {
        Ok(()) => info!(entity = %call.entity, action = %call.action, "Home Assistant call OK"),
        Err(e) => {
            warn!(entity = %call.entity, action = %call.action, error = %e, "Home Assistant call failed");
            report(
                DiagnosticKind::HomeCallFailed,
                format!("{} {}: {}", call.action, call.entity, e),
            );
        }
    }
}

/// Full pipeline for one reply: quick commands, dispatch, clean.
pub fn process_response(text: &str, ctx: &Collaborators<'_>) -> ProcessedResponse {
    let (rewritten, mut executed) = quick_commands(text, ctx.apps, ctx.ui);
    let outcome = dispatch(extract(&rewritten), ctx);
    executed.extend(outcome.executed);

    let response = ProcessedResponse {
        cleaned: clean(&rewritten),
        executed,
        diagnostics: outcome.diagnostics,
    };
    info!(
        executed = response.executed.len(),
        diagnostics = response.diagnostics.len(),
        "Processed reply directives"
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::{AppEntry, AppRegistry};
    use crate::home_assistant::{FakeHomeAssistant, HomeAssistantError};
    use crate::launch::{NoUi, RecordingUi, UiSignal};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        launches: Mutex<Vec<String>>,
        urls: Mutex<Vec<String>>,
    }

    impl Launcher for Recorder {
        fn launch_detached(&self, path: &str, _args: &[String]) -> bool {
            self.launches.lock().unwrap().push(path.to_string());
            !path.contains("broken")
        }
    }

    impl UrlOpener for Recorder {
        fn open_url(&self, url: &str) {
            self.urls.lock().unwrap().push(url.to_string());
        }
    }

    fn registry() -> AppRegistry {
        let entry = |code: &str, path: &str| AppEntry {
            name: code.to_uppercase(),
            code: code.to_string(),
            path: path.to_string(),
            args: vec![],
        };
        AppRegistry::new(vec![entry("code", "/bin/code"), entry("bad", "/bin/broken")])
    }

    fn ctx<'a>(
        apps: &'a AppRegistry,
        rec: &'a Recorder,
        home: Option<&'a dyn HomeAutomation>,
    ) -> Collaborators<'a> {
        Collaborators {
            apps,
            launcher: rec,
            urls: rec,
            home,
            ui: &NoUi,
        }
    }

    #[test]
    fn test_multi_app_partial_failure_recorded_once() {
        let apps = registry();
        let rec = Recorder::default();
        let out = dispatch(
            extract("@cmd[type=open, app=code|missing|bad]"),
            &ctx(&apps, &rec, None),
        );
        assert_eq!(out.executed.len(), 1);
        assert_eq!(*rec.launches.lock().unwrap(), vec!["/bin/code", "/bin/broken"]);
        let kinds: Vec<_> = out.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![DiagnosticKind::UnknownApp, DiagnosticKind::LaunchFailed]);
    }

    #[test]
    fn test_link_filters_non_urls() {
        let apps = registry();
        let rec = Recorder::default();
        let out = dispatch(
            extract("@cmd[type=link, url={https://a.com, notepad, 'http://b.com'}]"),
            &ctx(&apps, &rec, None),
        );
        assert_eq!(*rec.urls.lock().unwrap(), vec!["https://a.com", "http://b.com"]);
        assert_eq!(out.executed.len(), 1);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::NotAUrl);
    }

    #[test]
    fn test_link_with_no_valid_url_still_recorded() {
        let apps = registry();
        let rec = Recorder::default();
        let out = dispatch(extract("@cmd[type=link, url=ftp://x]"), &ctx(&apps, &rec, None));
        assert!(rec.urls.lock().unwrap().is_empty());
        assert_eq!(out.executed.len(), 1);
    }

    #[test]
    fn test_session_and_meta_recorded_without_effects() {
        let apps = registry();
        let rec = Recorder::default();
        let out = dispatch(
            extract("@cmd[action=logout] @cmd[meta=status] @cmd[action=clear_data]"),
            &ctx(&apps, &rec, None),
        );
        assert_eq!(out.executed.len(), 3);
        assert!(rec.launches.lock().unwrap().is_empty());
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_home_call_forwarded() {
        let apps = registry();
        let rec = Recorder::default();
        let fake = FakeHomeAssistant::default();
        let out = dispatch(
            extract("@cmd[type=home, action=turn_on, entity=light.desk, brightness=120, color_name=blue]"),
            &ctx(&apps, &rec, Some(&fake)),
        );
        assert_eq!(out.executed.len(), 1);
        let calls = fake.calls();
        assert_eq!(calls.len(), 1);
        let (entity, action, params) = &calls[0];
        assert_eq!(entity, "light.desk");
        assert_eq!(action, "turn_on");
        assert_eq!(params["brightness"], serde_json::json!(120));
        assert_eq!(params["color_name"], serde_json::json!("blue"));
    }

    #[test]
    fn test_home_failure_still_recorded() {
        let apps = registry();
        let rec = Recorder::default();
        let fake = FakeHomeAssistant::failing(HomeAssistantError::Status(500));
        let out = dispatch(
            extract("@cmd[type=home, action=turn_off, entity=switch.fan] @cmd[type=open, app=code]"),
            &ctx(&apps, &rec, Some(&fake)),
        );
        assert_eq!(out.executed.len(), 2);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::HomeCallFailed);
        assert_eq!(rec.launches.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_home_without_client_recorded() {
        let apps = registry();
        let rec = Recorder::default();
        let out = dispatch(
            extract("@cmd[type=home, action=turn_on, entity=light.desk]"),
            &ctx(&apps, &rec, None),
        );
        assert_eq!(out.executed.len(), 1);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::HomeNotConfigured);
    }

    #[test]
    fn test_unrecognized_dropped() {
        let apps = registry();
        let rec = Recorder::default();
        let out = dispatch(
            extract("@cmd[] @cmd[foo=bar] @cmd[config=speech_on]"),
            &ctx(&apps, &rec, None),
        );
        assert!(out.executed.is_empty());
        assert_eq!(out.diagnostics.len(), 3);
        assert_eq!(out.diagnostics[2].index, 2);
    }

    #[test]
    fn test_process_response_combines_runs() {
        let apps = registry();
        let rec = Recorder::default();
        let ui = RecordingUi::new();
        let collaborators = Collaborators {
            apps: &apps,
            launcher: &rec,
            urls: &rec,
            home: None,
            ui: &ui,
        };
        let text = "Turning voice on.\n\n@cmd[config=speech_on]\n\n@cmd[type=open, app=code]";
        let response = process_response(text, &collaborators);
        assert_eq!(response.cleaned, "Turning voice on.");
        assert_eq!(response.executed.len(), 2);
        assert_eq!(response.executed[0].get("config"), Some("speech_on"));
        assert_eq!(response.executed[1].get("app"), Some("code"));
        assert_eq!(ui.signals(), vec![UiSignal::SpeechOn]);
    }
}
