//! Emily Common - directive engine and collaborators for the Emily assistant shell
//!
//! Model replies may embed `@cmd[...]` directives. This crate extracts them, runs the
//! matching local side effects through explicit capability handles, and hands back the
//! reply with every directive removed plus the list of what ran.

pub mod apps;
pub mod config;
pub mod directive;
pub mod home_assistant;
pub mod launch;
pub mod session;

pub use apps::{AppEntry, AppLookup, AppRegistry, AppRegistryError};
pub use config::{ConfigError, EmilyConfig};
pub use directive::{
    clean, dispatch, extract, process_response, quick_commands, render_runs, Collaborators,
    Diagnostic, DiagnosticKind, Directive, DirectiveBlock, DispatchOutcome, ProcessedResponse,
};
pub use home_assistant::{
    render_commands, synthesize_commands, FakeHomeAssistant, HomeAssistantError,
    HomeAssistantSettings, HomeAutomation, HomeCatalog, HomeCatalogSource, HttpHomeAssistant,
};
pub use launch::{
    DetachedLauncher, DryRun, Launcher, NoUi, RecordingUi, SystemUrlOpener, UiSignal, UiSignals,
    UrlOpener,
};
pub use session::{HomeCommands, SetupContext};

/// Prefix marking assistant-internal messages and diagnostics the model must not echo.
pub const SYSTEM_MARKER: &str = "::SYSTEM2D2F4G5S3D::";
