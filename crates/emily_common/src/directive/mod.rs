//! Directive mini-language
//!
//! Wire syntax: `@cmd[key1=value1, key2={a, b}]`, prefix matched case-insensitively,
//! body ends at the first `]` and may span lines.
//!
//! Pipeline per model reply:
//! quick-command pre-pass -> extract -> classify + dispatch -> clean.

pub mod block;
pub mod clean;
pub mod dispatch;
pub mod extract;
pub mod kind;
pub mod quick;
pub mod summary;

pub use block::{DirectiveBlock, DIRECTIVE_PATTERN};
pub use clean::clean;
pub use dispatch::{
    dispatch, process_response, Collaborators, Diagnostic, DiagnosticKind, DispatchOutcome,
    ProcessedResponse,
};
pub use extract::{extract, spans, split_fields};
pub use kind::{Directive, HomeCall, SessionAction};
pub use quick::quick_commands;
pub use summary::{render_runs, speech_text};
