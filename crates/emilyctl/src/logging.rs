//! Logging for emilyctl
//!
//! Diagnostics go to stderr through `tracing`. Each processed reply also appends
//! one JSONL turn record with a fallback chain for the file location.

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `RUST_LOG` overrides the configured level.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Turn record for each processed reply
#[derive(Debug, Serialize, Deserialize)]
pub struct TurnLog {
    /// ISO 8601 timestamp
    pub ts: String,

    /// Request ID (UUID)
    pub req_id: String,

    /// Command name
    pub command: String,

    /// Whether side effects were suppressed
    pub dry_run: bool,

    /// Number of directives recorded as executed
    pub executed: usize,

    /// `key=value` rendering of each executed directive
    #[serde(default)]
    pub directives: Vec<String>,

    /// Number of skipped or failed side effects
    pub diagnostics: usize,

    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl TurnLog {
    /// Discover log file path with fallback chain
    ///
    /// Priority:
    /// 1. $EMILYCTL_LOG_FILE environment variable (explicit override)
    /// 2. $XDG_STATE_HOME/emily/turns.jsonl (XDG standard)
    /// 3. ~/.local/state/emily/turns.jsonl (XDG fallback)
    pub fn discover_log_path() -> Option<String> {
        if let Ok(path) = std::env::var("EMILYCTL_LOG_FILE") {
            return Some(path);
        }

        if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
            return Some(format!("{}/emily/turns.jsonl", xdg_state));
        }

        if let Ok(home) = std::env::var("HOME") {
            return Some(format!("{}/.local/state/emily/turns.jsonl", home));
        }

        None
    }

    /// Write the record to the log file; silently skipped when no file is usable
    pub fn write(&self) -> Result<(), std::io::Error> {
        let json = serde_json::to_string(self)?;

        match Self::discover_log_path() {
            Some(path) => {
                if let Err(e) = Self::write_to_file(&json, &path) {
                    tracing::debug!(path = %path, error = %e, "Turn log not written");
                }
            }
            None => tracing::debug!("No turn log location available"),
        }
        Ok(())
    }

    /// Attempt to write log entry to file
    pub fn write_to_file(json: &str, path: &str) -> Result<(), std::io::Error> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;

        writeln!(file, "{}", json)?;
        Ok(())
    }

    /// Generate request ID
    pub fn generate_req_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Get current timestamp in ISO 8601 format
    pub fn now() -> String {
        chrono::Utc::now().to_rfc3339()
    }
}
