//! App registry - launchable programs the assistant may open by code
//!
//! Sourced from the JSON blob the settings UI stores:
//! `{"apps": [{"name": "...", "code": "...", "path": "...", "arguments": [...]}]}`

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// One launchable program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppEntry {
    /// Display name; falls back to the code when absent
    #[serde(default)]
    pub name: String,
    pub code: String,
    pub path: String,
    #[serde(default, rename = "arguments")]
    pub args: Vec<String>,
}

impl AppEntry {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.code
        } else {
            &self.name
        }
    }
}

/// App registry errors
#[derive(Debug, thiserror::Error)]
pub enum AppRegistryError {
    #[error("Failed to read app registry {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid app registry JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Read access to the registry, keyed by code.
pub trait AppLookup {
    fn lookup(&self, code: &str) -> Option<&AppEntry>;

    /// All entries in configuration order.
    fn entries(&self) -> &[AppEntry];
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    apps: Vec<AppEntry>,
}

/// In-memory registry built from the JSON blob.
#[derive(Debug, Clone, Default)]
pub struct AppRegistry {
    entries: Vec<AppEntry>,
    by_code: HashMap<String, usize>,
}

impl AppRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(entries: Vec<AppEntry>) -> Self {
        let by_code = entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (entry.code.clone(), idx))
            .collect();
        Self { entries, by_code }
    }

    /// Parse the registry blob. Later duplicates of a code win on lookup.
    pub fn from_json(json: &str) -> Result<Self, AppRegistryError> {
        if json.trim().is_empty() {
            return Ok(Self::empty());
        }
        let file: RegistryFile = serde_json::from_str(json)?;
        Ok(Self::new(file.apps))
    }

    pub fn load(path: &Path) -> Result<Self, AppRegistryError> {
        let content = fs::read_to_string(path).map_err(|source| AppRegistryError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AppLookup for AppRegistry {
    fn lookup(&self, code: &str) -> Option<&AppEntry> {
        self.by_code.get(code).map(|&idx| &self.entries[idx])
    }

    fn entries(&self) -> &[AppEntry] {
        &self.entries
    }
}
