//! DirectiveBlock - one parsed `@cmd[...]` span

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Matches one directive span; group 1 is the body.
pub static DIRECTIVE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)@cmd\[(.*?)\]").expect("directive pattern is valid"));

/// Ordered key/value fields of a single directive.
///
/// Keys are lower-cased on insert; values keep their original casing. Re-inserting a
/// key replaces its value but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DirectiveBlock {
    fields: IndexMap<String, String>,
}

impl DirectiveBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a block from raw pairs, normalizing keys the same way the extractor does.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut block = Self::new();
        for (key, value) in pairs {
            block.insert(key.as_ref(), value);
        }
        block
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.fields.insert(key.trim().to_lowercase(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Compact `key=value, ...` rendering used in logs and summaries.
    pub fn describe(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
