//! Display-text cleaning

use super::block::DIRECTIVE_PATTERN;
use once_cell::sync::Lazy;
use regex::Regex;

static BLANK_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{2,}").expect("blank-run pattern is valid"));

/// Remove every directive span, collapse blank-line runs and trim.
///
/// Removal repeats until no span is left: dropping one span can join the text on
/// either side into a new `@cmd[...]`.
pub fn clean(text: &str) -> String {
    let mut current = text.to_string();
    while DIRECTIVE_PATTERN.is_match(&current) {
        current = DIRECTIVE_PATTERN.replace_all(&current, "").into_owned();
    }
    BLANK_RUNS.replace_all(&current, "\n").trim().to_string()
}
