//! Directive extraction
//!
//! Fields are split on top-level commas only. A brace-depth counter protects
//! list values like `url={a, b}`; unbalanced braces never fail, they only change
//! where splits happen.

use super::block::{DirectiveBlock, DIRECTIVE_PATTERN};
use std::ops::Range;

/// Extract every directive in document order.
///
/// Each span yields one block, even when no field in it is valid.
pub fn extract(text: &str) -> Vec<DirectiveBlock> {
    DIRECTIVE_PATTERN
        .captures_iter(text)
        .map(|caps| {
            let body = caps.get(1).map_or("", |m| m.as_str());
            parse_body(body)
        })
        .collect()
}

/// Byte ranges of every directive span, in document order.
pub fn spans(text: &str) -> Vec<Range<usize>> {
    DIRECTIVE_PATTERN
        .find_iter(text)
        .map(|m| m.range())
        .collect()
}

/// Split a span body on commas at brace depth zero.
///
/// Parts are trimmed; a trailing empty part is dropped.
pub fn split_fields(body: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;

    for ch in body.chars() {
        match ch {
            '{' => depth += 1,
            '}' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }

    let last = current.trim();
    if !last.is_empty() {
        parts.push(last.to_string());
    }
    parts
}

fn parse_body(body: &str) -> DirectiveBlock {
    let mut block = DirectiveBlock::new();
    for part in split_fields(body) {
        // Fields without '=' are dropped
        if let Some((key, value)) = part.split_once('=') {
            block.insert(key, value.trim());
        }
    }
    block
}
