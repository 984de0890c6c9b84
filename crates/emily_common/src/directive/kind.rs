//! Directive classification
//!
//! Each block resolves once to a `Directive`. Precedence, first match wins:
//! `type=open`, `type=link`, `action` in {logout, clear_data}, `meta` present,
//! `type=home`, otherwise unrecognized. Discriminant values are case-sensitive.

use super::block::DirectiveBlock;
use serde_json::{Map, Value};

/// Session-level actions the UI must confirm itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Logout,
    ClearData,
}

impl SessionAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "logout" => Some(SessionAction::Logout),
            "clear_data" => Some(SessionAction::ClearData),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionAction::Logout => "logout",
            SessionAction::ClearData => "clear_data",
        }
    }
}

/// A validated Home Assistant service call.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeCall {
    pub entity: String,
    pub action: String,
    /// Extra service data; integers where the raw value parses as one.
    pub params: Map<String, Value>,
}

impl HomeCall {
    const RESERVED: [&'static str; 3] = ["type", "entity", "action"];

    /// Build a call from a `type=home` block; `None` when entity or action is empty.
    pub fn from_block(block: &DirectiveBlock) -> Option<Self> {
        let entity = block.get("entity").filter(|v| !v.is_empty())?;
        let action = block.get("action").filter(|v| !v.is_empty())?;

        let params = block
            .iter()
            .filter(|(k, _)| !Self::RESERVED.contains(k))
            .map(|(k, v)| (k.to_string(), cast_param(v)))
            .collect();

        Some(Self {
            entity: entity.to_string(),
            action: action.to_string(),
            params,
        })
    }

    /// Service domain: the entity id up to its first '.'.
    pub fn domain(&self) -> &str {
        entity_domain(&self.entity)
    }
}

/// Domain prefix of an entity id (`light.kitchen` -> `light`).
pub fn entity_domain(entity: &str) -> &str {
    entity.split('.').next().unwrap_or(entity)
}

/// Integer when the value reads as a decimal integer literal, otherwise the original
/// string. Accepts surrounding whitespace, a sign and single `_` between digits.
/// Magnitudes past the `i64`/`u64` range stay strings.
pub fn cast_param(value: &str) -> Value {
    if let Some(digits) = integer_literal(value) {
        if let Ok(n) = digits.parse::<i64>() {
            return Value::from(n);
        }
        if let Ok(n) = digits.parse::<u64>() {
            return Value::from(n);
        }
    }
    Value::String(value.to_string())
}

fn integer_literal(value: &str) -> Option<String> {
    let trimmed = value.trim();
    let (sign, body) = match trimmed.as_bytes().first() {
        Some(b'-') => ("-", &trimmed[1..]),
        Some(b'+') => ("", &trimmed[1..]),
        _ => ("", trimmed),
    };

    let well_formed = !body.is_empty()
        && !body.starts_with('_')
        && !body.ends_with('_')
        && !body.contains("__")
        && body.chars().all(|c| c.is_ascii_digit() || c == '_');
    if !well_formed {
        return None;
    }

    let digits: String = body.chars().filter(|c| *c != '_').collect();
    Some(format!("{}{}", sign, digits))
}

/// The resolved meaning of one directive block.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive<'a> {
    /// Launch one or more registry apps (`app=a|b`).
    Open { codes: Vec<&'a str> },
    /// Open URL candidates; non-web values are filtered at dispatch.
    Link { urls: Vec<String> },
    Session(SessionAction),
    Meta(&'a str),
    /// `None` when entity or action is missing.
    Home(Option<HomeCall>),
    Unrecognized,
}

impl<'a> Directive<'a> {
    pub fn classify(block: &'a DirectiveBlock) -> Self {
        let kind = block.get("type");

        if kind == Some("open") {
            let codes = block
                .get("app")
                .unwrap_or("")
                .split('|')
                .map(str::trim)
                .collect();
            return Directive::Open { codes };
        }

        if kind == Some("link") {
            return Directive::Link {
                urls: link_candidates(block.get("url").unwrap_or("")),
            };
        }

        if let Some(action) = block.get("action").and_then(SessionAction::parse) {
            return Directive::Session(action);
        }

        if let Some(meta) = block.get("meta") {
            return Directive::Meta(meta);
        }

        if kind == Some("home") {
            return Directive::Home(HomeCall::from_block(block));
        }

        Directive::Unrecognized
    }

    pub fn label(&self) -> &'static str {
        match self {
            Directive::Open { .. } => "open",
            Directive::Link { .. } => "link",
            Directive::Session(_) => "session",
            Directive::Meta(_) => "meta",
            Directive::Home(_) => "home",
            Directive::Unrecognized => "unrecognized",
        }
    }

    /// Whether a block of this kind belongs in the audit list.
    pub fn is_recorded(&self) -> bool {
        !matches!(self, Directive::Unrecognized)
    }
}

const QUOTES: [char; 2] = ['\'', '"'];

/// URL candidates from a `url` value: a brace-wrapped comma list or a single value.
pub fn link_candidates(raw: &str) -> Vec<String> {
    if raw.len() >= 2 && raw.starts_with('{') && raw.ends_with('}') {
        raw[1..raw.len() - 1]
            .split(',')
            .map(|part| part.trim().trim_matches(&QUOTES[..]))
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect()
    } else {
        vec![raw
            .trim_matches(|c: char| c == ' ' || QUOTES.contains(&c))
            .to_string()]
    }
}

/// Only `http://` and `https://` targets are handed to the OS.
pub fn is_web_url(candidate: &str) -> bool {
    let lower = candidate.to_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(pairs: &[(&str, &str)]) -> DirectiveBlock {
        DirectiveBlock::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_open_splits_codes() {
        let b = block(&[("type", "open"), ("app", "code | spotify|")]);
        assert_eq!(
            Directive::classify(&b),
            Directive::Open {
                codes: vec!["code", "spotify", ""]
            }
        );
    }

    #[test]
    fn test_link_brace_list() {
        let urls = link_candidates("{ 'https://a.com', \"https://b.com\" , }");
        assert_eq!(urls, vec!["https://a.com", "https://b.com"]);
    }

    #[test]
    fn test_link_single_trims_quotes() {
        assert_eq!(link_candidates(" 'https://a.com' "), vec!["https://a.com"]);
    }

    #[test]
    fn test_is_web_url() {
        assert!(is_web_url("HTTPS://Example.com"));
        assert!(is_web_url("http://x"));
        assert!(!is_web_url("ftp://x"));
        assert!(!is_web_url("notepad"));
    }

    #[test]
    fn test_session_beats_home() {
        let b = block(&[("type", "home"), ("action", "logout")]);
        assert_eq!(
            Directive::classify(&b),
            Directive::Session(SessionAction::Logout)
        );
    }

    #[test]
    fn test_meta_any_value() {
        let b = block(&[("meta", "")]);
        assert_eq!(Directive::classify(&b), Directive::Meta(""));
    }

    #[test]
    fn test_home_params_cast() {
        let b = block(&[
            ("type", "home"),
            ("action", "turn_on"),
            ("entity", "light.desk"),
            ("brightness", "180"),
            ("color_name", "red"),
            ("offset", "-3"),
        ]);
        let Directive::Home(Some(call)) = Directive::classify(&b) else {
            panic!("expected home call");
        };
        assert_eq!(call.domain(), "light");
        assert_eq!(call.params["brightness"], Value::from(180));
        assert_eq!(call.params["color_name"], Value::from("red"));
        assert_eq!(call.params["offset"], Value::from(-3));
        assert!(!call.params.contains_key("type"));
        assert!(!call.params.contains_key("entity"));
    }

    #[test]
    fn test_cast_param_integer_literals() {
        assert_eq!(cast_param("1_000"), Value::from(1000));
        assert_eq!(cast_param(" +42 "), Value::from(42));
        assert_eq!(cast_param("18446744073709551615"), Value::from(u64::MAX));
        assert_eq!(
            cast_param("99999999999999999999"),
            Value::from("99999999999999999999")
        );
        assert_eq!(cast_param("1__0"), Value::from("1__0"));
        assert_eq!(cast_param("_1"), Value::from("_1"));
        assert_eq!(cast_param("-"), Value::from("-"));
        assert_eq!(cast_param("1.5"), Value::from("1.5"));
    }

    #[test]
    fn test_meta_beats_home() {
        let b = block(&[
            ("type", "home"),
            ("meta", "list_apps"),
            ("entity", "light.desk"),
            ("action", "turn_on"),
        ]);
        assert_eq!(Directive::classify(&b), Directive::Meta("list_apps"));
    }

    #[test]
    fn test_home_missing_entity() {
        let b = block(&[("type", "home"), ("action", "turn_on")]);
        assert_eq!(Directive::classify(&b), Directive::Home(None));
        assert!(Directive::classify(&b).is_recorded());
    }

    #[test]
    fn test_config_and_empty_unrecognized() {
        assert_eq!(
            Directive::classify(&block(&[("config", "speech_on")])),
            Directive::Unrecognized
        );
        assert_eq!(
            Directive::classify(&DirectiveBlock::new()),
            Directive::Unrecognized
        );
        assert_eq!(
            Directive::classify(&block(&[("type", "Open"), ("app", "x")])),
            Directive::Unrecognized
        );
    }
}
