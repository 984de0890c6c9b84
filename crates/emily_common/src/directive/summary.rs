//! Run summaries for display and speech

use super::block::DirectiveBlock;
use super::kind::link_candidates;
use crate::apps::AppLookup;
use once_cell::sync::Lazy;
use regex::Regex;

const RESULTS_HEADER: &str = "\n\n---\n\n## **Commands Results:**\n\n";

/// Markdown section listing what ran, appended under the cleaned reply.
/// Empty when nothing ran.
pub fn render_runs(executed: &[DirectiveBlock], apps: &dyn AppLookup) -> String {
    if executed.is_empty() {
        return String::new();
    }

    let lines: Vec<String> = executed
        .iter()
        .flat_map(|run| run_lines(run, apps))
        .collect();
    format!("{}{}", RESULTS_HEADER, lines.join("\n"))
}

fn run_lines(run: &DirectiveBlock, apps: &dyn AppLookup) -> Vec<String> {
    let kind = run.get("type");

    if let (Some("open"), Some(codes)) = (kind, run.get("app")) {
        let names: Vec<&str> = codes
            .split('|')
            .map(str::trim)
            .map(|code| apps.lookup(code).map_or(code, |entry| entry.display_name()))
            .collect();
        return vec![format!("* **Opened App**: {}", names.join(", "))];
    }

    // A brace list shows one line per URL; a single value is shown as written.
    if let (Some("link"), Some(url)) = (kind, run.get("url")) {
        let shown = if url.starts_with('{') && url.ends_with('}') {
            link_candidates(url)
        } else {
            vec![url.to_string()]
        };
        return shown
            .into_iter()
            .map(|u| format!("* **Opened Link**: [{0}]({0})", u))
            .collect();
    }

    if kind == Some("home") {
        return vec![format!(
            "* **Home Assistant**: {} on {}",
            run.get("action").unwrap_or(""),
            run.get("entity").unwrap_or("")
        )];
    }

    let line = match (run.get("action"), run.get("config"), run.get("meta")) {
        (Some("clear_data"), _, _) => "* **Clear Data**: Chat history cleared".to_string(),
        (Some("Exit"), _, _) => "* **Exit**: Application closed".to_string(),
        (_, Some("speech_on"), _) => "* **Voice Mode**: Enabled".to_string(),
        (_, Some("speech_off"), _) => "* **Voice Mode**: Disabled".to_string(),
        (_, _, Some("list_commands")) => "* **Meta**: Command list displayed".to_string(),
        _ => format!(
            "* **Command**: {}",
            serde_json::to_string(run).unwrap_or_else(|_| run.describe())
        ),
    };
    vec![line]
}

static NON_SPEECH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[^\w\s,.!?'":-]"#).expect("speech filter pattern is valid"));
static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Plain single-line text for a TTS collaborator: no markdown emphasis, no symbols.
pub fn speech_text(text: &str) -> String {
    let stripped = text.replace("**", "");
    let filtered = NON_SPEECH.replace_all(&stripped, "");
    let flat = filtered.replace('\n', " ");
    WHITESPACE.replace_all(&flat, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::{AppEntry, AppRegistry};

    fn apps() -> AppRegistry {
        AppRegistry::new(vec![AppEntry {
            name: "Visual Studio Code".to_string(),
            code: "code".to_string(),
            path: "/bin/code".to_string(),
            args: vec![],
        }])
    }

    fn run(pairs: &[(&str, &str)]) -> DirectiveBlock {
        DirectiveBlock::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_empty_runs_render_nothing() {
        assert_eq!(render_runs(&[], &apps()), "");
    }

    #[test]
    fn test_render_mixed_runs() {
        let runs = vec![
            run(&[("type", "open"), ("app", "code|other")]),
            run(&[("type", "link"), ("url", "{https://a.com, https://b.com}")]),
            run(&[("type", "home"), ("action", "turn_on"), ("entity", "light.desk")]),
            run(&[("config", "speech_on")]),
            run(&[("action", "logout")]),
        ];
        let rendered = render_runs(&runs, &apps());
        assert!(rendered.starts_with(RESULTS_HEADER));
        let body: Vec<&str> = rendered[RESULTS_HEADER.len()..].lines().collect();
        assert_eq!(
            body,
            vec![
                "* **Opened App**: Visual Studio Code, other",
                "* **Opened Link**: [https://a.com](https://a.com)",
                "* **Opened Link**: [https://b.com](https://b.com)",
                "* **Home Assistant**: turn_on on light.desk",
                "* **Voice Mode**: Enabled",
                r#"* **Command**: {"action":"logout"}"#,
            ]
        );
    }

    #[test]
    fn test_single_link_rendered_as_written() {
        let runs = vec![run(&[("type", "link"), ("url", "'https://a.com'")])];
        let rendered = render_runs(&runs, &apps());
        assert_eq!(
            &rendered[RESULTS_HEADER.len()..],
            "* **Opened Link**: ['https://a.com']('https://a.com')"
        );
    }

    #[test]
    fn test_speech_text() {
        let text = "**Done!** Opened 2 apps 🎉\n\n(see #list) — ok?";
        assert_eq!(speech_text(text), "Done! Opened 2 apps see list ok?");
    }
}
