use once_cell::sync::Lazy;
use regex::Regex;

use super::ContextStore;

static VOLTAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\+?[0-9]+\.?[0-9]*V").expect("valid regex"));
static COMPONENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z]{2,}\d+[A-Z0-9\-]*\b").expect("valid regex"));
static PROTOCOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(I2C|SPI|UART|CAN|USB)\b").expect("valid regex"));
static COMMAND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(bit\.|test\.|check\.)\w+").expect("valid regex"));

const MAX_COMPONENT_TERMS: usize = 5;
const MAX_TERMS: usize = 10;
const HITS_PER_TERM: usize = 2;
const MAX_CONTEXT_LINES: usize = 20;
const SNIPPET_CHARS: usize = 200;

/// Search terms pulled out of serialized entities, first occurrence wins.
pub fn extract_search_terms(entities_text: &str) -> Vec<String> {
    let upper = entities_text.to_uppercase();
    let lower = entities_text.to_lowercase();

    let mut terms: Vec<String> = Vec::new();
    terms.extend(VOLTAGE.find_iter(&upper).map(|m| m.as_str().to_string()));
    terms.extend(
        COMPONENT
            .find_iter(&upper)
            .take(MAX_COMPONENT_TERMS)
            .map(|m| m.as_str().to_string()),
    );
    terms.extend(PROTOCOL.find_iter(&upper).map(|m| m.as_str().to_string()));
    terms.extend(COMMAND.find_iter(&lower).map(|m| m.as_str().to_string()));

    let mut unique = Vec::new();
    for term in terms {
        if !unique.contains(&term) {
            unique.push(term);
        }
    }
    unique.truncate(MAX_TERMS);
    unique
}

fn snippet(text: &str) -> String {
    if text.chars().count() > SNIPPET_CHARS {
        let head: String = text.chars().take(SNIPPET_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Build the context blob handed to the LLM. Store failures are logged and
/// treated as "no context".
pub fn search_context_for_entities(store: &dyn ContextStore, entities_text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for term in extract_search_terms(entities_text) {
        let hits = match store.query(&term, HITS_PER_TERM) {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!("Context search failed for '{}': {}", term, e);
                continue;
            }
        };
        for hit in hits {
            let line = format!("[{}] {}", hit.name(), snippet(&hit.text));
            if !lines.contains(&line) {
                lines.push(line);
            }
        }
    }
    lines.truncate(MAX_CONTEXT_LINES);
    lines.join("\n")
}
