//! Keyword Extractor: heuristic product keywords from free text.
//!
//! Two passes per line: labelled values (`Model:`, `Product:`, `Type:`) and
//! capitalised words outside a small stop-word list. Best effort only; the
//! output feeds a supplier search, not an index.

use std::collections::HashSet;

/// Maximum number of candidates returned.
pub const MAX_KEYWORDS: usize = 20;

const LABEL_MARKERS: &[&str] = &["Model:", "Product:", "Type:"];

const STOP_WORDS: &[&str] = &["the", "a", "an", "and", "or", "for", "with", "from", "to", "in"];

const STRIP_CHARS: &[char] = &['.', ',', ':', ';', '\'', '"'];

const MIN_LEN: usize = 3;

/// Candidate keywords in first-seen order, de-duplicated, at most `MAX_KEYWORDS`.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut candidates: Vec<&str> = Vec::new();

    for line in text.lines() {
        if let Some(value) = labelled_value(line) {
            candidates.push(value);
        }
        candidates.extend(line.split_whitespace().filter(|w| is_capitalised_term(w)));
    }

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .map(|c| c.trim_matches(STRIP_CHARS))
        .filter(|c| c.chars().count() >= MIN_LEN)
        .filter(|c| seen.insert(c.to_string()))
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect()
}

/// `"Product: SolarMax 3000 (v2), black"` → `"SolarMax 3000"`.
fn labelled_value(line: &str) -> Option<&str> {
    if !LABEL_MARKERS.iter().any(|m| line.contains(m)) {
        return None;
    }
    let (_, after) = line.split_once(':')?;
    let value = after
        .split(|c| c == ',' || c == '(')
        .next()
        .unwrap_or("")
        .trim();
    (!value.is_empty()).then_some(value)
}

fn is_capitalised_term(word: &str) -> bool {
    word.chars().count() > 2
        && word.chars().next().is_some_and(char::is_uppercase)
        && !STOP_WORDS.contains(&word.to_lowercase().as_str())
}
