use regex::Regex;
use std::sync::LazyLock;

use crate::util::{char_len, truncate_chars};

/// Punctuation dropped from a clicked word before looking it up.
pub const WORD_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '\'', '"', '(', ')'];

#[allow(clippy::expect_used)]
static NUMBERING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.\s*").expect("numbering pattern is valid"));

#[allow(clippy::expect_used)]
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-•]\s*").expect("bullet pattern is valid"));

/// Strip punctuation from a clicked word.
///
/// Returns `None` when one character or less remains; such clicks are ignored.
pub fn clean_word(word: &str) -> Option<String> {
    let cleaned: String = word
        .trim()
        .chars()
        .filter(|c| !WORD_PUNCTUATION.contains(c))
        .collect();
    (char_len(&cleaned) > 1).then_some(cleaned)
}

/// Cut `context` to `max_chars`, marking the cut with "...".
pub fn limit_context(context: &str, max_chars: usize) -> String {
    if char_len(context) > max_chars {
        format!("{}...", truncate_chars(context, max_chars))
    } else {
        context.to_string()
    }
}

/// Turn a free-form model answer into at most `max` suggestions.
///
/// Accepts comma-separated and line-separated lists, with or without
/// numbering and bullets. The looked-up word itself is never suggested.
pub fn parse_synonyms(raw: &str, word: &str, max: usize) -> Vec<String> {
    let word = word.to_lowercase();
    let mut synonyms = Vec::new();

    for piece in raw.trim().split([',', '\n']) {
        if synonyms.len() >= max {
            break;
        }
        let piece = NUMBERING.replace(piece.trim(), "");
        let piece = BULLET.replace(&piece, "").into_owned();
        if piece.is_empty() || piece.to_lowercase() == word {
            continue;
        }
        synonyms.push(piece);
    }

    synonyms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_word() {
        assert_eq!(clean_word("world."), Some("world".to_string()));
        assert_eq!(clean_word("(\"quoted\")"), Some("quoted".to_string()));
        assert_eq!(clean_word("a,"), None);
        assert_eq!(clean_word("!?"), None);
        assert_eq!(clean_word("తెలుగు"), Some("తెలుగు".to_string()));
    }

    #[test]
    fn test_limit_context() {
        assert_eq!(limit_context("short", 500), "short");
        let long = "x".repeat(600);
        let limited = limit_context(&long, 500);
        assert_eq!(char_len(&limited), 503);
        assert!(limited.ends_with("..."));
    }

    #[test]
    fn test_parse_comma_list() {
        assert_eq!(
            parse_synonyms("glad, joyful, cheerful", "happy", 7),
            vec!["glad", "joyful", "cheerful"]
        );
    }

    #[test]
    fn test_parse_numbered_and_bulleted_lines() {
        let raw = "1. glad\n2. joyful\n- cheerful\n• content";
        assert_eq!(
            parse_synonyms(raw, "happy", 7),
            vec!["glad", "joyful", "cheerful", "content"]
        );
    }

    #[test]
    fn test_parse_drops_word_and_empties() {
        assert_eq!(
            parse_synonyms("Happy, , glad,\n\n", "happy", 7),
            vec!["glad"]
        );
    }

    #[test]
    fn test_parse_caps_results() {
        let raw = "a1, a2, a3, a4, a5, a6, a7, a8, a9";
        assert_eq!(parse_synonyms(raw, "x", 7).len(), 7);
    }

    #[test]
    fn test_parse_empty_answer() {
        assert!(parse_synonyms("", "happy", 7).is_empty());
        assert!(parse_synonyms("  \n ", "happy", 7).is_empty());
    }
}
