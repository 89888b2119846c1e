//! Word-level editing of a finished translation.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use super::parse::WORD_PUNCTUATION;
use crate::error::{Error, Result};

#[allow(clippy::expect_used)]
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// A run of non-whitespace (a word, possibly with punctuation) or a run of
/// whitespace. Concatenating all tokens gives back the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordToken {
    pub text: String,
    /// Contains at least one letter or digit
    pub selectable: bool,
}

impl WordToken {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            selectable: text.chars().any(char::is_alphanumeric),
        }
    }
}

pub fn tokenize(text: &str) -> Vec<WordToken> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for m in WHITESPACE.find_iter(text) {
        if m.start() > last {
            tokens.push(WordToken::new(&text[last..m.start()]));
        }
        tokens.push(WordToken::new(m.as_str()));
        last = m.end();
    }
    if last < text.len() {
        tokens.push(WordToken::new(&text[last..]));
    }

    tokens
}

/// Replace the word at token position `index` and return the edited text.
///
/// Punctuation hugging the word ("world." / "(world)") stays in place.
pub fn replace_token(text: &str, index: usize, replacement: &str) -> Result<String> {
    let replacement = replacement.trim();
    if replacement.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut tokens = tokenize(text);
    let token = tokens
        .get_mut(index)
        .filter(|t| t.selectable)
        .ok_or(Error::InvalidWordIndex(index))?;
    token.text = splice_word(&token.text, replacement);

    Ok(tokens.into_iter().map(|t| t.text).collect())
}

fn splice_word(token: &str, replacement: &str) -> String {
    let start = token.len() - token.trim_start_matches(WORD_PUNCTUATION).len();
    let end = token.trim_end_matches(WORD_PUNCTUATION).len();
    if start >= end {
        return replacement.to_string();
    }
    format!("{}{}{}", &token[..start], replacement, &token[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[WordToken]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_tokenize_keeps_separators() {
        let tokens = tokenize("Hola  mundo\nadiós");
        assert_eq!(texts(&tokens), vec!["Hola", "  ", "mundo", "\n", "adiós"]);
        assert_eq!(
            tokens.iter().map(|t| t.selectable).collect::<Vec<_>>(),
            vec![true, false, true, false, true]
        );
    }

    #[test]
    fn test_tokenize_edges_and_punctuation() {
        let tokens = tokenize(" - 42 ");
        assert_eq!(texts(&tokens), vec![" ", "-", " ", "42", " "]);
        assert!(!tokens[1].selectable);
        assert!(tokens[3].selectable);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_tokenize_non_latin_scripts() {
        let tokens = tokenize("నమస్కారం ప్రపంచం");
        assert_eq!(tokens.len(), 3);
        assert!(tokens[0].selectable && tokens[2].selectable);
    }

    #[test]
    fn test_replace_token_keeps_punctuation() {
        let out = replace_token("Hello big world.", 4, "earth").unwrap();
        assert_eq!(out, "Hello big earth.");

        let out = replace_token("(quick) fox", 0, "fast").unwrap();
        assert_eq!(out, "(fast) fox");
    }

    #[test]
    fn test_replace_token_rejects_separators_and_out_of_range() {
        assert!(matches!(
            replace_token("a b", 1, "x"),
            Err(Error::InvalidWordIndex(1))
        ));
        assert!(matches!(
            replace_token("a b", 9, "x"),
            Err(Error::InvalidWordIndex(9))
        ));
        assert!(matches!(replace_token("a b", 0, "  "), Err(Error::EmptyInput)));
    }
}
