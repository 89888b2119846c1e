//! Splitting long plain text into request-sized chunks.
//!
//! Text is cut at blank-line paragraph boundaries first. A paragraph that is
//! too large on its own is cut again at sentence boundaries. A single sentence
//! longer than the budget is never cut further and yields an oversized chunk.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::util::char_len;

/// Separator placed between translated chunks when reassembling a document.
pub const CHUNK_SEPARATOR: &str = "\n\n";

const PARAGRAPH_JOIN: &str = "\n\n";
const SENTENCE_JOIN: &str = " ";

#[allow(clippy::expect_used)]
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\n+").expect("paragraph pattern is valid"));

// Abbreviations such as "Mr. Smith" split here too.
#[allow(clippy::expect_used)]
static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?](\s+)").expect("sentence pattern is valid"));

/// One piece of a larger text, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Position in the chunk sequence
    pub index: usize,
    pub text: String,
    /// Set when a single sentence alone is longer than the budget
    pub oversized: bool,
}

impl TextChunk {
    pub fn char_count(&self) -> usize {
        char_len(&self.text)
    }
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Text that already fits is returned whole as a single chunk.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<TextChunk> {
    if char_len(text) <= max_chars {
        return vec![TextChunk {
            index: 0,
            text: text.to_string(),
            oversized: false,
        }];
    }

    let mut acc = Accumulator::new(max_chars);

    for paragraph in PARAGRAPH_BREAK.split(text) {
        if paragraph.trim().is_empty() {
            continue;
        }

        if char_len(paragraph) > max_chars {
            // Sentences of an oversized paragraph never share a chunk with
            // the paragraphs before it.
            acc.flush();
            for sentence in split_sentences(paragraph) {
                acc.push(sentence, SENTENCE_JOIN);
            }
        } else {
            acc.push(paragraph, PARAGRAPH_JOIN);
        }
    }

    let chunks = acc.finish();
    debug!(
        "Split {} characters into {} chunk(s) (budget {})",
        char_len(text),
        chunks.len(),
        max_chars
    );
    chunks
}

/// Join translated chunks back into one text.
pub fn join_chunks<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(CHUNK_SEPARATOR)
}

/// Sentences of `paragraph`; terminal punctuation stays with its sentence and
/// the whitespace run after it is dropped.
fn split_sentences(paragraph: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for caps in SENTENCE_BREAK.captures_iter(paragraph) {
        let Some(gap) = caps.get(1) else { continue };
        let sentence = &paragraph[start..gap.start()];
        if !sentence.trim().is_empty() {
            sentences.push(sentence);
        }
        start = gap.end();
    }

    let rest = &paragraph[start..];
    if !rest.trim().is_empty() {
        sentences.push(rest);
    }
    sentences
}

/// Running chunk under construction.
struct Accumulator {
    max_chars: usize,
    chunks: Vec<TextChunk>,
    current: String,
    current_len: usize,
}

impl Accumulator {
    const fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            chunks: Vec::new(),
            current: String::new(),
            current_len: 0,
        }
    }

    fn push(&mut self, piece: &str, join: &str) {
        let piece_len = char_len(piece);

        if !self.current.is_empty() && self.current_len + char_len(join) + piece_len > self.max_chars {
            self.flush();
        }

        if self.current.is_empty() {
            self.current.push_str(piece);
            self.current_len = piece_len;
        } else {
            self.current.push_str(join);
            self.current.push_str(piece);
            self.current_len += char_len(join) + piece_len;
        }
    }

    fn flush(&mut self) {
        let trimmed = self.current.trim();
        if !trimmed.is_empty() {
            let text = trimmed.to_string();
            let len = char_len(&text);
            let oversized = len > self.max_chars;
            if oversized {
                warn!(
                    "Sentence of {} characters exceeds chunk budget of {}; sending it whole",
                    len, self.max_chars
                );
            }
            self.chunks.push(TextChunk {
                index: self.chunks.len(),
                text,
                oversized,
            });
        }
        self.current.clear();
        self.current_len = 0;
    }

    fn finish(mut self) -> Vec<TextChunk> {
        self.flush();
        self.chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<&str> {
        text.split_whitespace().collect()
    }

    fn texts(chunks: &[TextChunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_short_text_is_returned_whole() {
        let text = "  Hello world.\n\nSecond paragraph.  ";
        let chunks = split_into_chunks(text, 100);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
        assert!(!chunks[0].oversized);
    }

    #[test]
    fn test_exact_budget_is_identity() {
        let text = "abcde";
        assert_eq!(texts(&split_into_chunks(text, 5)), vec!["abcde"]);
    }

    #[test]
    fn test_paragraphs_are_grouped_under_budget() {
        let text = "aaaa\n\nbbbb\n\ncccc";
        // "aaaa\n\nbbbb" is 10 characters; adding cccc would need 16
        let chunks = split_into_chunks(text, 10);
        assert_eq!(texts(&chunks), vec!["aaaa\n\nbbbb", "cccc"]);
        assert_eq!(chunks[1].index, 1);
    }

    #[test]
    fn test_joining_gap_counts_against_budget() {
        // 4 + 2 + 4 = 10 > 9, so the paragraphs cannot share a chunk
        let chunks = split_into_chunks("aaaa\n\nbbbb", 9);
        assert_eq!(texts(&chunks), vec!["aaaa", "bbbb"]);
    }

    #[test]
    fn test_multiple_blank_lines_are_one_boundary() {
        let chunks = split_into_chunks("one\n\n\n\ntwo\n\n\nthree", 8);
        assert_eq!(texts(&chunks), vec!["one\n\ntwo", "three"]);
    }

    #[test]
    fn test_oversized_paragraph_falls_back_to_sentences() {
        let text = "First one. Second one! Third one? Fourth one.";
        let chunks = split_into_chunks(text, 22);
        assert_eq!(
            texts(&chunks),
            vec!["First one. Second one!", "Third one? Fourth one."]
        );
        assert!(chunks.iter().all(|c| c.char_count() <= 22));
    }

    #[test]
    fn test_sentence_split_keeps_punctuation_and_drops_gap() {
        assert_eq!(
            split_sentences("Hi there.  How are you?\nFine!"),
            vec!["Hi there.", "How are you?", "Fine!"]
        );
    }

    #[test]
    fn test_abbreviations_over_split() {
        assert_eq!(
            split_sentences("Mr. Smith arrived. He sat."),
            vec!["Mr.", "Smith arrived.", "He sat."]
        );
    }

    #[test]
    fn test_single_long_sentence_is_kept_whole_and_flagged() {
        let long = "x".repeat(30);
        let text = format!("Short. {long}. Tail.");
        let long_sentence = format!("{long}.");
        let chunks = split_into_chunks(&text, 10);
        assert_eq!(texts(&chunks), vec!["Short.", long_sentence.as_str(), "Tail."]);
        assert!(!chunks[0].oversized);
        assert!(chunks[1].oversized);
        assert!(!chunks[2].oversized);
    }

    #[test]
    fn test_sentences_do_not_merge_into_previous_paragraph_chunk() {
        let text = "Intro.\n\nAlpha beta. Gamma delta. Epsilon zeta.";
        let chunks = split_into_chunks(text, 26);
        assert_eq!(chunks[0].text, "Intro.");
        assert_eq!(chunks[1].text, "Alpha beta. Gamma delta.");
    }

    #[test]
    fn test_no_chunk_is_empty() {
        let text = "\n\n\n   \n\nword word word\n\n   \n\n".to_string() + &"y".repeat(40);
        let chunks = split_into_chunks(&text, 20);
        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| !c.text.trim().is_empty()));
    }

    #[test]
    fn test_content_preserved_in_order() {
        let text = "The quick brown fox. Jumps over the lazy dog!\n\n\
                    Pack my box with five dozen liquor jugs? Yes.\n\n\
                    Sphinx of black quartz, judge my vow.";
        for max in [5, 12, 25, 40, 80, 1000] {
            let chunks = split_into_chunks(text, max);
            let joined = join_chunks(&texts(&chunks));
            assert_eq!(words(&joined), words(text), "budget {max}");
        }
    }

    #[test]
    fn test_chunks_respect_budget_unless_flagged() {
        let text = "Lorem ipsum dolor sit amet. ".repeat(50) + "\n\n" + &"Consectetur adipiscing. ".repeat(30);
        let chunks = split_into_chunks(&text, 120);
        for chunk in &chunks {
            assert!(chunk.oversized || chunk.char_count() <= 120);
        }
        assert!(chunks.iter().all(|c| !c.oversized));
    }

    #[test]
    fn test_one_giant_paragraph_of_thirty_thousand_chars() {
        // 300 sentences of exactly 99 characters plus a separating space
        let sentence = format!("{}.", "a".repeat(98));
        let text = vec![sentence.as_str(); 300].join(" ");
        assert_eq!(char_len(&text), 300 * 99 + 299);

        let chunks = split_into_chunks(&text, 20_000);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.char_count() <= 20_000 && !c.oversized));
        assert_eq!(words(&join_chunks(&texts(&chunks))), words(&text));
    }

    #[test]
    fn test_multibyte_text_is_measured_in_characters() {
        let text = "తెలుగు భాష. హిందీ భాష.";
        let chunks = split_into_chunks(text, 12);
        assert_eq!(texts(&chunks), vec!["తెలుగు భాష.", "హిందీ భాష."]);
    }
}
