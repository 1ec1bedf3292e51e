//! # Text Normalization
//!
//! Turns a free-form transcript into the word tokens the aligner compares.
//! The steps run in a fixed order; reordering them changes the output for
//! inputs where punctuation sits between whitespace runs.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

fn multiple_spaces() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s\s+").expect("static whitespace pattern"))
}

fn punctuation() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\p{P}").expect("static punctuation pattern"))
}

/// Ordered word tokens produced by [`normalize`].
///
/// Tokens are lower-case, contain no punctuation and are never empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedText {
    words: Vec<String>,
}

impl NormalizedText {
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.words.join(" "))
    }
}

/// Normalize `text` into word tokens.
///
/// ## Pipeline:
/// 1. Lower-case the whole string
/// 2. Drop the string entirely if it is only whitespace
/// 3. Collapse whitespace runs into a single space
/// 4. Strip leading/trailing whitespace
/// 5. Delete punctuation (Unicode category `P`), so `don't` becomes `dont`
/// 6. Split on whitespace, skipping empty tokens
pub fn normalize(text: &str) -> NormalizedText {
    let lowered = text.to_lowercase();

    let non_empty = if lowered.trim().is_empty() { "" } else { lowered.as_str() };

    let collapsed = multiple_spaces().replace_all(non_empty, " ");
    let stripped = collapsed.trim();
    let without_punctuation = punctuation().replace_all(stripped, "");

    let words = without_punctuation
        .split_whitespace()
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect();

    NormalizedText { words }
}

/// Word count used for display: a plain whitespace split of the raw input.
///
/// This deliberately differs from the normalized token count that feeds the
/// WER denominator; a token made only of punctuation counts here but not there.
pub fn raw_word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        normalize(text).words().to_vec()
    }

    #[test]
    fn test_lowercases_and_strips_punctuation() {
        assert_eq!(words("The cat, sat."), vec!["the", "cat", "sat"]);
        assert_eq!(words("Don't STOP!"), vec!["dont", "stop"]);
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(words("  hello \t\n  world  "), vec!["hello", "world"]);
    }

    #[test]
    fn test_punctuation_between_spaces_leaves_no_empty_token() {
        assert_eq!(words("hello - world"), vec!["hello", "world"]);
        assert_eq!(words("wait ... what"), vec!["wait", "what"]);
    }

    #[test]
    fn test_unicode_punctuation_removed() {
        assert_eq!(words("«Bonjour» ¿qué? “quoted”"), vec!["bonjour", "qué", "quoted"]);
    }

    #[test]
    fn test_symbols_are_not_punctuation() {
        assert_eq!(words("1 + 1 = 2"), vec!["1", "+", "1", "=", "2"]);
    }

    #[test]
    fn test_whitespace_and_punctuation_only_inputs_are_empty() {
        assert!(normalize("   ").is_empty());
        assert!(normalize("?! ... ,").is_empty());
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let inputs = [
            "The cat sat on the mat",
            "  Hello,   WORLD!! it's   me ",
            "«Bonjour» ¿qué?",
            "a - b -- c",
        ];
        for input in inputs {
            let once = normalize(input);
            let twice = normalize(&once.to_string());
            assert_eq!(once, twice, "input: {:?}", input);
        }
    }

    #[test]
    fn test_raw_word_count_ignores_normalization() {
        assert_eq!(raw_word_count("hello , world"), 3);
        assert_eq!(normalize("hello , world").len(), 2);
        assert_eq!(raw_word_count("   "), 0);
    }
}
