//! Tokenizer turning extracted page text into tag names
//!
//! The output is a bounded, deduplicated list of lowercase content words in
//! encounter order. Truncation keeps the first words seen, so meta text
//! (which is concatenated first) wins over body text.

mod stopwords;

use crate::config::TokenizerConfig;
use std::collections::HashSet;

/// Default cap on distinct tokens per page
pub const DEFAULT_MAX_TOKENS: usize = 100;

/// Default minimum token length in characters
pub const DEFAULT_MIN_TOKEN_LENGTH: usize = 3;

/// Content-word tokenizer with a closed stopword list
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stopwords: HashSet<String>,
    min_len: usize,
    max_tokens: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_TOKEN_LENGTH, DEFAULT_MAX_TOKENS, &[])
    }
}

impl Tokenizer {
    /// Creates a tokenizer with the English stopword list plus `extra_stopwords`
    pub fn new(min_len: usize, max_tokens: usize, extra_stopwords: &[String]) -> Self {
        let stopwords = stopwords::ENGLISH
            .iter()
            .map(|w| w.to_string())
            .chain(extra_stopwords.iter().map(|w| w.to_lowercase()))
            .collect();

        Self {
            stopwords,
            min_len,
            max_tokens,
        }
    }

    /// Builds a tokenizer from configuration
    pub fn from_config(config: &TokenizerConfig) -> Self {
        Self::new(
            config.min_token_length,
            config.max_tokens,
            &config.extra_stopwords,
        )
    }

    /// Returns true if the (lowercase) word is a stopword
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Splits text into normalized content words
    ///
    /// Every run of non-letter characters acts as a single separator. Tokens
    /// are lowercased, stopwords and short tokens are dropped, duplicates are
    /// removed, and the result is truncated to the first `max_tokens` words.
    ///
    /// # Examples
    ///
    /// ```
    /// use driftnet::Tokenizer;
    ///
    /// let tokenizer = Tokenizer::default();
    /// let tokens = tokenizer.tokenize("The Rust-Programming language, and the RUST book!");
    /// assert_eq!(tokens, vec!["rust", "programming", "language", "book"]);
    /// ```
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut tokens = Vec::new();

        for raw in text.split(|c: char| !c.is_alphabetic()) {
            if tokens.len() >= self.max_tokens {
                break;
            }
            if raw.trim().is_empty() {
                continue;
            }

            let word = raw.to_lowercase();
            if word.chars().count() < self.min_len || self.is_stopword(&word) {
                continue;
            }

            if seen.insert(word.clone()) {
                tokens.push(word);
            }
        }

        tokens
    }
}
