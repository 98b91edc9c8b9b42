use crate::error::{Error, Result};
use regex::Regex;
use std::collections::HashSet;

pub const DEFAULT_PHRASE_THRESHOLD: usize = 3;

/// A read-only set of lowercase dictionary words.
///
/// Built once by the caller and borrowed by anything that needs it.
#[derive(Debug, Clone)]
pub struct Lexicon {
    words: HashSet<String>,
    word_pattern: Regex,
}

impl Lexicon {
    /// Builds a lexicon from one word per item. Entries are trimmed and
    /// lowercased; blank entries are skipped.
    pub fn from_words<I, S>(words: I) -> Result<Lexicon>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|word| word.as_ref().trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();

        let word_pattern = Regex::new(r"[A-Za-z']+")
            .map_err(|err| Error::invalid_input(format!("word pattern: {}", err)))?;

        Ok(Lexicon {
            words,
            word_pattern,
        })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    /// Number of tokens in `text` found in the lexicon.
    pub fn english_word_count(&self, text: &str) -> usize {
        self.word_pattern
            .find_iter(text)
            .filter(|token| self.contains(token.as_str()))
            .count()
    }

    pub fn is_english_phrase(&self, text: &str, threshold: usize) -> bool {
        self.english_word_count(text) >= threshold
    }
}
