//! Phrase matching against the catalogue
//!
//! A synonym matches when all of its words appear in the utterance in the
//! same order, with any number of filler words between them. Entries are
//! tried in catalogue order and the first match wins.

use crate::catalogue::{Catalogue, CatalogueEntry};

/// Characters that separate words besides whitespace
const SEPARATORS: [char; 7] = ['-', '_', '`', '\'', '.', '?', '!'];

/// Split text into lowercase words
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Whether `words` occur in `tokens` as an ordered subsequence
///
/// Each word is searched for at or after the position of the previous
/// word's match, so consecutive equal words may share a token. An empty
/// `words` never matches.
#[must_use]
pub fn contains_in_order<T, W>(tokens: &[T], words: &[W]) -> bool
where
    T: AsRef<str>,
    W: AsRef<str>,
{
    if words.is_empty() {
        return false;
    }

    let mut cursor = 0;
    words.iter().all(|word| {
        tokens[cursor..]
            .iter()
            .position(|token| token.as_ref() == word.as_ref())
            .map(|offset| cursor += offset)
            .is_some()
    })
}

/// Catalogue matcher with every synonym tokenized up front
#[derive(Debug, Clone)]
pub struct PhraseMatcher {
    /// entry → synonym → words
    entries: Vec<Vec<Vec<String>>>,
}

impl PhraseMatcher {
    #[must_use]
    pub fn new(catalogue: &Catalogue) -> Self {
        Self::from_entries(catalogue.entries())
    }

    #[must_use]
    pub fn from_entries(entries: &[CatalogueEntry]) -> Self {
        let entries = entries
            .iter()
            .map(|entry| {
                entry
                    .synonyms
                    .iter()
                    .map(|synonym| tokenize(synonym))
                    .filter(|words| !words.is_empty())
                    .collect()
            })
            .collect();
        Self { entries }
    }

    /// Index of the first entry with a synonym found in `utterance`
    #[must_use]
    pub fn find(&self, utterance: &str) -> Option<usize> {
        let tokens = tokenize(utterance);
        if tokens.is_empty() {
            return None;
        }

        let found = self.entries.iter().position(|synonyms| {
            synonyms
                .iter()
                .any(|words| contains_in_order(&tokens, words))
        });

        match found {
            Some(index) => tracing::debug!(utterance, index, "phrase matched"),
            None => tracing::debug!(utterance, "no phrase matched"),
        }
        found
    }
}

/// One-shot match of `utterance` against `entries`
#[must_use]
pub fn match_phrase(utterance: &str, entries: &[CatalogueEntry]) -> Option<usize> {
    PhraseMatcher::from_entries(entries).find(utterance)
}
