//! Frequency table, per-sentence scoring, and top-k selection.

use super::tokenizer::{informative_words, is_alphanumeric, words};
use itertools::Itertools;
use std::collections::HashMap;

/// Sentences at an index below this get the positional multiplier.
pub const LEADING_SENTENCES: usize = 3;
/// Multiplier applied once to each leading sentence.
pub const POSITIONAL_MULTIPLIER: f64 = 2.0;
/// Flat bonus per title word found inside a sentence.
pub const TITLE_WORD_BONUS: f64 = 5.0;

/// Informative token -> number of occurrences in the whole document.
pub type FrequencyTable = HashMap<String, usize>;

/// Count every informative token of `text`, case-insensitively.
pub fn frequency_table(text: &str) -> FrequencyTable {
    let mut table = FrequencyTable::new();
    for word in informative_words(text) {
        *table.entry(word).or_insert(0) += 1;
    }
    table
}

/// Title words checked against each sentence. Stop words are kept here.
pub fn title_words(title: &str) -> Vec<String> {
    words(title).filter(|w| is_alphanumeric(w)).collect()
}

/// Everything that contributed to one sentence's score.
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceScore {
    /// Sum of the global frequencies of the sentence's informative tokens.
    pub raw_score: f64,
    pub informative_word_count: usize,
    /// `POSITIONAL_MULTIPLIER` for leading sentences, otherwise `1.0`.
    pub positional_multiplier: f64,
    pub title_bonus: f64,
}

impl SentenceScore {
    /// Normalized frequency score, times the positional multiplier, plus the
    /// title bonus. A sentence with no informative words starts from zero.
    pub fn total(&self) -> f64 {
        let base = if self.informative_word_count > 0 {
            self.raw_score / self.informative_word_count as f64
        } else {
            0.0
        };
        base * self.positional_multiplier + self.title_bonus
    }
}

/// Score each sentence. The result is indexed like `sentences`.
pub fn score_sentences(sentences: &[&str], table: &FrequencyTable, title: &str) -> Vec<SentenceScore> {
    let title_words = title_words(title);

    sentences
        .iter()
        .enumerate()
        .map(|(index, sentence)| {
            let mut raw_score = 0.0;
            let mut informative_word_count = 0;
            for word in informative_words(sentence) {
                if let Some(&count) = table.get(&word) {
                    raw_score += count as f64;
                    informative_word_count += 1;
                }
            }

            let positional_multiplier = if index < LEADING_SENTENCES {
                POSITIONAL_MULTIPLIER
            } else {
                1.0
            };

            let lowered = sentence.to_lowercase();
            let title_bonus = title_words
                .iter()
                .filter(|w| lowered.contains(w.as_str()))
                .count() as f64
                * TITLE_WORD_BONUS;

            SentenceScore {
                raw_score,
                informative_word_count,
                positional_multiplier,
                title_bonus,
            }
        })
        .collect()
}

/// Indices of the `k` best sentences, highest score first with ties going to
/// the earlier sentence, returned in ascending (document) order.
pub fn select_top(scores: &[SentenceScore], k: usize) -> Vec<usize> {
    scores
        .iter()
        .map(SentenceScore::total)
        .enumerate()
        .sorted_by(|(ia, a), (ib, b)| b.total_cmp(a).then(ia.cmp(ib)))
        .take(k)
        .map(|(index, _)| index)
        .sorted()
        .collect()
}
