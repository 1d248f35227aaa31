//! Extractive summarization of article text.
//!
//! The pipeline is pure and synchronous:
//!
//! 1. **Segmentation**: split the text into sentences ([`tokenizer::sentences`])
//! 2. **Frequencies**: count informative words across the whole document
//! 3. **Scoring**: average word frequency per sentence, doubled for the first
//!    three sentences, plus a flat bonus for every title word it contains
//! 4. **Selection**: keep the best `n` sentences, ties going to the earlier
//!    one, and emit them in document order joined by a single space
//!
//! Texts that already have `n` sentences or fewer are returned untouched.
//!
//! # Example
//!
//! ```ignore
//! let summary = summarize(
//!     "Cats are great. Dogs are also great. Fish swim quietly.",
//!     "Cats and Dogs",
//!     2,
//! )?;
//! assert_eq!(summary, "Cats are great. Dogs are also great.");
//! ```

pub mod scoring;
pub mod stopwords;
pub mod tokenizer;

use scoring::{frequency_table, score_sentences, select_top};
use thiserror::Error;
use tracing::{debug, trace};

/// Sentences kept per summary unless configured otherwise.
pub const DEFAULT_SENTENCE_COUNT: usize = 3;

/// Errors returned by [`summarize`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SummarizeError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// Select the `sentence_count` most representative sentences of `text`.
///
/// # Errors
///
/// [`SummarizeError::InvalidArgument`] if `sentence_count` is zero or `text`
/// is empty or whitespace only.
pub fn summarize(text: &str, title: &str, sentence_count: usize) -> Result<String, SummarizeError> {
    if sentence_count == 0 {
        return Err(SummarizeError::InvalidArgument(
            "sentence count must be at least 1",
        ));
    }
    if text.trim().is_empty() {
        return Err(SummarizeError::InvalidArgument("text must not be empty"));
    }

    let sentences = tokenizer::sentences(text);
    if sentences.len() <= sentence_count {
        debug!(
            sentences = sentences.len(),
            sentence_count, "Text already short enough; returning unchanged"
        );
        return Ok(text.to_string());
    }

    let table = frequency_table(text);
    let scores = score_sentences(&sentences, &table, title);
    trace!(?scores, "Scored sentences");

    let selected = select_top(&scores, sentence_count);
    debug!(
        sentences = sentences.len(),
        vocabulary = table.len(),
        ?selected,
        "Selected summary sentences"
    );

    Ok(selected.into_iter().map(|i| sentences[i]).collect::<Vec<_>>().join(" "))
}
