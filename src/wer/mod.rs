//! # Word Error Rate
//!
//! Scores a hypothesis transcript against a reference:
//! WER = (substitutions + deletions + insertions) / reference words.
//!
//! - **normalize**: turns raw text into comparable word tokens
//! - **alignment**: edit-distance table and backtrace over those tokens
//!
//! Everything here is synchronous and allocation-local, so callers can run
//! it on any thread without coordination.

pub mod alignment;
pub mod normalize;

pub use alignment::{align, table_cells, AlignmentResult};
pub use normalize::{normalize, raw_word_count};

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WerError {
    #[error("Both reference and hypothesis must be non-empty strings")]
    InvalidInput,

    #[error("Reference contains no words after normalization")]
    DegenerateInput,

    #[error("Input has {words} words, exceeding the limit of {limit}")]
    AlignmentOverflow { words: usize, limit: usize },

    #[error("Alignment needs {cells} table cells, exceeding the limit of {limit}")]
    AlignmentTooLarge { cells: usize, limit: usize },
}

/// Size ceilings checked by [`check_input_size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputLimits {
    /// Reference plus hypothesis words.
    pub max_words: usize,
    /// Step-table cells, `(reference + 1) * (hypothesis + 1)`.
    pub max_cells: usize,
}

/// Outcome of scoring one reference/hypothesis pair.
///
/// `reference_word_count` and `hypothesis_word_count` are raw whitespace
/// counts of the raw input strings, for display. The `wer` denominator is the
/// normalized reference length instead, so the two can disagree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WerReport {
    pub wer: f64,
    pub substitutions: usize,
    pub deletions: usize,
    pub insertions: usize,
    pub reference_word_count: usize,
    pub hypothesis_word_count: usize,
}

/// Score `hypothesis` against `reference`.
///
/// Empty inputs are rejected before any normalization happens.
pub fn compute_word_error_rate(reference: &str, hypothesis: &str) -> Result<WerReport, WerError> {
    if reference.is_empty() || hypothesis.is_empty() {
        return Err(WerError::InvalidInput);
    }

    let reference_words = normalize(reference);
    let hypothesis_words = normalize(hypothesis);

    let alignment = align(reference_words.words(), hypothesis_words.words());
    let wer = word_error_rate(&alignment)?;

    Ok(WerReport {
        wer,
        substitutions: alignment.substitutions,
        deletions: alignment.deletions,
        insertions: alignment.insertions,
        reference_word_count: raw_word_count(reference),
        hypothesis_word_count: raw_word_count(hypothesis),
    })
}

/// Derive the error rate from an alignment. Not clamped to 1.0.
pub fn word_error_rate(alignment: &AlignmentResult) -> Result<f64, WerError> {
    if alignment.reference_len == 0 {
        return Err(WerError::DegenerateInput);
    }
    Ok(alignment.errors() as f64 / alignment.reference_len as f64)
}

/// Reject inputs too large to align, before any allocation happens.
///
/// Both checks use raw whitespace counts. Normalization never adds tokens,
/// so the real table is at most this size.
pub fn check_input_size(reference: &str, hypothesis: &str, limits: &InputLimits) -> Result<(), WerError> {
    let reference_words = raw_word_count(reference);
    let hypothesis_words = raw_word_count(hypothesis);

    let words = reference_words + hypothesis_words;
    if words > limits.max_words {
        return Err(WerError::AlignmentOverflow {
            words,
            limit: limits.max_words,
        });
    }

    let cells = table_cells(reference_words, hypothesis_words);
    if cells > limits.max_cells {
        return Err(WerError::AlignmentTooLarge {
            cells,
            limit: limits.max_cells,
        });
    }
    Ok(())
}
