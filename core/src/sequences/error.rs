//! Error types for sequence construction

use thiserror::Error;

/// Errors when building a [`Sequence`](super::Sequence)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SequenceError {
    #[error("sequence '{name}' has no phases")]
    Empty { name: String },

    #[error("phase {index} of sequence '{name}' has a zero duration")]
    ZeroDuration { name: String, index: usize },

    #[error("phase {index} of sequence '{name}' has no icons")]
    NoIcons { name: String, index: usize },
}
