//! Error types for reco-index.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("vector dimension {got} does not match index dimension {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("record {0} carries no \"phrase\" attribute")]
    MissingPhraseAttribute(String),

    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot was corrupt and could not be deserialized: {0}")]
    CorruptSnapshot(String),
}
