//! Error types for reco-core.

use thiserror::Error;

/// Errors that can occur while embedding text or loading vocabulary.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The Embedder's transport (network) failed, or the model returned an error
    /// after retries were exhausted.
    #[error("embedder unavailable: {0}")]
    EmbedderUnavailable(String),

    /// The Embedder returned a vector whose dimension didn't match the configured D.
    #[error("embedder returned dimension {got}, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    /// No vocabulary source (configured paths or compiled-in default) could be loaded.
    #[error("failed to load vocabulary: {0}")]
    VocabLoad(String),
}
