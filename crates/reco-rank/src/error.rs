//! Error kinds for the Recommendation Coordinator (spec §7).

use crate::resume::ResumeError;
use reco_core::error::CoreError;
use reco_index::error::IndexError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecommendError {
    /// Input text too short/long, or a malformed resume identifier.
    /// Surfaced at the boundary; never retried.
    #[error("validation failed: {0}")]
    ValidationError(String),

    /// Unknown resume identifier.
    #[error("resume not found: {0}")]
    ResumeNotFound(String),

    /// Embedder transport/model failure after retries. Triggers fallback;
    /// only surfaced directly when fallback also fails.
    #[error("embedder unavailable: {0}")]
    EmbedderUnavailable(String),

    /// ANN index closed or dimension mismatch. Fatal only inside fallback.
    #[error("vector store unavailable: {0}")]
    VectorStoreUnavailable(String),

    /// Both the dynamic and ANN paths failed.
    #[error("recommendation unavailable: {0}")]
    RecommendationUnavailable(String),
}

impl From<ResumeError> for RecommendError {
    fn from(err: ResumeError) -> Self {
        match err {
            ResumeError::NotFound(id) => RecommendError::ResumeNotFound(id.to_string()),
        }
    }
}

impl From<CoreError> for RecommendError {
    fn from(err: CoreError) -> Self {
        RecommendError::EmbedderUnavailable(err.to_string())
    }
}

impl From<IndexError> for RecommendError {
    fn from(err: IndexError) -> Self {
        RecommendError::VectorStoreUnavailable(err.to_string())
    }
}
