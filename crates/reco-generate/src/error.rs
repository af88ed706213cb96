//! Error types for reco-generate.

use reco_core::error::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    /// The Embedder failed while embedding vocabulary words or candidate
    /// renderings.
    #[error("embedder call failed during candidate generation: {0}")]
    Embedder(#[from] CoreError),

    /// A caller-supplied parameter was invalid (e.g. K = 0).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
