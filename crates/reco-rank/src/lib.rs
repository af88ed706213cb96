//! Unified facade for the two-word label recommendation core.
//!
//! Re-exports the staged-crate pipeline (`reco-core`, `reco-generate`,
//! `reco-rerank`, `reco-index`) plus the Recommendation Coordinator, the
//! Resume Store façade, and configuration loading.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod resume;

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::coordinator::{
        Coordinator, DefaultedReason, RecommendationResult, RequestContext, TopSimilarEntry,
    };
    pub use crate::error::RecommendError;
    pub use crate::resume::{InMemoryResumeStore, RequestStatus, ResumeError, ResumeId, ResumeStore};

    pub use reco_core::embedder::{Embedder, EmbedderConfig, HttpEmbedder};
    pub use reco_core::vector::{cosine_similarity, normalize, Vector};
    pub use reco_core::vocab::VocabularyStore;

    pub use reco_generate::candidate::{Candidate, ScoredCandidate};

    pub use reco_rerank::mmr::DEFAULT_LAMBDA;

    pub use reco_index::index::AnnIndex;
    pub use reco_index::record::PhraseRecord;
}
