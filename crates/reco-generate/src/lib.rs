//! The Candidate Generator and Scorer: turns a query vector and a
//! vocabulary into a bounded, scored candidate set.

pub mod candidate;
pub mod error;
pub mod generator;
pub mod relevance;
pub mod scorer;

pub mod prelude {
    pub use crate::candidate::{Candidate, ScoredCandidate};
    pub use crate::error::GenerateError;
    pub use crate::generator::{CandidateGenerator, DEFAULT_K_ADJ, DEFAULT_K_NOUN};
    pub use crate::relevance::RelevanceCache;
    pub use crate::scorer::score_candidates;
}
