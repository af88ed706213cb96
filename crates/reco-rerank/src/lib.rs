//! The Diversity Reranker: Maximal Marginal Relevance selection over
//! scored candidates.

pub mod mmr;
pub mod similarity;

pub mod prelude {
    pub use crate::mmr::{mmr_select, mmr_select_default, DEFAULT_LAMBDA};
    pub use crate::similarity::{
        mutual_similarity, EmbeddingDissimilarity, MutualSimilarity, TokenJaccardSimilarity,
        FIRST_TOKEN_SIMILARITY_FLOOR,
    };
}
