//! Mutual-similarity functions between candidate renderings (spec §4.5).

use reco_core::vector::{cosine_similarity, Vector};
use reco_generate::candidate::ScoredCandidate;
use std::collections::HashMap;
use std::collections::HashSet;

/// Redundancy threshold forced whenever two candidates share their first
/// token (typically the modifier): this is what keeps the reranker from
/// surfacing near-duplicates that only differ in the noun.
pub const FIRST_TOKEN_SIMILARITY_FLOOR: f32 = 0.6;

/// A pairwise similarity metric between two candidate renderings.
pub trait MutualSimilarity {
    fn raw_similarity(&self, a: &ScoredCandidate, b: &ScoredCandidate) -> f32;
}

/// Default metric: Jaccard similarity over whitespace-separated tokens.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokenJaccardSimilarity;

impl MutualSimilarity for TokenJaccardSimilarity {
    fn raw_similarity(&self, a: &ScoredCandidate, b: &ScoredCandidate) -> f32 {
        let ra = a.rendering();
        let rb = b.rendering();
        let ta: HashSet<&str> = ra.split_whitespace().collect();
        let tb: HashSet<&str> = rb.split_whitespace().collect();
        if ta.is_empty() && tb.is_empty() {
            return 0.0;
        }
        let intersection = ta.intersection(&tb).count();
        let union = ta.union(&tb).count();
        if union == 0 {
            0.0
        } else {
            intersection as f32 / union as f32
        }
    }
}

/// Alternative metric: `1 - cos` over the candidates' own embeddings,
/// already available from the Scorer's batch call (spec §4.4, §4.5).
pub struct EmbeddingDissimilarity {
    vectors: HashMap<String, Vector>,
}

impl EmbeddingDissimilarity {
    pub fn new(vectors: HashMap<String, Vector>) -> Self {
        Self { vectors }
    }
}

impl MutualSimilarity for EmbeddingDissimilarity {
    fn raw_similarity(&self, a: &ScoredCandidate, b: &ScoredCandidate) -> f32 {
        let va = self.vectors.get(&a.rendering());
        let vb = self.vectors.get(&b.rendering());
        match (va, vb) {
            (Some(va), Some(vb)) => 1.0 - cosine_similarity(va, vb),
            _ => 0.0,
        }
    }
}

/// First token (typically the modifier) of a rendering.
fn first_token(rendering: &str) -> &str {
    rendering.split_whitespace().next().unwrap_or("")
}

/// Effective similarity: the metric's raw value, forced up to
/// [`FIRST_TOKEN_SIMILARITY_FLOOR`] whenever the two renderings share their
/// first token (spec §4.5 "identical first token ⇒ high similarity").
pub fn mutual_similarity(
    a: &ScoredCandidate,
    b: &ScoredCandidate,
    metric: &dyn MutualSimilarity,
) -> f32 {
    let raw = metric.raw_similarity(a, b);
    let ra = a.rendering();
    let rb = b.rendering();
    if first_token(&ra) == first_token(&rb) {
        raw.max(FIRST_TOKEN_SIMILARITY_FLOOR)
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reco_generate::candidate::Candidate;

    fn sc(modifier: &str, noun: &str, score: f32) -> ScoredCandidate {
        ScoredCandidate {
            candidate: Candidate::new(modifier, noun),
            score,
        }
    }

    #[test]
    fn jaccard_identical_renderings_is_one() {
        let a = sc("창의적인", "개발자", 0.5);
        let b = sc("창의적인", "개발자", 0.5);
        assert_eq!(TokenJaccardSimilarity.raw_similarity(&a, &b), 1.0);
    }

    #[test]
    fn jaccard_disjoint_renderings_is_zero() {
        let a = sc("창의적인", "개발자", 0.5);
        let b = sc("열정적인", "기획자", 0.5);
        assert_eq!(TokenJaccardSimilarity.raw_similarity(&a, &b), 0.0);
    }

    #[test]
    fn shared_first_token_forces_floor() {
        let a = sc("창의적인", "개발자", 0.9);
        let b = sc("창의적인", "기획자", 0.1);
        let sim = mutual_similarity(&a, &b, &TokenJaccardSimilarity);
        assert!(sim >= FIRST_TOKEN_SIMILARITY_FLOOR);
    }

    #[test]
    fn distinct_first_token_keeps_raw_jaccard() {
        let a = sc("창의적인", "개발자", 0.9);
        let b = sc("열정적인", "개발자", 0.1);
        let sim = mutual_similarity(&a, &b, &TokenJaccardSimilarity);
        // share the noun token only: jaccard = 1/3
        assert!((sim - 1.0 / 3.0).abs() < 1e-6);
    }
}
