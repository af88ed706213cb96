//! Scorer (spec §4.4): a single `EmbedBatch` call over candidate
//! renderings, producing order-preserving [`ScoredCandidate`]s.

use crate::candidate::{Candidate, ScoredCandidate};
use crate::error::GenerateError;
use reco_core::embedder::Embedder;
use reco_core::vector::{dot, Vector};

/// Score `candidates` against `query` by embedding every rendering in a
/// single batch call. The returned sequence is 1:1 with `candidates` and
/// preserves input order.
pub async fn score_candidates(
    embedder: &dyn Embedder,
    query: &Vector,
    candidates: Vec<Candidate>,
) -> Result<Vec<ScoredCandidate>, GenerateError> {
    let renderings: Vec<String> = candidates.iter().map(|c| c.rendering()).collect();
    let vectors = embedder.embed_batch(&renderings).await?;

    if vectors.len() != candidates.len() {
        return Err(GenerateError::InvalidParameter(format!(
            "embedder returned {} vectors for {} candidates",
            vectors.len(),
            candidates.len()
        )));
    }

    Ok(candidates
        .into_iter()
        .zip(vectors.into_iter())
        .map(|(candidate, v)| ScoredCandidate {
            score: dot(query, &v),
            candidate,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reco_core::embedder::mock::MockEmbedder;

    #[tokio::test]
    async fn scores_are_order_preserving_and_bounded() {
        let embedder = MockEmbedder::new(16);
        let query = embedder.embed("query text").await.unwrap();
        let candidates = vec![
            Candidate::new("창의적인", "개발자"),
            Candidate::new("열정적인", "기획자"),
            Candidate::new("꾸준한", "디자이너"),
        ];
        let renderings: Vec<String> = candidates.iter().map(|c| c.rendering()).collect();

        let scored = score_candidates(&embedder, &query, candidates).await.unwrap();
        assert_eq!(scored.len(), 3);
        for (expected_rendering, sc) in renderings.iter().zip(scored.iter()) {
            assert_eq!(expected_rendering, &sc.rendering());
            assert!(sc.score >= -1.0001 && sc.score <= 1.0001);
        }
    }

    #[tokio::test]
    async fn empty_candidate_list_yields_empty_scores() {
        let embedder = MockEmbedder::new(16);
        let query = embedder.embed("query").await.unwrap();
        let scored = score_candidates(&embedder, &query, vec![]).await.unwrap();
        assert!(scored.is_empty());
    }
}
