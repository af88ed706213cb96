//! Candidate Generator (spec §4.3): two-stage filter (per-word relevance,
//! 70/30 deterministic/exploration split) plus Cartesian product.

use crate::candidate::Candidate;
use crate::error::GenerateError;
use crate::relevance::RelevanceCache;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use reco_core::embedder::Embedder;
use reco_core::vector::Vector;
use reco_core::vocab::VocabularyStore;
use std::collections::HashSet;

/// Default Kₐ (modifier filter size).
pub const DEFAULT_K_ADJ: usize = 20;
/// Default Kₙ (noun filter size).
pub const DEFAULT_K_NOUN: usize = 30;

/// Fraction of each filter size selected deterministically by rank before
/// the remainder is sampled from the exploration tail (spec §4.3 step 2).
const DETERMINISTIC_FRACTION: f64 = 0.7;

/// Produces a bounded candidate set for a query vector against a
/// caller-owned, shared [`RelevanceCache`] (spec §5: the per-word vector
/// cache is process-wide, not per-request).
pub struct CandidateGenerator<'a> {
    embedder: &'a dyn Embedder,
    cache: &'a RelevanceCache,
}

impl<'a> CandidateGenerator<'a> {
    pub fn new(embedder: &'a dyn Embedder, cache: &'a RelevanceCache) -> Self {
        Self { embedder, cache }
    }

    /// Generate candidates for `query` using filter sizes `k_adj`/`k_noun`.
    /// Output contains no duplicate renderings and has size at most
    /// `k_adj * k_noun`, tolerating vocabulary lists smaller than the
    /// requested filter sizes by truncating selection.
    ///
    /// `explore` toggles the random exploration tail; when `false`, selection
    /// is a pure top-K by relevance with no RNG use at all. `seed`, when
    /// `Some`, seeds the exploration tail's shuffle so repeated calls with
    /// the same seed reproduce the same selection (spec §8 determinism and
    /// round-trip properties).
    pub async fn generate(
        &self,
        vocab: &VocabularyStore,
        query: &Vector,
        k_adj: usize,
        k_noun: usize,
        seed: Option<u64>,
        explore: bool,
    ) -> Result<Vec<Candidate>, GenerateError> {
        if k_adj == 0 || k_noun == 0 {
            return Err(GenerateError::InvalidParameter(
                "k_adj and k_noun must both be > 0".to_string(),
            ));
        }

        let modifiers = self
            .select_mixed_top_k(vocab.modifiers(), query, k_adj, seed, explore)
            .await?;
        let nouns = self
            .select_mixed_top_k(vocab.nouns(), query, k_noun, seed.map(|s| s.wrapping_add(1)), explore)
            .await?;

        let mut seen = HashSet::with_capacity(modifiers.len() * nouns.len());
        let mut out = Vec::with_capacity(modifiers.len() * nouns.len());
        for m in &modifiers {
            for n in &nouns {
                let candidate = Candidate::new(m.clone(), n.clone());
                if seen.insert(candidate.rendering()) {
                    out.push(candidate);
                }
            }
        }
        Ok(out)
    }

    /// Mixed top-K selection over `words`: the top `floor(0.7*k)` entries by
    /// relevance score, plus `k - floor(0.7*k)` entries sampled uniformly at
    /// random from the tail beyond position `k` (spec §4.3 step 2). When
    /// `explore` is `false` the tail is skipped entirely and the full `k`
    /// comes from the deterministic ranking.
    async fn select_mixed_top_k(
        &self,
        words: &[String],
        query: &Vector,
        k: usize,
        seed: Option<u64>,
        explore: bool,
    ) -> Result<Vec<String>, GenerateError> {
        let scores = self.cache.relevance_scores(words, query, self.embedder).await?;

        let mut ranked: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        let deterministic_count = if explore {
            ((k as f64) * DETERMINISTIC_FRACTION).floor() as usize
        } else {
            k
        };
        let deterministic_count = deterministic_count.min(ranked.len());

        let mut selected: Vec<usize> = ranked[..deterministic_count]
            .iter()
            .map(|(idx, _)| *idx)
            .collect();

        if explore {
            let remaining_needed = k.saturating_sub(deterministic_count).min(ranked.len().saturating_sub(k));
            if remaining_needed > 0 {
                let tail_start = k.min(ranked.len());
                let mut tail: Vec<usize> = ranked[tail_start..].iter().map(|(idx, _)| *idx).collect();
                match seed {
                    Some(s) => tail.shuffle(&mut StdRng::seed_from_u64(s)),
                    None => tail.shuffle(&mut rand::thread_rng()),
                }
                selected.extend(tail.into_iter().take(remaining_needed));
            }
        }

        Ok(selected.into_iter().map(|idx| words[idx].clone()).collect())
    }
}
