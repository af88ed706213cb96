//! Maximal Marginal Relevance selection (spec §4.5).

use crate::similarity::{mutual_similarity, MutualSimilarity, TokenJaccardSimilarity};
use reco_generate::candidate::ScoredCandidate;

/// Default λ: relevance-dominant (spec §4.5 "Default λ: 0.7").
pub const DEFAULT_LAMBDA: f32 = 0.7;

/// Select up to `k` candidates from `candidates`, trading relevance against
/// mutual dissimilarity. Deterministic given `candidates`' order: ties are
/// broken by original rank (rank established by the initial relevance
/// sort, not input order). Output length is `min(k, candidates.len())` and
/// contains no duplicates (spec §3 "Reranker output").
pub fn mmr_select(
    candidates: &[ScoredCandidate],
    k: usize,
    lambda: f32,
    metric: &dyn MutualSimilarity,
) -> Vec<ScoredCandidate> {
    let n = candidates.len();
    let k = k.min(n);
    if k == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        candidates[b]
            .score
            .total_cmp(&candidates[a].score)
            .then(a.cmp(&b))
    });
    let mut rank = vec![0usize; n];
    for (pos, &idx) in order.iter().enumerate() {
        rank[idx] = pos;
    }

    let mut remaining = order;
    let mut selected: Vec<usize> = Vec::with_capacity(k);
    selected.push(remaining.remove(0));

    while selected.len() < k && !remaining.is_empty() {
        let mut best_pos = 0usize;
        let mut best_mmr = f32::NEG_INFINITY;
        let mut best_rank = usize::MAX;

        for (pos, &cand_idx) in remaining.iter().enumerate() {
            let rel = candidates[cand_idx].score;
            let max_sim = selected
                .iter()
                .map(|&s| mutual_similarity(&candidates[cand_idx], &candidates[s], metric))
                .fold(f32::MIN, f32::max);
            let mmr = lambda * rel - (1.0 - lambda) * max_sim;
            let r = rank[cand_idx];

            if mmr > best_mmr || (mmr == best_mmr && r < best_rank) {
                best_mmr = mmr;
                best_pos = pos;
                best_rank = r;
            }
        }

        let chosen = remaining.remove(best_pos);
        selected.push(chosen);
    }

    selected.into_iter().map(|idx| candidates[idx].clone()).collect()
}

/// Convenience wrapper using the default token-Jaccard metric.
pub fn mmr_select_default(candidates: &[ScoredCandidate], k: usize, lambda: f32) -> Vec<ScoredCandidate> {
    mmr_select(candidates, k, lambda, &TokenJaccardSimilarity)
}
