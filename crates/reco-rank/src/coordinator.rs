//! Recommendation Coordinator (C7, spec §4.7): embed → generate → score →
//! rerank, with fallback to the ANN path on Embedder failure.

use crate::config::Config;
use crate::error::RecommendError;
use crate::resume::{RequestStatus, ResumeId, ResumeStore};
use reco_core::embedder::Embedder;
use reco_core::vector::Vector;
use reco_core::vocab::VocabularyStore;
use reco_generate::candidate::{Candidate, ScoredCandidate};
use reco_generate::generator::CandidateGenerator;
use reco_generate::relevance::RelevanceCache;
use reco_generate::scorer::score_candidates;
use reco_index::index::AnnIndex;
use reco_rerank::mmr::mmr_select_default;
use std::sync::Arc;
use std::time::Duration;

const MIN_TEXT_LEN: usize = 10;
const MAX_TEXT_LEN: usize = 50_000;

/// Number of ANN candidates pulled before reranking in the fallback path
/// (spec §4.7 step 8: "call ANN Search with (q, 50)").
const ANN_FALLBACK_POOL: usize = 50;

/// Fixed labels returned by the DEFAULTED safety net (spec §4.7 step 8,
/// §9 "a product, not correctness, decision"). Distinguishable in logs
/// from genuine recommendations via [`DefaultedReason`].
const DEFAULT_LABELS: &[&str] = &["성실한 실행가", "꾸준한 학습자", "협력적인 문제해결사"];

/// Why the DEFAULTED safety net fired, logged at `warn!` so it is never
/// confused with a genuine recommendation (spec §7 "MUST be
/// distinguishable in logs").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultedReason {
    /// The ANN fallback pool came back empty.
    AnnFallbackEmpty,
}

/// A candidate together with its similarity, returned alongside the final
/// titles (spec §6.2 "top_similar").
#[derive(Debug, Clone)]
pub struct TopSimilarEntry {
    pub phrase: String,
    pub similarity: f32,
}

#[derive(Debug, Clone)]
pub struct RecommendationResult {
    pub titles: Vec<String>,
    pub top_similar: Vec<TopSimilarEntry>,
    /// `Some` only when the DEFAULTED safety net fired.
    pub defaulted: Option<DefaultedReason>,
}

/// Per-request deadline/cancellation, propagated to the Embedder (spec
/// §5 "The Coordinator MUST accept a deadline/cancellation token per
/// request... and abort promptly on cancellation").
#[derive(Clone, Default)]
pub struct RequestContext {
    cancelled: Arc<std::sync::atomic::AtomicBool>,
    deadline: Option<tokio::time::Instant>,
    /// Seeds the Candidate Generator's exploration tail. Calling `Recommend`
    /// twice with the same seed yields equal titles (spec §8 round-trip law).
    seed: Option<u64>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::new(std::sync::atomic::AtomicBool::new(false)),
            deadline: Some(tokio::time::Instant::now() + timeout),
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), RecommendError> {
        if self.is_cancelled() {
            Err(RecommendError::RecommendationUnavailable(
                "request cancelled".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

pub struct Coordinator {
    embedder: Arc<dyn Embedder>,
    vocab: Arc<VocabularyStore>,
    ann_index: Arc<AnnIndex>,
    resume_store: Arc<dyn ResumeStore>,
    config: Config,
    /// Shared, read-mostly per-word vector cache, bounded by |A| + |N| and
    /// reused across every request (spec §5, §4.3).
    candidate_cache: RelevanceCache,
}

impl Coordinator {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        vocab: Arc<VocabularyStore>,
        ann_index: Arc<AnnIndex>,
        resume_store: Arc<dyn ResumeStore>,
        config: Config,
    ) -> Self {
        Self {
            embedder,
            vocab,
            ann_index,
            resume_store,
            config,
            candidate_cache: RelevanceCache::new(),
        }
    }

    /// `Recommend(resumeId, K) -> RecommendationResult` (spec §4.7).
    pub async fn recommend(
        &self,
        id: ResumeId,
        k: Option<usize>,
        ctx: &RequestContext,
    ) -> Result<RecommendationResult, RecommendError> {
        let k = k.unwrap_or(self.config.recommend.k);
        let top_n = self.config.recommend.top_similar;

        // LOADED
        let text = self.resume_store.get_text(id)?;
        self.resume_store.set_status(id, RequestStatus::Processing);

        let outcome = self.recommend_inner(&text, k, top_n, ctx).await;

        match &outcome {
            Ok(_) => self.resume_store.set_status(id, RequestStatus::Completed),
            Err(_) => self.resume_store.set_status(id, RequestStatus::Failed),
        }
        outcome
    }

    async fn recommend_inner(
        &self,
        text: &str,
        k: usize,
        top_n: usize,
        ctx: &RequestContext,
    ) -> Result<RecommendationResult, RecommendError> {
        let char_count = text.chars().count();
        if !(MIN_TEXT_LEN..=MAX_TEXT_LEN).contains(&char_count) {
            return Err(RecommendError::ValidationError(format!(
                "text length {char_count} outside allowed range [{MIN_TEXT_LEN}, {MAX_TEXT_LEN}]"
            )));
        }
        ctx.check()?;

        // EMBEDDED
        let embed_result = self.embed_with_deadline(text, ctx).await;

        match embed_result {
            Ok(query) => {
                ctx.check()?;
                match self.try_dynamic_path(&query, k, top_n, ctx).await {
                    Ok(result) => Ok(result),
                    Err(err) => {
                        tracing::warn!(%err, "dynamic path failed after a valid embedding, falling back to ANN");
                        self.fallback(Some(&query), k, top_n).await
                    }
                }
            }
            Err(err) => {
                tracing::warn!(%err, "embedder unavailable, falling back to ANN with no query vector");
                self.fallback(None, k, top_n).await
            }
        }
    }

    async fn embed_with_deadline(
        &self,
        text: &str,
        ctx: &RequestContext,
    ) -> Result<Vector, RecommendError> {
        let fut = self.embedder.embed(text);
        let result = match ctx.deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
                match tokio::time::timeout(remaining, fut).await {
                    Ok(inner) => inner,
                    Err(_) => {
                        return Err(RecommendError::EmbedderUnavailable(
                            "request deadline exceeded while embedding".to_string(),
                        ))
                    }
                }
            }
            None => fut.await,
        };
        result.map_err(RecommendError::from)
    }

    /// GENERATED → SCORED → RERANKED, given a valid query vector.
    async fn try_dynamic_path(
        &self,
        query: &Vector,
        k: usize,
        top_n: usize,
        ctx: &RequestContext,
    ) -> Result<RecommendationResult, RecommendError> {
        let generator = CandidateGenerator::new(self.embedder.as_ref(), &self.candidate_cache);
        let candidates = generator
            .generate(
                &self.vocab,
                query,
                self.config.generator.k_adj,
                self.config.generator.k_noun,
                ctx.seed(),
                self.config.generator.explore,
            )
            .await
            .map_err(|e| RecommendError::EmbedderUnavailable(e.to_string()))?;
        ctx.check()?;

        let scored = score_candidates(self.embedder.as_ref(), query, candidates)
            .await
            .map_err(|e| RecommendError::EmbedderUnavailable(e.to_string()))?;
        ctx.check()?;

        Ok(finalize(scored, k, top_n, self.config.mmr.lambda))
    }

    /// FALLBACK → ANN_SEARCHED → RERANKED (or DEFAULTED on an empty pool).
    ///
    /// `query` is `None` when the dynamic path failed before producing any
    /// embedding at all (the Embedder itself is down): in that case the
    /// search uses a neutral all-zero query, since no semantic
    /// representation of the input exists. An empty ANN pool under a
    /// *real* query triggers the DEFAULTED safety net; an empty pool with
    /// no real query at all means neither path produced anything
    /// meaningful, which is fatal (spec §8 scenario 4).
    async fn fallback(
        &self,
        query: Option<&Vector>,
        k: usize,
        top_n: usize,
    ) -> Result<RecommendationResult, RecommendError> {
        let dimension = self.config.vector.dimension;
        let zero_query;
        let search_vector: &[f32] = match query {
            Some(q) => q,
            None => {
                zero_query = vec![0.0f32; dimension];
                &zero_query
            }
        };

        let ann_results = self.ann_index.search(search_vector, ANN_FALLBACK_POOL);

        if ann_results.is_empty() {
            if query.is_none() {
                return Err(RecommendError::RecommendationUnavailable(
                    "embedder unavailable and ANN fallback pool is empty".to_string(),
                ));
            }
            tracing::warn!(reason = ?DefaultedReason::AnnFallbackEmpty, "ANN fallback pool empty, returning DEFAULTED labels");
            return Ok(RecommendationResult {
                titles: DEFAULT_LABELS.iter().map(|s| s.to_string()).collect(),
                top_similar: Vec::new(),
                defaulted: Some(DefaultedReason::AnnFallbackEmpty),
            });
        }

        let scored: Vec<ScoredCandidate> = ann_results
            .into_iter()
            .map(|(phrase, score)| ScoredCandidate {
                candidate: candidate_from_phrase(&phrase),
                score,
            })
            .collect();

        Ok(finalize(scored, k, top_n, self.config.mmr.lambda))
    }
}

/// Reconstruct a [`Candidate`] from an ANN-sourced phrase string, splitting
/// on the first space so `Candidate::rendering()` exactly reproduces the
/// original phrase.
fn candidate_from_phrase(phrase: &str) -> Candidate {
    match phrase.split_once(' ') {
        Some((modifier, noun)) => Candidate::new(modifier, noun),
        None => Candidate::new(phrase, ""),
    }
}

/// Compute the top-N by raw relevance (pre-diversity) and run MMR for the
/// final K (spec §4.7 steps 6-7).
fn finalize(scored: Vec<ScoredCandidate>, k: usize, top_n: usize, lambda: f32) -> RecommendationResult {
    let mut by_relevance = scored.clone();
    by_relevance.sort_by(|a, b| b.score.total_cmp(&a.score));
    let top_similar = by_relevance
        .into_iter()
        .take(top_n)
        .map(|sc| TopSimilarEntry {
            phrase: sc.rendering(),
            similarity: sc.score,
        })
        .collect();

    let selected = mmr_select_default(&scored, k, lambda);
    let titles = selected.into_iter().map(|sc| sc.rendering()).collect();

    RecommendationResult {
        titles,
        top_similar,
        defaulted: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::InMemoryResumeStore;
    use reco_core::embedder::mock::MockEmbedder;
    use reco_index::record::PhraseRecord;

    fn coordinator_with(
        embedder: MockEmbedder,
        vocab: VocabularyStore,
        ann_index: AnnIndex,
    ) -> (Coordinator, Arc<InMemoryResumeStore>) {
        let resume_store = Arc::new(InMemoryResumeStore::new());
        let coordinator = Coordinator::new(
            Arc::new(embedder),
            Arc::new(vocab),
            Arc::new(ann_index),
            resume_store.clone(),
            Config::default(),
        );
        (coordinator, resume_store)
    }

    #[tokio::test]
    async fn happy_path_returns_k_titles() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = MockEmbedder::new(16);
        let vocab = VocabularyStore::defaults();
        let ann_index = AnnIndex::open(dir.path(), 16);
        let (coordinator, resume_store) = coordinator_with(embedder, vocab, ann_index);

        let id = resume_store.put("a".repeat(50)).unwrap();
        let result = coordinator
            .recommend(id, Some(3), &RequestContext::new())
            .await
            .unwrap();

        assert_eq!(result.titles.len(), 3);
        assert!(result.defaulted.is_none());
    }

    #[tokio::test]
    async fn candidate_relevance_cache_is_shared_across_requests() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = MockEmbedder::new(16);
        let calls = embedder.calls.clone();
        let vocab = VocabularyStore::defaults();
        let ann_index = AnnIndex::open(dir.path(), 16);
        let (coordinator, resume_store) = coordinator_with(embedder, vocab, ann_index);

        let id1 = resume_store.put("a".repeat(50)).unwrap();
        coordinator
            .recommend(id1, Some(3), &RequestContext::new())
            .await
            .unwrap();
        let first_request_calls = calls.load(std::sync::atomic::Ordering::SeqCst);

        let id2 = resume_store.put("a".repeat(50)).unwrap();
        coordinator
            .recommend(id2, Some(3), &RequestContext::new())
            .await
            .unwrap();
        let second_request_calls = calls.load(std::sync::atomic::Ordering::SeqCst) - first_request_calls;

        assert!(
            second_request_calls < first_request_calls,
            "second request ({second_request_calls}) should skip the vocabulary embedding already cached from the first ({first_request_calls})"
        );
    }

    #[tokio::test]
    async fn resume_not_found_short_circuits_before_embedding() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = MockEmbedder::new(16);
        let vocab = VocabularyStore::defaults();
        let ann_index = AnnIndex::open(dir.path(), 16);
        let (coordinator, _resume_store) = coordinator_with(embedder, vocab, ann_index);

        let result = coordinator
            .recommend(ResumeId::new(), None, &RequestContext::new())
            .await;
        assert!(matches!(result, Err(RecommendError::ResumeNotFound(_))));
    }

    #[tokio::test]
    async fn text_too_short_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = MockEmbedder::new(16);
        let vocab = VocabularyStore::defaults();
        let ann_index = AnnIndex::open(dir.path(), 16);
        let (coordinator, resume_store) = coordinator_with(embedder, vocab, ann_index);

        let id = resume_store.put("short".to_string()).unwrap();
        let result = coordinator.recommend(id, None, &RequestContext::new()).await;
        assert!(matches!(result, Err(RecommendError::ValidationError(_))));
    }

    #[tokio::test]
    async fn embedder_failure_falls_back_to_seeded_ann_index() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = MockEmbedder::failing(16);
        let vocab = VocabularyStore::defaults();
        let ann_index = AnnIndex::open(dir.path(), 16);
        for i in 0..10 {
            ann_index
                .add(vec![PhraseRecord::new(
                    format!("id-{i}"),
                    {
                        let mut v = vec![0.0f32; 16];
                        v[i % 16] = 1.0;
                        v
                    },
                    format!("모디파이어{i} 명사{i}"),
                )])
                .unwrap();
        }
        let (coordinator, resume_store) = coordinator_with(embedder, vocab, ann_index);

        let id = resume_store.put("a".repeat(50)).unwrap();
        let result = coordinator
            .recommend(id, Some(3), &RequestContext::new())
            .await
            .unwrap();

        assert!(!result.titles.is_empty());
        assert_eq!(result.top_similar.len(), 5.min(10));
        assert!(result.defaulted.is_none());
    }

    #[tokio::test]
    async fn both_paths_failing_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = MockEmbedder::failing(16);
        let vocab = VocabularyStore::defaults();
        let ann_index = AnnIndex::open(dir.path(), 16);
        let (coordinator, resume_store) = coordinator_with(embedder, vocab, ann_index);

        let id = resume_store.put("a".repeat(50)).unwrap();
        let result = coordinator.recommend(id, Some(3), &RequestContext::new()).await;
        assert!(matches!(
            result,
            Err(RecommendError::RecommendationUnavailable(_))
        ));
    }

    #[test]
    fn diversity_limits_shared_modifier_among_final_titles() {
        let mut candidates: Vec<ScoredCandidate> = (0..30)
            .map(|i| ScoredCandidate {
                candidate: Candidate::new("성실한", format!("명사{i}")),
                score: 1.0 - 0.02 * i as f32,
            })
            .collect();
        candidates.push(ScoredCandidate {
            candidate: Candidate::new("열정적인", "전략가"),
            score: 0.97,
        });
        candidates.push(ScoredCandidate {
            candidate: Candidate::new("분석적인", "연구자"),
            score: 0.95,
        });

        let result = finalize(candidates, 3, 5, 0.7);
        let shared_modifier_count = result
            .titles
            .iter()
            .filter(|title| title.starts_with("성실한 "))
            .count();
        assert!(shared_modifier_count <= 2, "titles: {:?}", result.titles);
    }

    #[test]
    fn top_similar_best_score_bounds_every_title_relevance() {
        let candidates = vec![
            ScoredCandidate {
                candidate: Candidate::new("성실한", "실행가"),
                score: 0.9,
            },
            ScoredCandidate {
                candidate: Candidate::new("꾸준한", "학습자"),
                score: 0.85,
            },
            ScoredCandidate {
                candidate: Candidate::new("분석적인", "전략가"),
                score: 0.3,
            },
            ScoredCandidate {
                candidate: Candidate::new("도전적인", "문제해결사"),
                score: 0.1,
            },
        ];
        let result = finalize(candidates.clone(), 3, 5, 0.7);

        let best_relevance = candidates
            .iter()
            .map(|c| c.score)
            .fold(f32::MIN, f32::max);
        assert_eq!(result.top_similar[0].similarity, best_relevance);

        for title in &result.titles {
            let relevance = candidates
                .iter()
                .find(|c| &c.rendering() == title)
                .unwrap()
                .score;
            assert!(result.top_similar[0].similarity >= relevance);
        }
    }

    #[tokio::test]
    async fn cancelled_context_aborts_before_embedding() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = MockEmbedder::new(16);
        let vocab = VocabularyStore::defaults();
        let ann_index = AnnIndex::open(dir.path(), 16);
        let (coordinator, resume_store) = coordinator_with(embedder, vocab, ann_index);

        let id = resume_store.put("a".repeat(50)).unwrap();
        let ctx = RequestContext::new();
        ctx.cancel();
        let result = coordinator.recommend(id, Some(3), &ctx).await;
        assert!(matches!(
            result,
            Err(RecommendError::RecommendationUnavailable(_))
        ));
    }
}
