//! Per-word relevance cache: embeds vocabulary words against the
//! Embedder, batching misses and caching hits (spec §4.3 step 1,
//! §5 "Per-word vector cache in the Candidate Generator: shared,
//! read-mostly; must be safe for concurrent reads and serialized writes").

use reco_core::embedder::Embedder;
use reco_core::error::CoreError;
use reco_core::vector::{dot, Vector};
use std::collections::HashMap;
use std::sync::RwLock;

/// Caches the embedding of each vocabulary word seen so far. Bounded by
/// `|A| + |N|` since the vocabulary is fixed at startup (spec §5).
#[derive(Default)]
pub struct RelevanceCache {
    vectors: RwLock<HashMap<String, Vector>>,
}

impl RelevanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the embedding for each of `words`, in order, embedding any
    /// cache misses in a single batch call and populating the cache.
    pub async fn vectors_for(
        &self,
        words: &[String],
        embedder: &dyn Embedder,
    ) -> Result<Vec<Vector>, CoreError> {
        let mut missing: Vec<String> = Vec::new();
        {
            let guard = self.vectors.read().expect("relevance cache poisoned");
            for w in words {
                if !guard.contains_key(w) {
                    missing.push(w.clone());
                }
            }
        }
        if !missing.is_empty() {
            let embedded = embedder.embed_batch(&missing).await?;
            let mut guard = self.vectors.write().expect("relevance cache poisoned");
            for (word, vector) in missing.into_iter().zip(embedded.into_iter()) {
                guard.insert(word, vector);
            }
        }
        let guard = self.vectors.read().expect("relevance cache poisoned");
        Ok(words
            .iter()
            .map(|w| guard.get(w).cloned().expect("just populated above"))
            .collect())
    }

    /// Per-word relevance scores `cos(q, v_w) = <q, v_w>` (both sides are
    /// L2-normalized, so plain dot product suffices).
    pub async fn relevance_scores(
        &self,
        words: &[String],
        query: &[f32],
        embedder: &dyn Embedder,
    ) -> Result<Vec<f32>, CoreError> {
        let vectors = self.vectors_for(words, embedder).await?;
        Ok(vectors.iter().map(|v| dot(query, v)).collect())
    }

    pub fn len(&self) -> usize {
        self.vectors.read().expect("relevance cache poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
