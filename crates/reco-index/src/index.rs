//! AnnIndex: the legacy ANN fallback path (spec §4.6).
//!
//! Content-addressed in-memory vector store guarded by a single
//! readers-writer lock: searches take the read lock, mutations the write
//! lock (spec §5). Brute-force inner product is acceptable up to ~10^6
//! records at D=768 (spec §4.6); this is a flat scan, matching the
//! teacher's `DenseRetriever::retrieve`.

use crate::error::IndexError;
use crate::record::{PhraseRecord, PHRASE_ATTRIBUTE_KEY};
use crate::snapshot;
use reco_core::vector::{dot, normalize};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub num_records: usize,
    pub dimension: usize,
}

/// The legacy ANN fallback index.
pub struct AnnIndex {
    dimension: usize,
    index_path: PathBuf,
    records: RwLock<HashMap<String, PhraseRecord>>,
}

impl AnnIndex {
    /// Open (or create) an index backed by `index_path`. Loads the
    /// snapshot if present; a missing or corrupt snapshot yields an empty,
    /// healthy index with a warning log, never a hard failure.
    pub fn open(index_path: impl AsRef<Path>, dimension: usize) -> Self {
        let index_path = index_path.as_ref().to_path_buf();
        let records = match snapshot::try_load(&index_path) {
            Ok(Some(records)) => {
                tracing::info!(count = records.len(), path = %index_path.display(), "loaded ANN index snapshot");
                records
            }
            Ok(None) => {
                tracing::info!(path = %index_path.display(), "no ANN index snapshot found, starting empty");
                HashMap::new()
            }
            Err(err) => {
                tracing::warn!(%err, path = %index_path.display(), "ANN index snapshot missing or corrupt, starting empty");
                HashMap::new()
            }
        };
        Self {
            dimension,
            index_path,
            records: RwLock::new(records),
        }
    }

    /// Insert or replace records by identifier. Rejects dimension
    /// mismatches; re-normalizes vectors defensively. Persists the
    /// snapshot after the batch commits.
    pub fn add(&self, mut incoming: Vec<PhraseRecord>) -> Result<(), IndexError> {
        for record in &mut incoming {
            if record.vector.len() != self.dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: self.dimension,
                    got: record.vector.len(),
                });
            }
            if !record.attributes.contains_key(PHRASE_ATTRIBUTE_KEY) {
                return Err(IndexError::MissingPhraseAttribute(record.id.clone()));
            }
            normalize(&mut record.vector);
        }

        {
            let mut guard = self.records.write().expect("ANN index lock poisoned");
            for record in incoming {
                guard.insert(record.id.clone(), record);
            }
        }
        self.persist()
    }

    /// Replace a single record's vector and attributes.
    pub fn update(
        &self,
        id: &str,
        vector: Vec<f32>,
        attributes: HashMap<String, String>,
    ) -> Result<(), IndexError> {
        if vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                got: vector.len(),
            });
        }
        if !attributes.contains_key(PHRASE_ATTRIBUTE_KEY) {
            return Err(IndexError::MissingPhraseAttribute(id.to_string()));
        }
        let mut vector = vector;
        normalize(&mut vector);

        {
            let mut guard = self.records.write().expect("ANN index lock poisoned");
            guard.insert(
                id.to_string(),
                PhraseRecord {
                    id: id.to_string(),
                    vector,
                    attributes,
                },
            );
        }
        self.persist()
    }

    /// Remove records by identifier. Unknown identifiers are ignored.
    pub fn delete(&self, ids: &[String]) -> Result<(), IndexError> {
        {
            let mut guard = self.records.write().expect("ANN index lock poisoned");
            for id in ids {
                guard.remove(id);
            }
        }
        self.persist()
    }

    /// Returns the K highest inner-product matches, descending by score,
    /// ties broken by identifier lexicographic order (spec §4.6, §8).
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(String, f32)> {
        let guard = self.records.read().expect("ANN index lock poisoned");
        let mut scored: Vec<(String, String, f32)> = guard
            .values()
            .map(|r| {
                (
                    r.id.clone(),
                    r.phrase().unwrap_or(&r.id).to_string(),
                    dot(query, &r.vector),
                )
            })
            .collect();
        scored.sort_by(|a, b| b.2.total_cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
        scored
            .into_iter()
            .take(k)
            .map(|(_, phrase, score)| (phrase, score))
            .collect()
    }

    pub fn stats(&self) -> IndexStats {
        let guard = self.records.read().expect("ANN index lock poisoned");
        IndexStats {
            num_records: guard.len(),
            dimension: self.dimension,
        }
    }

    /// A healthy index is simply one whose lock is not poisoned; persisted
    /// snapshot state does not affect health (spec §4.6: a missing/corrupt
    /// snapshot yields a healthy, empty index).
    pub fn health_check(&self) -> bool {
        self.records.read().is_ok()
    }

    /// Persist the current snapshot and release any resources.
    pub fn close(&self) -> Result<(), IndexError> {
        self.persist()
    }

    fn persist(&self) -> Result<(), IndexError> {
        let guard = self.records.read().expect("ANN index lock poisoned");
        snapshot::save(&self.index_path, &guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, vector: Vec<f32>, phrase: &str) -> PhraseRecord {
        PhraseRecord::new(id, vector, phrase)
    }

    #[test]
    fn add_rejects_dimension_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let index = AnnIndex::open(dir.path(), 3);
        let result = index.add(vec![rec("a", vec![1.0, 0.0], "x")]);
        assert!(matches!(result, Err(IndexError::DimensionMismatch { .. })));
    }

    #[test]
    fn add_rejects_missing_phrase_attribute() {
        let dir = tempfile::tempdir().unwrap();
        let index = AnnIndex::open(dir.path(), 2);
        let mut bad = rec("a", vec![1.0, 0.0], "x");
        bad.attributes.clear();
        let result = index.add(vec![bad]);
        assert!(matches!(result, Err(IndexError::MissingPhraseAttribute(_))));
    }

    #[test]
    fn search_returns_top_k_descending_with_id_tiebreak() {
        let dir = tempfile::tempdir().unwrap();
        let index = AnnIndex::open(dir.path(), 2);
        index
            .add(vec![
                rec("b", vec![1.0, 0.0], "b phrase"),
                rec("a", vec![1.0, 0.0], "a phrase"),
                rec("c", vec![0.0, 1.0], "c phrase"),
            ])
            .unwrap();

        let results = index.search(&[1.0, 0.0], 2);
        assert_eq!(results.len(), 2);
        // "a phrase" and "b phrase" tie at score 1.0; "a" sorts first lexicographically.
        assert_eq!(results[0].0, "a phrase");
        assert_eq!(results[1].0, "b phrase");
    }

    #[test]
    fn search_tiebreak_follows_id_even_when_phrase_order_differs() {
        let dir = tempfile::tempdir().unwrap();
        let index = AnnIndex::open(dir.path(), 2);
        index
            .add(vec![
                rec("id-a", vec![1.0, 0.0], "z phrase"),
                rec("id-z", vec![1.0, 0.0], "a phrase"),
            ])
            .unwrap();

        let results = index.search(&[1.0, 0.0], 2);
        // Both records tie at score 1.0; "id-a" sorts before "id-z" by
        // identifier even though its phrase sorts after "a phrase".
        assert_eq!(results[0].0, "z phrase");
        assert_eq!(results[1].0, "a phrase");
    }

    #[test]
    fn add_normalizes_defensively() {
        let dir = tempfile::tempdir().unwrap();
        let index = AnnIndex::open(dir.path(), 2);
        index.add(vec![rec("a", vec![3.0, 4.0], "x")]).unwrap();
        let results = index.search(&[1.0, 0.0], 1);
        assert!((results[0].1 - 0.6).abs() < 1e-4);
    }

    #[test]
    fn snapshot_round_trips_through_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let index = AnnIndex::open(dir.path(), 2);
            index.add(vec![rec("a", vec![1.0, 0.0], "x")]).unwrap();
            index.close().unwrap();
        }
        let reopened = AnnIndex::open(dir.path(), 2);
        assert_eq!(reopened.stats().num_records, 1);
    }

    #[test]
    fn missing_snapshot_directory_yields_healthy_empty_index() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("does-not-exist-yet");
        let index = AnnIndex::open(&nested, 2);
        assert!(index.health_check());
        assert_eq!(index.stats().num_records, 0);
    }

    #[test]
    fn corrupt_snapshot_yields_healthy_empty_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("snapshot.json"), b"not json").unwrap();
        let index = AnnIndex::open(dir.path(), 2);
        assert!(index.health_check());
        assert_eq!(index.stats().num_records, 0);
    }

    #[test]
    fn delete_removes_records() {
        let dir = tempfile::tempdir().unwrap();
        let index = AnnIndex::open(dir.path(), 2);
        index.add(vec![rec("a", vec![1.0, 0.0], "x")]).unwrap();
        index.delete(&["a".to_string()]).unwrap();
        assert_eq!(index.stats().num_records, 0);
    }
}
