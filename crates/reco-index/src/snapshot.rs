//! JSON snapshot persistence: atomic write-to-temp-then-rename, grounded
//! in the teacher's `Directory::atomic_write` pattern (spec §4.6
//! "Persistence").

use crate::error::IndexError;
use crate::record::PhraseRecord;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

const SNAPSHOT_FILE_NAME: &str = "snapshot.json";

fn snapshot_path(dir: &Path) -> PathBuf {
    dir.join(SNAPSHOT_FILE_NAME)
}

/// Serialize `records` to the snapshot file under `dir`, via a temp file
/// that is fsynced then renamed into place so a crash mid-write never
/// leaves a half-written snapshot visible.
pub fn save(dir: &Path, records: &HashMap<String, PhraseRecord>) -> Result<(), IndexError> {
    std::fs::create_dir_all(dir)?;
    let final_path = snapshot_path(dir);
    let temp_path = final_path.with_extension("json.tmp");

    let data = serde_json::to_vec(records)
        .map_err(|e| IndexError::CorruptSnapshot(format!("failed to serialize snapshot: {e}")))?;

    {
        let mut temp_file = std::fs::File::create(&temp_path)?;
        temp_file.write_all(&data)?;
        temp_file.sync_all()?;
    }
    std::fs::rename(&temp_path, &final_path)?;

    if let Some(parent) = final_path.parent() {
        if let Ok(parent_file) = std::fs::File::open(parent) {
            let _ = parent_file.sync_all();
        }
    }
    Ok(())
}

/// Load the snapshot under `dir`. Returns `Ok(None)` if no snapshot file
/// exists yet (first run). A corrupt/undeserializable file is reported as
/// [`IndexError::CorruptSnapshot`]; callers treat both cases as "start
/// from an empty index" per spec §4.6.
pub fn try_load(dir: &Path) -> Result<Option<HashMap<String, PhraseRecord>>, IndexError> {
    let path = snapshot_path(dir);
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read(&path)?;
    let records = serde_json::from_slice(&contents)
        .map_err(|e| IndexError::CorruptSnapshot(format!("{}: {e}", path.display())))?;
    Ok(Some(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut records = HashMap::new();
        records.insert(
            "id-1".to_string(),
            PhraseRecord::new("id-1", vec![0.1, 0.2, 0.3], "창의적인 개발자"),
        );
        save(dir.path(), &records).unwrap();

        let loaded = try_load(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["id-1"].phrase(), Some("창의적인 개발자"));
    }

    #[test]
    fn missing_snapshot_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(try_load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn corrupt_snapshot_is_reported_as_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SNAPSHOT_FILE_NAME), b"not json").unwrap();
        assert!(try_load(dir.path()).is_err());
    }

    #[test]
    fn persisted_record_uses_metadata_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut records = HashMap::new();
        records.insert(
            "id-1".to_string(),
            PhraseRecord::new("id-1", vec![0.1, 0.2, 0.3], "창의적인 개발자"),
        );
        save(dir.path(), &records).unwrap();

        let contents = std::fs::read_to_string(snapshot_path(dir.path())).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert!(raw["id-1"].get("metadata").is_some());
        assert!(raw["id-1"].get("attributes").is_none());
    }
}
