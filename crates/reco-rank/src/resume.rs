//! Resume Store façade (C8, spec §3 "Resume Identifier", SPEC_FULL §C).
//!
//! A minimal in-process implementation sufficient to exercise the
//! Coordinator end to end without a real HTTP intake layer; durability of
//! this store has no bearing on the core's correctness.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use uuid::Uuid;

/// An opaque globally unique resume identifier (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResumeId(pub Uuid);

impl ResumeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ResumeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ResumeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ResumeId {
    type Err = uuid::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Advisory processing status reported by the Coordinator (spec §4.7
/// "Status reporting to the Resume Store façade"). Durability of this
/// status is not load-bearing for correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("resume identifier {0} is unknown")]
    NotFound(ResumeId),
}

struct Entry {
    text: String,
    status: RequestStatus,
}

/// Maps an opaque resume identifier to the original text (spec §3).
pub trait ResumeStore: Send + Sync {
    fn get_text(&self, id: ResumeId) -> Result<String, ResumeError>;
    fn put(&self, text: String) -> Result<ResumeId, ResumeError>;
    fn set_status(&self, id: ResumeId, status: RequestStatus);
    fn get_status(&self, id: ResumeId) -> Option<RequestStatus>;
}

/// `RwLock<HashMap<...>>`-backed in-memory implementation.
#[derive(Default)]
pub struct InMemoryResumeStore {
    entries: RwLock<HashMap<ResumeId, Entry>>,
}

impl InMemoryResumeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResumeStore for InMemoryResumeStore {
    fn get_text(&self, id: ResumeId) -> Result<String, ResumeError> {
        let guard = self.entries.read().expect("resume store lock poisoned");
        guard
            .get(&id)
            .map(|e| e.text.clone())
            .ok_or(ResumeError::NotFound(id))
    }

    fn put(&self, text: String) -> Result<ResumeId, ResumeError> {
        let id = ResumeId::new();
        let mut guard = self.entries.write().expect("resume store lock poisoned");
        guard.insert(
            id,
            Entry {
                text,
                status: RequestStatus::Processing,
            },
        );
        Ok(id)
    }

    fn set_status(&self, id: ResumeId, status: RequestStatus) {
        let mut guard = self.entries.write().expect("resume store lock poisoned");
        if let Some(entry) = guard.get_mut(&id) {
            entry.status = status;
        }
    }

    fn get_status(&self, id: ResumeId) -> Option<RequestStatus> {
        let guard = self.entries.read().expect("resume store lock poisoned");
        guard.get(&id).map(|e| e.status)
    }
}
