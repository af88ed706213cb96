//! The Vocabulary Store: two disjoint, ordered, immutable-after-load word lists.
//!
//! Modifiers and Nouns are loaded once at startup from the first readable
//! candidate path, falling back to a compiled-in default set so the system
//! stays operable for tests and smoke runs (see spec §4.2, §6.4).

use crate::error::CoreError;
use std::path::Path;

/// Compiled-in modifiers, used when none of the configured candidate paths
/// are readable at startup.
const DEFAULT_MODIFIERS: &[&str] = &[
    "창의적인",
    "열정적인",
    "꾸준한",
    "분석적인",
    "도전적인",
    "섬세한",
    "협력적인",
    "주도적인",
    "성실한",
    "유연한",
];

/// Compiled-in nouns, used when none of the configured candidate paths are
/// readable at startup.
const DEFAULT_NOUNS: &[&str] = &[
    "개발자",
    "기획자",
    "디자이너",
    "분석가",
    "연구자",
    "문제해결사",
    "학습자",
    "전략가",
    "협업가",
    "실행가",
];

/// Holds the two loaded vocabulary lists.
///
/// Immutable after construction: readers get a plain slice reference, no
/// defensive copy, since every caller treats the lists as read-only (spec
/// §4.2, §5 "Vocabulary lists: read-only; no synchronization needed after
/// init").
#[derive(Debug, Clone)]
pub struct VocabularyStore {
    modifiers: Vec<String>,
    nouns: Vec<String>,
}

impl VocabularyStore {
    /// Load modifiers and nouns, each by trying `modifier_paths`/`noun_paths`
    /// in order and using the first file that can be read. Falls back to the
    /// compiled-in defaults if no candidate path is readable.
    pub fn load(modifier_paths: &[impl AsRef<Path>], noun_paths: &[impl AsRef<Path>]) -> Self {
        let modifiers = Self::load_list(modifier_paths, DEFAULT_MODIFIERS);
        let nouns = Self::load_list(noun_paths, DEFAULT_NOUNS);
        Self { modifiers, nouns }
    }

    /// Construct directly from in-memory lists (tests, embedding the store
    /// behind a different loader).
    pub fn from_lists(modifiers: Vec<String>, nouns: Vec<String>) -> Self {
        Self { modifiers, nouns }
    }

    /// Construct from the compiled-in defaults only.
    pub fn defaults() -> Self {
        Self {
            modifiers: DEFAULT_MODIFIERS.iter().map(|s| s.to_string()).collect(),
            nouns: DEFAULT_NOUNS.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn load_list(paths: &[impl AsRef<Path>], default: &[&str]) -> Vec<String> {
        for path in paths {
            match std::fs::read_to_string(path) {
                Ok(contents) => {
                    let parsed = parse_word_list(&contents);
                    if !parsed.is_empty() {
                        tracing::info!(path = %path.as_ref().display(), count = parsed.len(), "loaded vocabulary list");
                        return parsed;
                    }
                    tracing::warn!(path = %path.as_ref().display(), "vocabulary file was empty after trimming comments/blanks");
                }
                Err(err) => {
                    tracing::debug!(path = %path.as_ref().display(), %err, "vocabulary candidate path unreadable, trying next");
                }
            }
        }
        tracing::warn!("no vocabulary source was readable, falling back to compiled-in default set");
        default.iter().map(|s| s.to_string()).collect()
    }

    /// Returns the modifiers list (stable ordering, no duplicates expected
    /// but not deduplicated — callers treat it read-only).
    pub fn modifiers(&self) -> &[String] {
        &self.modifiers
    }

    /// Returns the nouns list.
    pub fn nouns(&self) -> &[String] {
        &self.nouns
    }

    /// Fails fast if either list ended up empty — startup-time vocabulary
    /// failure is fatal per spec §4.7.
    pub fn validate_nonempty(&self) -> Result<(), CoreError> {
        if self.modifiers.is_empty() || self.nouns.is_empty() {
            return Err(CoreError::VocabLoad(
                "modifiers and nouns must both be non-empty after load".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse a vocabulary text file: one entry per line, trimmed; blank lines
/// and lines whose first non-space character is `#` are dropped.
fn parse_word_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.to_string())
        .collect()
}
