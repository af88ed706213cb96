//! Candidate and ScoredCandidate: a (modifier, noun) pair and its
//! canonical rendering (spec §3 "Candidate C").

use std::fmt;

/// A (modifier, noun) pair. Equality and hashing are defined on the
/// canonical rendering, not the field pair, per spec §3 ("Two candidates
/// are equal iff their renderings are equal").
#[derive(Debug, Clone)]
pub struct Candidate {
    pub modifier: String,
    pub noun: String,
}

impl Candidate {
    pub fn new(modifier: impl Into<String>, noun: impl Into<String>) -> Self {
        Self {
            modifier: modifier.into(),
            noun: noun.into(),
        }
    }

    /// The canonical text rendering: `"{modifier} {noun}"`.
    pub fn rendering(&self) -> String {
        format!("{} {}", self.modifier, self.noun)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rendering())
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.rendering() == other.rendering()
    }
}
impl Eq for Candidate {}

impl std::hash::Hash for Candidate {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.rendering().hash(state);
    }
}

/// A [`Candidate`] paired with a similarity score in `[-1, 1]`, produced by
/// the Scorer. Transient: lives only for the duration of a single request
/// (spec §3).
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: f32,
}

impl ScoredCandidate {
    pub fn rendering(&self) -> String {
        self.candidate.rendering()
    }
}
