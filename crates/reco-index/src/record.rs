//! PhraseRecord: an identifier, a normalized vector, and an opaque
//! attribute map carrying the human-readable phrase (spec §3).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The attribute key every record must carry (spec §3 "must carry the
/// human-readable phrase under the key `phrase`").
pub const PHRASE_ATTRIBUTE_KEY: &str = "phrase";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseRecord {
    pub id: String,
    pub vector: Vec<f32>,
    #[serde(rename = "metadata")]
    pub attributes: HashMap<String, String>,
}

impl PhraseRecord {
    pub fn new(id: impl Into<String>, vector: Vec<f32>, phrase: impl Into<String>) -> Self {
        let mut attributes = HashMap::new();
        attributes.insert(PHRASE_ATTRIBUTE_KEY.to_string(), phrase.into());
        Self {
            id: id.into(),
            vector,
            attributes,
        }
    }

    pub fn phrase(&self) -> Option<&str> {
        self.attributes.get(PHRASE_ATTRIBUTE_KEY).map(|s| s.as_str())
    }
}
