//! Configuration (spec §6.5): TOML file plus the compiled-in defaults,
//! mirroring the sibling example repos' `toml` + `serde` config pattern
//! (the teacher workspace has no config crate of its own).

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VectorConfig {
    pub dimension: usize,
    pub index_path: String,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            dimension: 768,
            index_path: "./index".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbedderSettings {
    pub url: String,
    pub timeout_secs: u64,
    pub retries: u32,
}

impl Default for EmbedderSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
            timeout_secs: 30,
            retries: 3,
        }
    }
}

impl EmbedderSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MmrConfig {
    pub lambda: f32,
}

impl Default for MmrConfig {
    fn default() -> Self {
        Self { lambda: 0.7 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub k_adj: usize,
    pub k_noun: usize,
    /// Whether the Candidate Generator's exploration tail (spec §4.3 step 2)
    /// is sampled at all. Disabling it makes `Recommend` deterministic given
    /// a fixed Embedder and vocabulary (spec §8).
    pub explore: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            k_adj: 20,
            k_noun: 30,
            explore: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    pub k: usize,
    pub top_similar: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            k: 3,
            top_similar: 5,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub vector: VectorConfig,
    pub embedder: EmbedderSettings,
    pub mmr: MmrConfig,
    pub generator: GeneratorConfig,
    pub recommend: RecommendConfig,
}

impl Config {
    /// Load from `path`; falls back to compiled-in defaults with a warning
    /// if the file doesn't exist, matching the Vocabulary Store's
    /// tolerant-loading posture (spec §4.2).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let config: Config = toml::from_str(&contents)?;
                tracing::info!(path = %path.display(), "loaded configuration");
                Ok(config)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "config file not found, using defaults");
                Ok(Config::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn reco_core_embedder_config(&self) -> reco_core::embedder::EmbedderConfig {
        reco_core::embedder::EmbedderConfig {
            url: self.embedder.url.clone(),
            dimension: self.vector.dimension,
            timeout: self.embedder.timeout(),
            retries: self.embedder.retries,
        }
    }
}
