//! The Embedder: maps text to an L2-normalized dense vector (spec §4.1, §6.1).
//!
//! Consumed as two JSON operations over HTTP (`POST /embed`,
//! `POST /embed/phrases`) plus a `GET /health` readiness check. Every
//! vector returned by an `Embedder` implementation must be dimension-`D`
//! and L2-normalized; `HttpEmbedder` enforces this defensively even though
//! the wire contract already promises it.

use crate::error::CoreError;
use crate::vector::{normalize, Vector};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default per-word/per-phrase batch window used when chunking large
/// `embed_batch` calls (spec §4.1: "implementations batch internally with
/// a window of ~32").
pub const DEFAULT_BATCH_WINDOW: usize = 32;

/// Maps text to a dense semantic representation.
///
/// Implementations MUST be safe to call from any thread without external
/// synchronization (spec §5: "The Embedder is expected to be thread-safe").
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vector, CoreError>;

    /// Embed a batch of texts, order-preserving. The default implementation
    /// chunks into windows of [`DEFAULT_BATCH_WINDOW`] and calls the
    /// implementation's batch transport once per chunk; HTTP-backed
    /// implementations should override this to make fewer round trips.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vector>, CoreError>;

    /// The fixed embedding dimension this embedder produces.
    fn dimension(&self) -> usize;
}

/// Configuration for the HTTP-backed embedder client (spec §6.5).
#[derive(Debug, Clone)]
pub struct EmbedderConfig {
    pub url: String,
    pub dimension: usize,
    pub timeout: Duration,
    pub retries: u32,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
            dimension: 768,
            timeout: Duration::from_secs(30),
            retries: 3,
        }
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    vector: Vec<f32>,
}

#[derive(Serialize)]
struct EmbedPhrasesRequest<'a> {
    phrases: &'a [String],
}

#[derive(Deserialize)]
struct EmbedPhrasesResponseItem {
    phrase: String,
    vector: Vec<f32>,
}

#[derive(Deserialize)]
struct EmbedPhrasesResponse {
    results: Vec<EmbedPhrasesResponseItem>,
}

/// HTTP client implementation of [`Embedder`] against the wire protocol in
/// spec §6.1.
///
/// Retries transient transport/5xx errors up to `config.retries` times with
/// linear backoff; 4xx errors are never retried (spec §5 "Timeout policy").
pub struct HttpEmbedder {
    client: reqwest::Client,
    config: EmbedderConfig,
}

impl HttpEmbedder {
    pub fn new(config: EmbedderConfig) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CoreError::EmbedderUnavailable(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// `GET /health` readiness check.
    pub async fn health_check(&self) -> bool {
        match self.client.get(format!("{}/health", self.config.url)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn validate_dimension(&self, v: &[f32]) -> Result<(), CoreError> {
        if v.len() != self.config.dimension {
            return Err(CoreError::DimensionMismatch {
                expected: self.config.dimension,
                got: v.len(),
            });
        }
        Ok(())
    }

    async fn post_with_retry<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &Req,
    ) -> Result<Resp, CoreError> {
        let url = format!("{}{}", self.config.url, path);
        let mut attempt = 0u32;
        loop {
            let result = self.client.post(&url).json(body).send().await;
            match result {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return resp
                            .json::<Resp>()
                            .await
                            .map_err(|e| CoreError::EmbedderUnavailable(format!("malformed response: {e}")));
                    }
                    if status.is_client_error() {
                        return Err(CoreError::EmbedderUnavailable(format!(
                            "embedder rejected request with {status}"
                        )));
                    }
                    tracing::warn!(%status, attempt, "embedder returned server error, retrying");
                }
                Err(err) => {
                    tracing::warn!(%err, attempt, "embedder transport error, retrying");
                }
            }
            if attempt >= self.config.retries {
                return Err(CoreError::EmbedderUnavailable(format!(
                    "embedder unreachable after {} retries",
                    self.config.retries
                )));
            }
            attempt += 1;
            tokio::time::sleep(Duration::from_millis(100 * attempt as u64)).await;
        }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vector, CoreError> {
        let resp: EmbedResponse = self
            .post_with_retry("/embed", &EmbedRequest { text })
            .await?;
        let mut v = resp.vector;
        self.validate_dimension(&v)?;
        normalize(&mut v);
        Ok(v)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vector>, CoreError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let mut out: Vec<Vector> = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(DEFAULT_BATCH_WINDOW) {
            let resp: EmbedPhrasesResponse = self
                .post_with_retry("/embed/phrases", &EmbedPhrasesRequest { phrases: chunk })
                .await?;
            if resp.results.len() != chunk.len() {
                return Err(CoreError::EmbedderUnavailable(format!(
                    "batch response length {} did not match request length {}",
                    resp.results.len(),
                    chunk.len()
                )));
            }
            for item in resp.results {
                let mut v = item.vector;
                self.validate_dimension(&v)?;
                normalize(&mut v);
                out.push(v);
            }
        }
        Ok(out)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}

/// Test-only embedder implementations, exported for use by downstream
/// crates' dev-dependencies under the `test-util` feature.
#[cfg(any(test, feature = "test-util"))]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// A deterministic in-process embedder for coordinator/generator tests:
    /// hashes the text into a fixed-dimension vector, so repeated calls with
    /// the same text are idempotent (spec §4.1 "deterministic for a given
    /// model version").
    pub struct MockEmbedder {
        pub dimension: usize,
        pub calls: Arc<AtomicUsize>,
        pub fail: bool,
    }

    impl MockEmbedder {
        pub fn new(dimension: usize) -> Self {
            Self {
                dimension,
                calls: Arc::new(AtomicUsize::new(0)),
                fail: false,
            }
        }

        pub fn failing(dimension: usize) -> Self {
            Self {
                dimension,
                calls: Arc::new(AtomicUsize::new(0)),
                fail: true,
            }
        }

        fn hash_vector(&self, text: &str) -> Vector {
            let mut v = vec![0.0f32; self.dimension];
            for (i, byte) in text.bytes().enumerate() {
                v[i % self.dimension] += (byte as f32 + 1.0) * ((i % 7) as f32 + 1.0);
            }
            if v.iter().all(|x| *x == 0.0) {
                v[0] = 1.0;
            }
            normalize(&mut v);
            v
        }
    }

    #[async_trait]
    impl Embedder for MockEmbedder {
        async fn embed(&self, text: &str) -> Result<Vector, CoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CoreError::EmbedderUnavailable("mock failure".to_string()));
            }
            Ok(self.hash_vector(text))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vector>, CoreError> {
            let mut out = Vec::with_capacity(texts.len());
            for t in texts {
                out.push(self.embed(t).await?);
            }
            Ok(out)
        }

        fn dimension(&self) -> usize {
            self.dimension
        }
    }
}

#[cfg(any(test, feature = "test-util"))]
pub use mock::MockEmbedder;
