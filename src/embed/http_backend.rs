//! HTTP embedding backend
//!
//! Speaks the inference protocol used by hosted BGE deployments: POST
//! `{"inputs": [text]}` with bearer-token auth. The documented response
//! format is inconsistent across deployments, so parsing tolerates the
//! known shapes rather than pinning one.

use super::{truncate_to_word_boundary, Embedder};
use crate::config::EmbeddingConfig;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Clone, Serialize)]
struct EmbedRequest<'a> {
    inputs: [&'a str; 1],
}

/// Known response shapes: a bare list of vectors, a bare vector, or an
/// object with an `embeddings` key whose entries may wrap each vector.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum EmbedResponse {
    Vectors(Vec<Vec<f32>>),
    Single(Vec<f32>),
    Embeddings { embeddings: Vec<EmbeddingEntry> },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum EmbeddingEntry {
    Vector(Vec<f32>),
    Wrapped { embedding: Vec<f32> },
}

impl EmbedResponse {
    fn into_vector(self) -> Option<Vec<f32>> {
        match self {
            EmbedResponse::Vectors(mut vectors) => {
                if vectors.is_empty() {
                    None
                } else {
                    Some(vectors.swap_remove(0))
                }
            }
            EmbedResponse::Single(vector) => Some(vector),
            EmbedResponse::Embeddings { mut embeddings } => {
                if embeddings.is_empty() {
                    None
                } else {
                    match embeddings.swap_remove(0) {
                        EmbeddingEntry::Vector(v) => Some(v),
                        EmbeddingEntry::Wrapped { embedding } => Some(embedding),
                    }
                }
            }
        }
    }
}

/// HTTP embedding client
pub struct HttpEmbedder {
    client: Client,
    api_url: Url,
    api_key: Option<String>,
    dimension: usize,
    max_chars: usize,
}

impl HttpEmbedder {
    /// Build from config, reading the API key from the configured env var
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).ok();
        Self::with_api_key(config, api_key)
    }

    /// Build with an explicit API key (test seam)
    pub fn with_api_key(config: &EmbeddingConfig, api_key: Option<String>) -> Result<Self> {
        let api_url = Url::parse(&config.api_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url,
            api_key,
            dimension: config.dimension,
            max_chars: config.max_chars,
        })
    }

    async fn request_embedding(&self, text: &str, api_key: &str) -> Option<Vec<f32>> {
        let request = EmbedRequest { inputs: [text] };

        let response = match self
            .client
            .post(self.api_url.clone())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Embedding request failed: {}", e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Embedding API error {}: {}", status, body);
            return None;
        }

        match response.json::<EmbedResponse>().await {
            Ok(parsed) => parsed.into_vector(),
            Err(e) => {
                warn!("Unexpected embedding response format: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Option<Vec<f32>> {
        if text.trim().is_empty() {
            warn!("Empty text provided for embedding");
            return None;
        }

        let Some(api_key) = self.api_key.as_deref() else {
            warn!("Embedding API key not found");
            return None;
        };

        let truncated = truncate_to_word_boundary(text, self.max_chars);
        if truncated.len() < text.len() {
            warn!(
                "Text truncated to {} characters to fit token limit",
                truncated.chars().count()
            );
        }

        let vector = self.request_embedding(truncated, api_key).await?;

        if vector.len() != self.dimension {
            warn!(
                "Embedding dimension mismatch: expected {}, got {}",
                self.dimension,
                vector.len()
            );
            return None;
        }

        debug!("Embedded {} characters", truncated.chars().count());
        Some(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn api_key_present(&self) -> bool {
        self.api_key.is_some()
    }
}
