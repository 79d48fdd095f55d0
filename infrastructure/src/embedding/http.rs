//! OpenAI-compatible embeddings client.
//!
//! `POST {endpoint}/embeddings` with `{"model", "input": [..]}`; the response
//! `{"data": [{"index", "embedding"}]}` is re-ordered by `index` before it is
//! returned. Inputs are sent in chunks of `batch_size`.

use async_trait::async_trait;
use rag_application::ports::embedder::{Embedder, EmbeddingError, ensure_non_blank};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::config::FileEmbeddingConfig;

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

/// Embedder backed by a remote embeddings endpoint
pub struct HttpEmbedder {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
    dimension: usize,
    batch_size: usize,
}

impl HttpEmbedder {
    pub fn from_config(config: &FileEmbeddingConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            url: format!("{}/embeddings", config.endpoint.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: std::env::var(&config.api_key_env)
                .ok()
                .filter(|k| !k.trim().is_empty()),
            dimension: config.dimension,
            batch_size: config.batch_size.max(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn embed_chunk(&self, chunk: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut request = self
            .client
            .post(&self.url)
            .json(&json!({ "model": self.model, "input": chunk }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| EmbeddingError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Unavailable(format!(
                "{}: {}",
                status,
                rag_domain::core::string::truncate(body.trim(), 200)
            )));
        }

        let body: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        order_embeddings(body, chunk.len(), self.dimension)
    }
}

/// Re-order response items by `index` and check count and dimension.
fn order_embeddings(
    response: EmbeddingsResponse,
    expected: usize,
    dimension: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let mut items = response.data;
    if items.len() != expected {
        return Err(EmbeddingError::InvalidResponse(format!(
            "expected {} embeddings, got {}",
            expected,
            items.len()
        )));
    }
    items.sort_by_key(|item| item.index);

    let mut vectors = Vec::with_capacity(expected);
    for (position, item) in items.into_iter().enumerate() {
        if item.index != position {
            return Err(EmbeddingError::InvalidResponse(format!(
                "missing embedding for input {}",
                position
            )));
        }
        if item.embedding.len() != dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: dimension,
                actual: item.embedding.len(),
            });
        }
        vectors.push(item.embedding);
    }
    Ok(vectors)
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        ensure_non_blank(texts)?;

        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            debug!(model = %self.model, inputs = chunk.len(), "Requesting embeddings");
            vectors.extend(self.embed_chunk(chunk).await?);
        }
        Ok(vectors)
    }
}
