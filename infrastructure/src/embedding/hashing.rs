//! Offline feature-hashing embedder.
//!
//! Each lower-cased word token is hashed with xxHash64; the low bits pick a
//! bucket and the top bit picks the sign added to it. The vector is then
//! L2-normalized, so cosine similarity reflects shared vocabulary.

use async_trait::async_trait;
use rag_application::ports::embedder::{Embedder, EmbeddingError, ensure_non_blank};
use std::hash::Hasher;
use twox_hash::XxHash64;

const SEED: u64 = 0x5eed_4a67;

/// Deterministic embedder that needs no model or network
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimension];

        for token in tokens(text) {
            let mut hasher = XxHash64::with_seed(SEED);
            hasher.write(token.as_bytes());
            let hash = hasher.finish();

            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 1 { -1.0 } else { 1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        ensure_non_blank(texts)?;
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}
