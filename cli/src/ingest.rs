//! `hybrid-rag ingest`: load normalized JSONL records into one collection

use anyhow::{Context, Result, bail};
use rag_application::{Embedder, VectorIndex};
use rag_domain::{Document, Metadata};
use serde::Deserialize;
use tracing::{debug, info};

/// One line of an ingestion file
#[derive(Debug, Deserialize)]
pub struct IngestRecord {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Parse JSONL, skipping blank lines. Errors name the offending line.
pub fn parse_records(input: &str) -> Result<Vec<IngestRecord>> {
    let mut records = Vec::new();
    for (number, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: IngestRecord = serde_json::from_str(line)
            .with_context(|| format!("line {}: invalid record", number + 1))?;
        if record.id.trim().is_empty() {
            bail!("line {}: empty id", number + 1);
        }
        records.push(record);
    }
    Ok(records)
}

/// Embed `records` in batches of `batch_size` and upsert them into `collection`.
///
/// Each batch is stored with one `upsert_batch`. Stops at the first failure;
/// batches stored before it stay stored.
pub async fn ingest(
    embedder: &dyn Embedder,
    index: &dyn VectorIndex,
    collection: &str,
    records: Vec<IngestRecord>,
    batch_size: usize,
) -> Result<usize> {
    let mut stored = 0;

    for batch in records.chunks(batch_size.max(1)) {
        let texts: Vec<String> = batch.iter().map(|r| r.text.clone()).collect();
        let embeddings = embedder
            .embed_batch(&texts)
            .await
            .context("embedding failed")?;

        let documents: Vec<Document> = batch
            .iter()
            .zip(embeddings)
            .map(|(record, embedding)| {
                let mut document = Document::new(&record.id, collection, &record.text, embedding);
                document.metadata = record.metadata.clone();
                document
            })
            .collect();
        let count = documents.len();

        index
            .upsert_batch(collection, documents)
            .await
            .with_context(|| format!("failed to store batch starting at {}", batch[0].id))?;
        stored += count;
        debug!(collection, stored, "Batch stored");
    }

    info!(collection, stored, "Ingestion complete");
    Ok(stored)
}
