//! In-memory vector index with optional JSON snapshots.
//!
//! Every collection lives behind its own `tokio::sync::RwLock`: searches run
//! concurrently, writes to one collection are serialized, and writes to
//! different collections never wait on each other.
//!
//! With a data directory, each collection is loaded lazily from
//! `<data_dir>/<collection>.json` on first use and rewritten after every
//! write (temp file + rename, under the collection's write lock). A batch
//! upsert is written once. A write whose snapshot cannot be saved is rolled
//! back.
//!
//! A collection that failed to load is retried on its next access, so a
//! repaired snapshot or data directory needs no restart.

use async_trait::async_trait;
use rag_application::ports::vector_index::{IndexError, ScoredDocument, VectorIndex};
use rag_domain::{Document, Metadata};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const SNAPSHOT_EXT: &str = "json";

/// On-disk form of one collection
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    collection: String,
    dimension: Option<usize>,
    documents: Vec<Document>,
}

#[derive(Debug, Default)]
struct Collection {
    /// Established by configuration or by the first stored document
    dimension: Option<usize>,
    /// Insertion order; a replaced document keeps its slot
    documents: Vec<Document>,
    positions: HashMap<String, usize>,
}

impl Collection {
    fn with_dimension(dimension: Option<usize>) -> Self {
        Self {
            dimension,
            ..Self::default()
        }
    }

    fn from_snapshot(snapshot: Snapshot) -> Self {
        let positions = snapshot
            .documents
            .iter()
            .enumerate()
            .map(|(i, d)| (d.id.clone(), i))
            .collect();
        Self {
            dimension: snapshot.dimension,
            documents: snapshot.documents,
            positions,
        }
    }

    fn snapshot(&self, name: &str) -> Result<Vec<u8>, serde_json::Error> {
        #[derive(Serialize)]
        struct SnapshotRef<'a> {
            collection: &'a str,
            dimension: Option<usize>,
            documents: &'a [Document],
        }
        serde_json::to_vec(&SnapshotRef {
            collection: name,
            dimension: self.dimension,
            documents: &self.documents,
        })
    }

    /// Insert or replace; returns the replaced document, if any.
    fn put(&mut self, document: Document) -> Option<Document> {
        match self.positions.get(&document.id) {
            Some(&slot) => Some(std::mem::replace(&mut self.documents[slot], document)),
            None => {
                self.positions.insert(document.id.clone(), self.documents.len());
                self.documents.push(document);
                None
            }
        }
    }

    fn undo_put(&mut self, id: &str, previous: Option<Document>) {
        match previous {
            Some(previous) => {
                if let Some(&slot) = self.positions.get(id) {
                    self.documents[slot] = previous;
                }
            }
            None => {
                self.positions.remove(id);
                self.documents.pop();
            }
        }
    }
}

#[derive(Debug)]
enum CollectionState {
    Ready(Collection),
    Unavailable(String),
}

type Slot = Arc<RwLock<CollectionState>>;

/// File-backed [`VectorIndex`]
pub struct FileVectorIndex {
    data_dir: Option<PathBuf>,
    /// Configured dimensions by collection
    dimensions: BTreeMap<String, usize>,
    collections: RwLock<HashMap<String, Slot>>,
}

impl FileVectorIndex {
    /// Purely in-memory index
    pub fn in_memory() -> Self {
        Self {
            data_dir: None,
            dimensions: BTreeMap::new(),
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Index persisted under `data_dir`, created if missing.
    ///
    /// A directory that cannot be created leaves the index usable, but
    /// every collection reports `CollectionUnavailable` until it can be.
    pub fn open(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        if let Err(e) = std::fs::create_dir_all(&data_dir) {
            warn!(path = %data_dir.display(), error = %e, "Cannot create index directory");
        }

        Self {
            data_dir: Some(data_dir),
            ..Self::in_memory()
        }
    }

    /// Fix the embedding dimension of collections by name.
    pub fn with_dimensions(mut self, dimensions: BTreeMap<String, usize>) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    fn snapshot_path(&self, collection: &str) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.{}", collection, SNAPSHOT_EXT)))
    }

    async fn slot(&self, collection: &str) -> Result<Slot, IndexError> {
        if !is_valid_name(collection) {
            return Err(IndexError::unavailable(collection, "invalid collection name"));
        }

        let existing = self.collections.read().await.get(collection).cloned();
        let Some(slot) = existing else {
            let state = self.load(collection).await;
            let mut collections = self.collections.write().await;
            return Ok(collections
                .entry(collection.to_string())
                .or_insert_with(|| Arc::new(RwLock::new(state)))
                .clone());
        };

        let unavailable = matches!(&*slot.read().await, CollectionState::Unavailable(_));
        if unavailable {
            self.reload(collection, &slot).await;
        }
        Ok(slot)
    }

    /// Retry loading an unavailable collection under its write lock.
    async fn reload(&self, collection: &str, slot: &Slot) {
        let mut state = slot.write().await;
        // Another task may have reloaded it while we waited
        if matches!(&*state, CollectionState::Ready(_)) {
            return;
        }
        *state = self.load(collection).await;
        if matches!(&*state, CollectionState::Ready(_)) {
            info!(collection, "Collection available again");
        }
    }

    async fn load(&self, collection: &str) -> CollectionState {
        if let Some(dir) = &self.data_dir
            && let Err(e) = tokio::fs::create_dir_all(dir).await
        {
            warn!(path = %dir.display(), error = %e, "Cannot create index directory");
            return CollectionState::Unavailable(format!("cannot create {}: {}", dir.display(), e));
        }

        let configured = self.dimensions.get(collection).copied();
        let Some(path) = self.snapshot_path(collection) else {
            return CollectionState::Ready(Collection::with_dimension(configured));
        };

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return CollectionState::Ready(Collection::with_dimension(configured));
            }
            Err(e) => return unavailable(&path, e),
        };

        let snapshot: Snapshot = match serde_json::from_slice(&bytes) {
            Ok(snapshot) => snapshot,
            Err(e) => return unavailable(&path, e),
        };

        if let (Some(expected), Some(stored)) = (configured, snapshot.dimension)
            && expected != stored
        {
            return unavailable(
                &path,
                format!("snapshot dimension {} disagrees with configured {}", stored, expected),
            );
        }

        debug!(
            collection,
            documents = snapshot.documents.len(),
            "Loaded collection snapshot"
        );
        let mut loaded = Collection::from_snapshot(snapshot);
        loaded.dimension = loaded.dimension.or(configured);
        CollectionState::Ready(loaded)
    }

    async fn persist(&self, name: &str, collection: &Collection) -> Result<(), IndexError> {
        let Some(path) = self.snapshot_path(name) else {
            return Ok(());
        };

        let bytes = collection
            .snapshot(name)
            .map_err(|e| IndexError::unavailable(name, e))?;

        let tmp = path.with_extension(format!("{}.tmp", SNAPSHOT_EXT));
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| IndexError::unavailable(name, format!("cannot write snapshot: {}", e)))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| IndexError::unavailable(name, format!("cannot replace snapshot: {}", e)))
    }

    async fn snapshot_names(&self) -> Vec<String> {
        let Some(dir) = &self.data_dir else {
            return Vec::new();
        };
        let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
            return Vec::new();
        };

        let mut names = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SNAPSHOT_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && is_valid_name(stem)
            {
                names.push(stem.to_string());
            }
        }
        names
    }
}

fn ready<'a>(state: &'a CollectionState, name: &str) -> Result<&'a Collection, IndexError> {
    match state {
        CollectionState::Ready(c) => Ok(c),
        CollectionState::Unavailable(reason) => Err(IndexError::unavailable(name, reason)),
    }
}

fn ready_mut<'a>(
    state: &'a mut CollectionState,
    name: &str,
) -> Result<&'a mut Collection, IndexError> {
    match state {
        CollectionState::Ready(c) => Ok(c),
        CollectionState::Unavailable(reason) => Err(IndexError::unavailable(name, reason)),
    }
}

fn unavailable(path: &Path, reason: impl std::fmt::Display) -> CollectionState {
    warn!(path = %path.display(), error = %reason, "Collection snapshot unreadable");
    CollectionState::Unavailable(format!("{}: {}", path.display(), reason))
}

/// Collection names double as file names.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !name.starts_with('.')
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for FileVectorIndex {
    async fn upsert(&self, collection: &str, document: Document) -> Result<(), IndexError> {
        self.upsert_batch(collection, vec![document]).await
    }

    /// All-or-nothing: a rejected document or a failed snapshot leaves the
    /// collection as it was.
    async fn upsert_batch(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<(), IndexError> {
        if let Some(stray) = documents.iter().find(|d| d.collection != collection) {
            return Err(IndexError::WrongCollection {
                expected: collection.to_string(),
                actual: stray.collection.clone(),
            });
        }
        if documents.is_empty() {
            return Ok(());
        }

        let slot = self.slot(collection).await?;
        let mut state = slot.write().await;
        let current = ready_mut(&mut *state, collection)?;

        let previous_dimension = current.dimension;
        let mut dimension = current.dimension;
        for document in &documents {
            let actual = document.dimension();
            match dimension {
                Some(expected) if expected != actual => {
                    return Err(IndexError::DimensionMismatch {
                        collection: collection.to_string(),
                        expected,
                        actual,
                    });
                }
                _ => dimension = Some(actual),
            }
        }

        let stored = documents.len();
        current.dimension = dimension;
        let undo: Vec<(String, Option<Document>)> = documents
            .into_iter()
            .map(|document| {
                let id = document.id.clone();
                (id, current.put(document))
            })
            .collect();

        if let Err(e) = self.persist(collection, current).await {
            for (id, previous) in undo.into_iter().rev() {
                current.undo_put(&id, previous);
            }
            current.dimension = previous_dimension;
            return Err(e);
        }

        debug!(collection, documents = stored, "Documents upserted");
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredDocument>, IndexError> {
        let slot = self.slot(collection).await?;
        let state = slot.read().await;
        let current = ready(&*state, collection)?;

        if current.documents.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        if let Some(expected) = current.dimension
            && expected != query_vector.len()
        {
            return Err(IndexError::DimensionMismatch {
                collection: collection.to_string(),
                expected,
                actual: query_vector.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = current
            .documents
            .iter()
            .enumerate()
            .map(|(i, d)| (i, cosine(query_vector, &d.embedding)))
            .collect();
        // Stable: equal scores keep insertion order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(i, score)| ScoredDocument {
                document: current.documents[i].clone(),
                score,
            })
            .collect())
    }

    async fn refresh_metadata(
        &self,
        collection: &str,
        id: &str,
        metadata: Metadata,
    ) -> Result<(), IndexError> {
        let slot = self.slot(collection).await?;
        let mut state = slot.write().await;
        let current = ready_mut(&mut *state, collection)?;

        let Some(&position) = current.positions.get(id) else {
            return Err(IndexError::DocumentNotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        };

        let previous = std::mem::replace(&mut current.documents[position].metadata, metadata);
        if let Err(e) = self.persist(collection, current).await {
            current.documents[position].metadata = previous;
            return Err(e);
        }
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<usize, IndexError> {
        let slot = self.slot(collection).await?;
        let state = slot.read().await;
        Ok(ready(&*state, collection)?.documents.len())
    }

    async fn collections(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = self.snapshot_names().await.into_iter().collect();

        for (name, slot) in self.collections.read().await.iter() {
            let listed = match &*slot.read().await {
                CollectionState::Ready(c) => !c.documents.is_empty(),
                CollectionState::Unavailable(_) => true,
            };
            if listed {
                names.insert(name.clone());
            }
        }

        names.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn doc(id: &str, collection: &str, embedding: Vec<f32>) -> Document {
        Document::new(id, collection, format!("text of {id}"), embedding)
    }

    #[tokio::test]
    async fn test_search_orders_by_cosine() {
        let index = FileVectorIndex::in_memory();
        index.upsert("team", doc("far", "team", vec![0.0, 1.0])).await.unwrap();
        index.upsert("team", doc("near", "team", vec![1.0, 0.1])).await.unwrap();
        index.upsert("team", doc("mid", "team", vec![1.0, 1.0])).await.unwrap();

        let hits = index.search("team", &[1.0, 0.0], 2).await.unwrap();
        let ids: Vec<_> = hits.iter().map(|h| h.document.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid"]);
        assert!(hits[0].score > hits[1].score);
        assert!(hits[0].score <= 1.0);
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order_and_replace_keeps_slot() {
        let index = FileVectorIndex::in_memory();
        for id in ["a", "b", "c"] {
            index.upsert("policy", doc(id, "policy", vec![1.0, 0.0])).await.unwrap();
        }
        // Replacing "a" must not move it behind "b" and "c"
        let replaced = doc("a", "policy", vec![2.0, 0.0]).with_metadata("title", "Travel policy v2");
        index.upsert("policy", replaced).await.unwrap();

        let hits = index.search("policy", &[1.0, 0.0], 10).await.unwrap();
        let ids: Vec<_> = hits.iter().map(|h| h.document.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(hits[0].document.title(), "Travel policy v2");
        assert_eq!(index.count("policy").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_empty_collection_is_not_an_error() {
        let index = FileVectorIndex::in_memory();
        assert!(index.search("marketing", &[1.0, 0.0], 5).await.unwrap().is_empty());
        assert_eq!(index.count("marketing").await.unwrap(), 0);
        assert!(index.collections().await.is_empty());
    }

    #[tokio::test]
    async fn test_dimension_established_by_first_document() {
        let index = FileVectorIndex::in_memory();
        index.upsert("patent", doc("p1", "patent", vec![1.0, 0.0, 0.0])).await.unwrap();

        let err = index
            .upsert("patent", doc("p2", "patent", vec![1.0, 0.0]))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            IndexError::DimensionMismatch {
                collection: "patent".into(),
                expected: 3,
                actual: 2
            }
        );
        assert_eq!(index.count("patent").await.unwrap(), 1);

        let err = index.search("patent", &[1.0], 5).await.unwrap_err();
        assert!(matches!(err, IndexError::DimensionMismatch { .. }));
    }

    #[tokio::test]
    async fn test_configured_dimension_enforced() {
        let mut dims = BTreeMap::new();
        dims.insert("competitive".to_string(), 4);
        let index = FileVectorIndex::in_memory().with_dimensions(dims);

        let err = index
            .upsert("competitive", doc("c1", "competitive", vec![1.0, 0.0]))
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::DimensionMismatch { expected: 4, actual: 2, .. }));
    }

    #[tokio::test]
    async fn test_wrong_collection_rejected() {
        let index = FileVectorIndex::in_memory();
        let err = index
            .upsert("team", doc("x", "marketing", vec![1.0]))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            IndexError::WrongCollection {
                expected: "team".into(),
                actual: "marketing".into()
            }
        );
    }

    #[tokio::test]
    async fn test_refresh_metadata() {
        let index = FileVectorIndex::in_memory();
        index.upsert("team", doc("t1", "team", vec![1.0])).await.unwrap();

        let mut metadata = Metadata::new();
        metadata.insert("title".into(), "Onboarding checklist".into());
        index.refresh_metadata("team", "t1", metadata).await.unwrap();

        let hits = index.search("team", &[1.0], 1).await.unwrap();
        assert_eq!(hits[0].document.title(), "Onboarding checklist");
        assert_eq!(hits[0].document.embedding, vec![1.0]);

        let err = index
            .refresh_metadata("team", "missing", Metadata::new())
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::DocumentNotFound { .. }));
    }

    #[tokio::test]
    async fn test_snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let index = FileVectorIndex::open(dir.path());
            index.upsert("marketing", doc("m1", "marketing", vec![1.0, 0.0])).await.unwrap();
            index.upsert("marketing", doc("m2", "marketing", vec![0.0, 1.0])).await.unwrap();
            index.upsert("team", doc("t1", "team", vec![1.0, 1.0])).await.unwrap();
        }
        assert!(dir.path().join("marketing.json").exists());
        assert!(!dir.path().join("marketing.json.tmp").exists());

        let reopened = FileVectorIndex::open(dir.path());
        assert_eq!(reopened.collections().await, vec!["marketing", "team"]);
        assert_eq!(reopened.count("marketing").await.unwrap(), 2);

        let hits = reopened.search("marketing", &[0.0, 1.0], 1).await.unwrap();
        assert_eq!(hits[0].document.id, "m2");

        // Dimension is restored from the snapshot
        let err = reopened
            .upsert("marketing", doc("m3", "marketing", vec![1.0]))
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::DimensionMismatch { .. }));
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_makes_collection_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("patent.json"), "{not json").unwrap();

        let index = FileVectorIndex::open(dir.path());
        let err = index.search("patent", &[1.0], 5).await.unwrap_err();
        assert!(matches!(err, IndexError::CollectionUnavailable { .. }));
        assert!(index.count("patent").await.is_err());

        // Other collections are unaffected
        index.upsert("team", doc("t1", "team", vec![1.0])).await.unwrap();
        assert_eq!(index.collections().await, vec!["patent", "team"]);
    }

    #[tokio::test]
    async fn test_repaired_snapshot_is_reloaded_without_restart() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("patent.json");
        std::fs::write(&snapshot, "{not json").unwrap();

        let index = FileVectorIndex::open(dir.path());
        let err = index.search("patent", &[1.0], 5).await.unwrap_err();
        assert!(matches!(err, IndexError::CollectionUnavailable { .. }));

        std::fs::remove_file(&snapshot).unwrap();

        assert!(index.search("patent", &[1.0], 5).await.unwrap().is_empty());
        index.upsert("patent", doc("p1", "patent", vec![1.0])).await.unwrap();
        assert_eq!(index.count("patent").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_uncreatable_data_dir_makes_collections_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let index = FileVectorIndex::open(blocker.join("index"));
        let err = index
            .upsert("team", doc("t1", "team", vec![1.0]))
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::CollectionUnavailable { .. }));

        // Once the path is clear the directory is created on next access
        std::fs::remove_file(&blocker).unwrap();
        index.upsert("team", doc("t1", "team", vec![1.0])).await.unwrap();
        assert!(blocker.join("index").join("team.json").exists());
    }

    #[tokio::test]
    async fn test_upsert_batch_is_all_or_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let index = FileVectorIndex::open(dir.path());
        index.upsert("marketing", doc("m0", "marketing", vec![1.0, 0.0])).await.unwrap();

        let batch = vec![
            doc("m1", "marketing", vec![0.0, 1.0]),
            doc("m0", "marketing", vec![0.5, 0.5]),
            doc("m2", "marketing", vec![1.0, 0.0, 0.0]),
        ];
        let err = index.upsert_batch("marketing", batch).await.unwrap_err();
        assert!(matches!(err, IndexError::DimensionMismatch { expected: 2, actual: 3, .. }));
        assert_eq!(index.count("marketing").await.unwrap(), 1);

        let batch = vec![
            doc("m1", "marketing", vec![0.0, 1.0]),
            doc("m0", "marketing", vec![0.5, 0.5]),
            doc("m1", "marketing", vec![0.1, 1.0]),
        ];
        index.upsert_batch("marketing", batch).await.unwrap();

        let reopened = FileVectorIndex::open(dir.path());
        let hits = reopened.search("marketing", &[0.0, 1.0], 5).await.unwrap();
        let ids: Vec<_> = hits.iter().map(|h| h.document.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m0"]);
        assert_eq!(hits[0].document.embedding, vec![0.1, 1.0]);
    }

    #[tokio::test]
    async fn test_upsert_batch_rejects_stray_collection() {
        let index = FileVectorIndex::in_memory();
        let batch = vec![doc("t1", "team", vec![1.0]), doc("x", "marketing", vec![1.0])];

        let err = index.upsert_batch("team", batch).await.unwrap_err();
        assert!(matches!(err, IndexError::WrongCollection { .. }));
        assert_eq!(index.count("team").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_snapshot_rolls_back_batch() {
        let dir = tempfile::tempdir().unwrap();
        let index = FileVectorIndex::open(dir.path());
        index.upsert("team", doc("t1", "team", vec![1.0])).await.unwrap();

        // A directory where the temp file should go makes the write fail
        std::fs::create_dir(dir.path().join("team.json.tmp")).unwrap();
        let batch = vec![doc("t1", "team", vec![2.0]), doc("t2", "team", vec![3.0])];
        let err = index.upsert_batch("team", batch).await.unwrap_err();
        assert!(matches!(err, IndexError::CollectionUnavailable { .. }));

        let hits = index.search("team", &[1.0], 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.embedding, vec![1.0]);
    }

    #[tokio::test]
    async fn test_invalid_collection_name() {
        let index = FileVectorIndex::in_memory();
        let err = index.search("../etc", &[1.0], 1).await.unwrap_err();
        assert!(matches!(err, IndexError::CollectionUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_upserts_same_collection() {
        let dir = tempfile::tempdir().unwrap();
        let index = Arc::new(FileVectorIndex::open(dir.path()));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let index = index.clone();
                tokio::spawn(async move {
                    index
                        .upsert("chat", doc(&format!("d{i}"), "chat", vec![i as f32, 1.0]))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(index.count("chat").await.unwrap(), 16);
        let reopened = FileVectorIndex::open(dir.path());
        assert_eq!(reopened.count("chat").await.unwrap(), 16);
    }

    /// `web_search` provider that never answers in time
    struct StalledSearch;

    #[async_trait]
    impl rag_domain::tool::provider::ToolProvider for StalledSearch {
        fn id(&self) -> &str {
            "stalled"
        }

        fn tools(&self) -> Vec<rag_domain::ToolDefinition> {
            vec![crate::tools::web_search_definition()]
        }

        async fn execute(
            &self,
            _call: &rag_domain::ToolCall,
        ) -> Result<serde_json::Value, rag_domain::tool::provider::ProviderError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(serde_json::json!([]))
        }
    }

    #[tokio::test]
    async fn test_index_usable_while_web_search_is_outstanding() {
        use crate::embedding::HashingEmbedder;
        use crate::tools::ToolCallClient;
        use rag_application::{RetrievalMode, RetrievalParams, Retriever};
        use rag_domain::tool::WEB_SEARCH;
        use rag_domain::{CollectionPolicy, Query};
        use tokio_util::sync::CancellationToken;

        let dir = tempfile::tempdir().unwrap();
        let index = Arc::new(FileVectorIndex::open(dir.path()));
        let embedder = Arc::new(HashingEmbedder::new(8));

        let mut tools = ToolCallClient::new()
            .register(StalledSearch)
            .with_timeout(WEB_SEARCH, Duration::from_secs(2));
        tools.discover().await;

        let retriever = Retriever::new(
            embedder,
            index.clone(),
            Arc::new(tools),
            RetrievalParams::default(),
        );
        // Empty collection: the retrieval escalates and stalls on the tool
        let query = Query::new("market share", "marketing", &CollectionPolicy::default()).unwrap();
        let retrieval = tokio::spawn(async move {
            retriever
                .retrieve(&query, RetrievalMode::Hybrid, &CancellationToken::new())
                .await
        });
        tokio::time::sleep(Duration::from_millis(100)).await;

        let started = Instant::now();
        index.upsert("marketing", doc("m1", "marketing", vec![1.0; 8])).await.unwrap();
        let hits = index.search("marketing", &[1.0; 8], 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(started.elapsed() < Duration::from_millis(500));
        assert!(!retrieval.is_finished());

        let outcome = retrieval.await.unwrap().unwrap();
        assert!(outcome.escalated);
        assert!(outcome.degraded);
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine(&[1.0, 1.0], &[2.0, 2.0]) - 1.0).abs() < 1e-6);
    }
}
