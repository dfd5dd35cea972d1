//! In-process similarity index over project embedding vectors (C3),
//! persisted as an atomically-written snapshot file. Grounded on
//! `original_source/catalog/llm/embeddings.py`'s `VectorStore` class.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use catalog_domain::entities::VectorMetadata;
use catalog_domain::error::{Error, Result};
use catalog_domain::ports::{VectorFilter, VectorHit, VectorStore};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Current snapshot format version.
const SNAPSHOT_VERSION: u32 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    vector: Vec<f32>,
    metadata: VectorMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    count: usize,
    vectors: HashMap<String, Vec<f32>>,
    metadata: HashMap<String, VectorMetadata>,
}

/// Legacy v1 snapshot shape: a flat `id -> vector` map with no metadata,
/// tolerated on load per §4.3's "v1/v2 tolerant loader" requirement.
#[derive(Debug, Deserialize)]
struct SnapshotV1 {
    vectors: HashMap<String, Vec<f32>>,
}

fn empty_metadata() -> VectorMetadata {
    VectorMetadata {
        org_id: String::new(),
        name: String::new(),
        description: None,
        tags: Vec::new(),
        languages: Vec::new(),
        frameworks: Vec::new(),
        lifecycle: None,
    }
}

/// Concurrency-safe, snapshot-persisted vector index. A single instance is
/// shared process-wide; `add`/`remove` hold the write lock for the
/// duration of the mutation so a concurrent `search` always observes a
/// consistent map (§5).
pub struct FileVectorStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, Entry>>,
    dirty: AtomicBool,
}

impl FileVectorStore {
    /// Open (or prepare to create) a vector store backed by the snapshot
    /// at `path`. Does not read the file yet; call [`Self::load`].
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path, entries: RwLock::new(HashMap::new()), dirty: AtomicBool::new(false) }
    }

    /// Load the snapshot from disk, if present. A missing file is not an
    /// error: the store simply starts empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`]/[`Error::Json`] if the file exists but can't
    /// be read or parsed in either the current or the legacy v1 shape.
    pub async fn load(&self) -> Result<()> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(error) => return Err(Error::Io(error)),
        };

        let loaded: HashMap<String, Entry> = match serde_json::from_slice::<Snapshot>(&bytes) {
            Ok(snapshot) => snapshot
                .vectors
                .into_iter()
                .map(|(id, vector)| {
                    let metadata = snapshot.metadata.get(&id).cloned().unwrap_or_else(empty_metadata);
                    (id, Entry { vector, metadata })
                })
                .collect(),
            Err(_) => {
                let legacy: SnapshotV1 = serde_json::from_slice(&bytes)?;
                legacy
                    .vectors
                    .into_iter()
                    .map(|(id, vector)| (id, Entry { vector, metadata: empty_metadata() }))
                    .collect()
            }
        };

        *self.entries.write().await = loaded;
        Ok(())
    }

    fn normalize(vector: &[f32]) -> Vec<f32> {
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm == 0.0 {
            vector.to_vec()
        } else {
            vector.iter().map(|x| x / norm).collect()
        }
    }

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }
}

#[async_trait]
impl VectorStore for FileVectorStore {
    async fn add(&self, id: &str, vector: Vec<f32>, metadata: VectorMetadata) -> Result<()> {
        let normalized = Self::normalize(&vector);
        self.entries.write().await.insert(id.to_owned(), Entry { vector: normalized, metadata });
        self.dirty.store(true, Ordering::Release);
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        let removed = self.entries.write().await.remove(id).is_some();
        if removed {
            self.dirty.store(true, Ordering::Release);
        }
        Ok(removed)
    }

    async fn get(&self, id: &str) -> Result<Option<(Vec<f32>, VectorMetadata)>> {
        Ok(self.entries.read().await.get(id).map(|entry| (entry.vector.clone(), entry.metadata.clone())))
    }

    async fn search(
        &self,
        query: &[f32],
        limit: usize,
        filter: Option<VectorFilter<'_>>,
        min_score: f32,
    ) -> Result<Vec<VectorHit>> {
        let query = Self::normalize(query);
        let entries = self.entries.read().await;

        let mut hits: Vec<VectorHit> = entries
            .iter()
            .filter(|(id, entry)| {
                !entry.vector.iter().all(|x| *x == 0.0)
                    && filter.is_none_or(|predicate| predicate(id, &entry.metadata))
            })
            .map(|(id, entry)| VectorHit {
                id: id.clone(),
                score: Self::cosine(&query, &entry.vector),
                metadata: entry.metadata.clone(),
            })
            .filter(|hit| hit.score >= min_score)
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn save(&self, force: bool) -> Result<()> {
        if !force && !self.dirty.load(Ordering::Acquire) {
            return Ok(());
        }

        let entries = self.entries.read().await;
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            count: entries.len(),
            vectors: entries.iter().map(|(id, e)| (id.clone(), e.vector.clone())).collect(),
            metadata: entries.iter().map(|(id, e)| (id.clone(), e.metadata.clone())).collect(),
        };
        let body = serde_json::to_vec_pretty(&snapshot)?;
        drop(entries);

        write_atomic(&self.path, &body).await?;
        self.dirty.store(false, Ordering::Release);
        Ok(())
    }
}

async fn write_atomic(path: &Path, body: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp_path = path.with_extension("tmp");
    tokio::fs::write(&tmp_path, body).await?;
    tokio::fs::rename(&tmp_path, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[tokio::test]
    async fn add_then_search_finds_nearest_neighbor() {
        let dir = tempdir().expect("tempdir");
        let store = FileVectorStore::new(dir.path().join("snapshot.json"));

        store.add("a", vec![1.0, 0.0], empty_metadata()).await.expect("add");
        store.add("b", vec![0.0, 1.0], empty_metadata()).await.expect("add");

        let hits = store.search(&[1.0, 0.0], 1, None, 0.0).await.expect("search");
        assert_eq!(hits[0].id, "a");
    }

    #[tokio::test]
    async fn save_then_load_round_trips_vectors() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("snapshot.json");

        let store = FileVectorStore::new(path.clone());
        store.add("a", vec![3.0, 4.0], empty_metadata()).await.expect("add");
        store.save(true).await.expect("save");

        let reloaded = FileVectorStore::new(path);
        reloaded.load().await.expect("load");
        let (vector, _) = reloaded.get("a").await.expect("get").expect("present");
        assert!((vector[0] - 0.6).abs() < 1e-6);
    }

    #[tokio::test]
    async fn zero_vectors_are_excluded_from_search() {
        let dir = tempdir().expect("tempdir");
        let store = FileVectorStore::new(dir.path().join("snapshot.json"));
        store.add("zero", vec![0.0, 0.0], empty_metadata()).await.expect("add");

        let hits = store.search(&[1.0, 0.0], 10, None, -1.0).await.expect("search");
        assert!(hits.is_empty());
    }
}
