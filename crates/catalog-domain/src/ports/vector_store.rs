//! Vector store port (§4.3).

use async_trait::async_trait;

use crate::entities::VectorMetadata;
use crate::error::Result;

/// A filter predicate over `(id, metadata)` pairs, evaluated during
/// [`VectorStore::search`]. Any panic/error inside a filter excludes the
/// candidate entry rather than propagating.
pub type VectorFilter<'a> = &'a (dyn Fn(&str, &VectorMetadata) -> bool + Send + Sync);

/// One ranked hit returned by [`VectorStore::search`].
#[derive(Debug, Clone)]
pub struct VectorHit {
    /// Project id of the matching entry.
    pub id: String,
    /// Cosine similarity score in `[-1, 1]`.
    pub score: f32,
    /// The entry's stored metadata.
    pub metadata: VectorMetadata,
}

/// Concurrency-safe similarity index over project embedding vectors.
/// Implemented by the in-process, snapshot-persisted store in
/// `catalog-infrastructure`.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or overwrite the entry for `id`. The vector is L2-normalized
    /// before storage; a zero vector is stored but excluded from search.
    async fn add(&self, id: &str, vector: Vec<f32>, metadata: VectorMetadata) -> Result<()>;

    /// Remove the entry for `id`. Returns whether it previously existed.
    async fn remove(&self, id: &str) -> Result<bool>;

    /// Fetch the raw vector and metadata for `id`, if present.
    async fn get(&self, id: &str) -> Result<Option<(Vec<f32>, VectorMetadata)>>;

    /// Rank stored entries against `query` by cosine similarity, keeping
    /// only entries that pass `filter` (when given) and meet `min_score`.
    async fn search(
        &self,
        query: &[f32],
        limit: usize,
        filter: Option<VectorFilter<'_>>,
        min_score: f32,
    ) -> Result<Vec<VectorHit>>;

    /// Persist a snapshot if the store is dirty, or unconditionally when
    /// `force` is set.
    async fn save(&self, force: bool) -> Result<()>;
}
