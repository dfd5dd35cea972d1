//! Embedding-index record stored by the vector store (§4.3).

use serde::{Deserialize, Serialize};

/// One project's embedding vector plus the metadata needed to filter and
/// render search results without a round trip to the relational store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorEntry {
    /// Identifier of the project this vector represents. Acts as the
    /// vector store's primary key; re-indexing a project overwrites its
    /// prior entry rather than appending a new one.
    pub id: String,
    /// L2-normalized embedding vector.
    pub vector: Vec<f32>,
    /// Metadata carried alongside the vector for filtering and display.
    pub metadata: VectorMetadata,
}

/// Metadata snapshot attached to a [`VectorEntry`], kept in sync with the
/// source project whenever it is re-indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorMetadata {
    /// Owning organization, used to enforce tenant isolation at query time.
    pub org_id: String,
    /// Project name at the time of indexing.
    pub name: String,
    /// Project description at the time of indexing.
    pub description: Option<String>,
    /// Project tags at the time of indexing.
    pub tags: Vec<String>,
    /// Project languages at the time of indexing.
    pub languages: Vec<String>,
    /// Project frameworks at the time of indexing.
    pub frameworks: Vec<String>,
    /// Project lifecycle at the time of indexing, if known.
    pub lifecycle: Option<String>,
}
