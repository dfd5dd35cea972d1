//! Embedding provider port (§6).

use async_trait::async_trait;

use crate::error::Result;

/// Produces fixed-dimension embedding vectors for text. Implemented by
/// local (fastembed) and remote (HTTP) providers in `catalog-providers`.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single piece of text. The returned vector's dimension is
    /// fixed per configured model.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// List the model identifiers this embedder can serve.
    async fn list_models(&self) -> Result<Vec<String>>;
}
