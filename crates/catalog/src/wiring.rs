//! Dependency-injection root: builds the concrete adapters behind every
//! domain port and assembles the application-layer services over them.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use catalog_application::{EmbeddingConfig, EmbeddingService};
use catalog_domain::ports::{Embedder, Llm};
use catalog_infrastructure::{AppConfig, FileVectorStore, SeaOrmCatalogStore};
use catalog_providers::{OllamaEmbedder, OllamaLlm};

/// Embedding dimension produced by the default `nomic-embed-text` model.
/// Overriding `providers.embedding_model` to a differently-sized model
/// requires also changing this; not yet exposed as config (§9).
const EMBEDDING_DIMENSION: usize = 768;

/// Fully wired application context shared by every CLI subcommand.
pub struct Context {
    /// The relational catalog store.
    pub store: Arc<SeaOrmCatalogStore>,
    /// The embedding orchestration service (embed + vector index).
    pub embedding: Arc<EmbeddingService>,
    /// The text-generation port.
    pub llm: Arc<dyn Llm>,
}

impl Context {
    /// Connect to the store, load the vector index snapshot, and build
    /// the embedding/LLM adapters configured in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store connection, its migrations, the
    /// vector snapshot load, or either provider's HTTP client fails to
    /// initialize.
    pub async fn build(config: &AppConfig) -> Result<Self> {
        let store = Arc::new(SeaOrmCatalogStore::connect(&config.database.url).await.context("connecting to catalog store")?);

        let vector_store = Arc::new(FileVectorStore::new(config.providers.vector_cache.clone()));
        vector_store.load().await.context("loading vector index snapshot")?;

        let embedder: Arc<dyn Embedder> = Arc::new(OllamaEmbedder::new(
            config.providers.ollama_base_url.clone(),
            config.providers.embedding_model.clone(),
        )?);
        let embedding_config = EmbeddingConfig {
            model: config.providers.embedding_model.clone(),
            dimension: EMBEDDING_DIMENSION,
            max_retries: 3,
            base_retry_delay: Duration::from_secs(1),
        };
        let embedding = Arc::new(EmbeddingService::new(embedder, vector_store, embedding_config));

        let llm: Arc<dyn Llm> =
            Arc::new(OllamaLlm::new(config.providers.ollama_base_url.clone(), config.providers.llm_model.clone())?);

        Ok(Self { store, embedding, llm })
    }
}
