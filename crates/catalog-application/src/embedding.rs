//! Embedding Service use case (C4). Wraps an [`Embedder`] port and keeps
//! entries current in a [`VectorStore`] port.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use catalog_domain::entities::VectorMetadata;
use catalog_domain::error::{Error, Result};
use catalog_domain::ports::{Embedder, VectorFilter, VectorHit, VectorStore};

/// Character budget text is truncated to before embedding (§4.4).
const TEXT_CHAR_BUDGET: usize = 8000;
/// README character budget folded into a project's document text (§4.4).
const README_CHAR_BUDGET: usize = 2000;

/// Configuration for [`EmbeddingService`].
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Configured embedding model id, inspected for the `nomic` asymmetric
    /// prefix convention.
    pub model: String,
    /// Expected embedding dimension; a mismatched response is treated as
    /// a failure.
    pub dimension: usize,
    /// Maximum retry attempts on embed failure.
    pub max_retries: u32,
    /// Base retry delay; actual delay is `base * 2^attempt`.
    pub base_retry_delay: Duration,
}

/// Orchestrates text embedding and keeps the vector index in sync with
/// project metadata.
pub struct EmbeddingService {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    config: EmbeddingConfig,
    available: AtomicBool,
    probed: AtomicBool,
}

/// Filter applied by [`EmbeddingService::search_similar`].
#[derive(Debug, Clone, Default)]
pub struct SimilaritySearchFilter {
    /// Restrict results to this organization.
    pub org_id: Option<String>,
    /// Restrict results to projects whose languages intersect this set
    /// (case-insensitive).
    pub languages: Option<Vec<String>>,
    /// Restrict results to projects with this lifecycle.
    pub lifecycle: Option<String>,
}

impl EmbeddingService {
    /// Construct a new embedding service over the given ports.
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>, config: EmbeddingConfig) -> Self {
        Self { embedder, store, config, available: AtomicBool::new(false), probed: AtomicBool::new(false) }
    }

    /// Embed `text`, applying the asymmetric-model prefix convention and
    /// the character budget, retrying with exponential backoff.
    pub async fn embed(&self, text: &str, is_query: bool) -> Result<Vec<f32>> {
        let prepared = self.prepare_text(text, is_query);

        let mut attempt = 0;
        loop {
            match self.embedder.embed(&prepared).await {
                Ok(vector) if vector.len() == self.config.dimension => return Ok(vector),
                Ok(vector) => {
                    return Err(Error::transient(format!(
                        "embedding dimension mismatch: expected {}, got {}",
                        self.config.dimension,
                        vector.len()
                    )));
                }
                Err(error) if attempt + 1 < self.config.max_retries => {
                    tracing::warn!(attempt, %error, "embed attempt failed, retrying");
                    let delay = self.config.base_retry_delay * 2u32.pow(attempt);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    fn prepare_text(&self, text: &str, is_query: bool) -> String {
        let truncated: String = text.chars().take(TEXT_CHAR_BUDGET).collect();
        if self.config.model.to_lowercase().contains("nomic") {
            let prefix = if is_query { "search_query: " } else { "search_document: " };
            format!("{prefix}{truncated}")
        } else {
            truncated
        }
    }

    /// Embed a batch of texts concurrently, bounded by `concurrency`,
    /// preserving per-input success/failure.
    pub async fn embed_batch(
        &self,
        texts: &[String],
        is_query: bool,
        concurrency: usize,
    ) -> Vec<Result<Vec<f32>>> {
        let semaphore = Arc::new(tokio::sync::Semaphore::new(concurrency.max(1)));
        let futures = texts.iter().map(|text| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore.acquire().await.expect("semaphore not closed");
                self.embed(text, is_query).await
            }
        });
        futures::future::join_all(futures).await
    }

    /// Compose a project's canonical document text and index it (§4.4).
    #[allow(clippy::too_many_arguments)]
    pub async fn index_project(
        &self,
        project_id: &str,
        name: &str,
        description: Option<&str>,
        readme: Option<&str>,
        tags: &[String],
        languages: &[String],
        frameworks: &[String],
        org_id: &str,
        auto_save: bool,
    ) -> Result<()> {
        let document = compose_document_text(name, description, readme, tags, languages, frameworks);
        let vector = self.embed(&document, false).await?;

        let metadata = VectorMetadata {
            org_id: org_id.to_owned(),
            name: name.to_owned(),
            description: description.map(str::to_owned),
            tags: tags.to_vec(),
            languages: languages.iter().map(|l| l.to_lowercase()).collect(),
            frameworks: frameworks.iter().map(|f| f.to_lowercase()).collect(),
            lifecycle: None,
        };

        self.store.add(project_id, vector, metadata).await?;
        if auto_save {
            self.store.save(false).await?;
        }
        Ok(())
    }

    /// Embed `query` and search the store under the given filter (§4.4).
    pub async fn search_similar(
        &self,
        query: &str,
        limit: usize,
        filter: &SimilaritySearchFilter,
        min_score: f32,
    ) -> Result<Vec<VectorHit>> {
        let vector = self.embed(query, true).await?;
        let predicate = move |_id: &str, meta: &VectorMetadata| -> bool {
            if let Some(org_id) = &filter.org_id
                && &meta.org_id != org_id
            {
                return false;
            }
            if let Some(languages) = &filter.languages {
                let wanted: std::collections::HashSet<String> =
                    languages.iter().map(|l| l.to_lowercase()).collect();
                if !meta.languages.iter().any(|l| wanted.contains(l)) {
                    return false;
                }
            }
            if let Some(lifecycle) = &filter.lifecycle
                && !meta
                    .lifecycle
                    .as_ref()
                    .is_some_and(|l| l.eq_ignore_ascii_case(lifecycle))
            {
                return false;
            }
            true
        };
        let boxed: VectorFilter<'_> = &predicate;
        self.store.search(&vector, limit, Some(boxed), min_score).await
    }

    /// Find projects related to `project_id` by looking up its stored
    /// vector and searching with the same-org filter, excluding itself.
    pub async fn find_related(&self, project_id: &str, org_id: &str, limit: usize) -> Result<Vec<VectorHit>> {
        let Some((vector, _)) = self.store.get(project_id).await? else {
            return Ok(Vec::new());
        };
        let org_id = org_id.to_owned();
        let source_id = project_id.to_owned();
        let predicate = move |id: &str, meta: &VectorMetadata| -> bool {
            id != source_id && meta.org_id == org_id
        };
        let boxed: VectorFilter<'_> = &predicate;
        self.store.search(&vector, limit, Some(boxed), 0.0).await
    }

    /// Probe the embedder's model list and cache availability.
    pub async fn is_available(&self) -> bool {
        if self.probed.load(Ordering::Acquire) {
            return self.available.load(Ordering::Acquire);
        }
        let available = self.embedder.list_models().await.is_ok();
        self.available.store(available, Ordering::Release);
        self.probed.store(true, Ordering::Release);
        available
    }

    /// Forget the cached availability probe.
    pub fn reset_availability_cache(&self) {
        self.probed.store(false, Ordering::Release);
    }

    /// Force a vector store snapshot, used by job handlers once they've
    /// finished a batch of `index_project` calls made with `auto_save:
    /// false`.
    pub async fn persist_snapshot(&self) -> Result<()> {
        self.store.save(true).await
    }
}

fn compose_document_text(
    name: &str,
    description: Option<&str>,
    readme: Option<&str>,
    tags: &[String],
    languages: &[String],
    frameworks: &[String],
) -> String {
    let mut parts = vec![format!("Project: {name}")];
    if let Some(description) = description {
        parts.push(format!("Description: {description}"));
    }
    if let Some(readme) = readme {
        let collapsed: String = readme.chars().take(README_CHAR_BUDGET).collect::<String>().replace('\n', " ");
        parts.push(format!("Documentation: {collapsed}"));
    }
    if !tags.is_empty() {
        parts.push(format!("Tags: {}", tags.join(", ")));
    }
    if !languages.is_empty() {
        parts.push(format!("Languages: {}", languages.join(", ")));
    }
    if !frameworks.is_empty() {
        parts.push(format!("Frameworks: {}", frameworks.join(", ")));
    }
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    use async_trait::async_trait;

    use super::*;

    #[test]
    fn document_text_collapses_readme_newlines() {
        let text = compose_document_text(
            "demo",
            Some("desc"),
            Some("line one\nline two"),
            &["tag".to_owned()],
            &["rust".to_owned()],
            &[],
        );
        assert!(text.contains("Documentation: line one line two"));
    }

    struct AlwaysFailingEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for AlwaysFailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            Err(Error::transient("embedder unavailable"))
        }

        async fn list_models(&self) -> Result<Vec<String>> {
            Ok(vec![])
        }
    }

    struct UnusedVectorStore;

    #[async_trait]
    impl VectorStore for UnusedVectorStore {
        async fn add(&self, _id: &str, _vector: Vec<f32>, _metadata: VectorMetadata) -> Result<()> {
            unimplemented!("embed() never touches the vector store")
        }

        async fn remove(&self, _id: &str) -> Result<bool> {
            unimplemented!("embed() never touches the vector store")
        }

        async fn get(&self, _id: &str) -> Result<Option<(Vec<f32>, VectorMetadata)>> {
            unimplemented!("embed() never touches the vector store")
        }

        async fn search(
            &self,
            _query: &[f32],
            _limit: usize,
            _filter: Option<VectorFilter<'_>>,
            _min_score: f32,
        ) -> Result<Vec<VectorHit>> {
            unimplemented!("embed() never touches the vector store")
        }

        async fn save(&self, _force: bool) -> Result<()> {
            unimplemented!("embed() never touches the vector store")
        }
    }

    #[tokio::test]
    async fn embed_makes_exactly_max_retries_attempts_on_persistent_failure() {
        let embedder = Arc::new(AlwaysFailingEmbedder { calls: AtomicUsize::new(0) });
        let service = EmbeddingService::new(
            Arc::clone(&embedder) as Arc<dyn Embedder>,
            Arc::new(UnusedVectorStore),
            EmbeddingConfig {
                model: "nomic-embed-text".to_owned(),
                dimension: 4,
                max_retries: 3,
                base_retry_delay: Duration::from_millis(0),
            },
        );

        let result = service.embed("hello", false).await;
        assert!(result.is_err());
        assert_eq!(embedder.calls.load(AtomicOrdering::SeqCst), 3);
    }
}
