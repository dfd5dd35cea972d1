//! `embedding_index` job handler (§4.6). (Re)computes and upserts the
//! embedding vector for every project in an org.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use catalog_domain::entities::Job;
use catalog_domain::error::Result;
use catalog_domain::ports::CatalogStore;

use crate::embedding::EmbeddingService;

use super::JobHandler;

/// README bytes folded into the document text for each project indexed.
const README_BUDGET: usize = 2000;

/// Reindexes every project's embedding vector.
pub struct EmbeddingIndexHandler {
    embedding: Arc<EmbeddingService>,
}

impl EmbeddingIndexHandler {
    /// Construct a handler over the given embedding service.
    #[must_use]
    pub fn new(embedding: Arc<EmbeddingService>) -> Self {
        Self { embedding }
    }
}

#[async_trait]
impl JobHandler for EmbeddingIndexHandler {
    async fn execute(&self, job: &Job, store: &dyn CatalogStore) -> Result<serde_json::Value> {
        let projects = match &job.project_id {
            Some(id) => store.projects().get_by_id(&job.org_id, id).await?.into_iter().collect::<Vec<_>>(),
            None => store.projects().list(&job.org_id).await?,
        };

        let mut indexed = 0usize;
        let mut errors: Vec<String> = Vec::new();

        for project in &projects {
            let readme = read_readme(Path::new(&project.path));
            let result = self
                .embedding
                .index_project(
                    &project.id,
                    &project.name,
                    project.description.as_deref(),
                    readme.as_deref(),
                    &project.tags,
                    &project.languages,
                    &project.frameworks,
                    &job.org_id,
                    false,
                )
                .await;

            match result {
                Ok(()) => indexed += 1,
                Err(error) => errors.push(format!("{}: {error}", project.id)),
            }
        }

        self.embedding.persist_snapshot().await?;

        Ok(serde_json::json!({"status": "completed", "indexed": indexed, "errors": errors}))
    }
}

fn read_readme(path: &Path) -> Option<String> {
    for name in ["README.md", "README.rst", "README.txt", "README"] {
        if let Ok(text) = std::fs::read_to_string(path.join(name)) {
            return Some(text.chars().take(README_BUDGET).collect());
        }
    }
    None
}
