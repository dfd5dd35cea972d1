//! Job Handlers (C6). Each handler consumes a [`Job`] and a scoped
//! [`CatalogStore`], mutates the catalog, and returns a result payload
//! with at least `status ∈ {completed, error, skipped}` plus counters.

mod embedding_index;
mod health_check;
mod llm_analysis;
mod quality_assessment;
mod refresh;
mod scan;

pub use embedding_index::EmbeddingIndexHandler;
pub use health_check::HealthCheckHandler;
pub use llm_analysis::LlmAnalysisHandler;
pub use quality_assessment::QualityAssessmentHandler;
pub use refresh::RefreshHandler;
pub use scan::ScanHandler;

use async_trait::async_trait;
use catalog_domain::entities::Job;
use catalog_domain::error::Result;
use catalog_domain::ports::CatalogStore;

/// Normalize a language/framework/tag list: lowercase, trim, drop empties.
/// Observed by every job handler that writes `languages`/`frameworks`
/// (§4.6).
#[must_use]
pub fn normalize(values: &[String]) -> Vec<String> {
    catalog_domain::entities::Project::normalize_tags(values.iter().cloned())
}

/// A unit of work dispatched by the job scheduler (C9) for one [`Job`].
#[async_trait]
pub trait JobHandler: Send + Sync {
    /// Run the handler against `job`, reading/writing through `store`.
    /// Returns the structured result payload persisted to `job.result`.
    async fn execute(&self, job: &Job, store: &dyn CatalogStore) -> Result<serde_json::Value>;
}
