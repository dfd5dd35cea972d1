//! Catalog persistence ports (§6, §4.12).
//!
//! The relational store is exposed as three scoped repositories rather than
//! the generic `Session` the spec describes — the natural shape for a typed
//! Rust port. Each repository call is its own atomic unit against the
//! underlying store, so no separate commit/rollback boundary is needed
//! around groups of calls; job handlers call repositories directly.

use async_trait::async_trait;

use crate::entities::{Job, JobRun, Project};
use crate::error::Result;

/// One full-text search hit against `catalog_projects_fts` (§6).
#[derive(Debug, Clone)]
pub struct FtsHit {
    /// Matching project id.
    pub project_id: String,
    /// Relevance rank assigned by the full-text engine (lower is better).
    pub rank: f64,
}

/// Persistence for [`Project`] rows.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Insert a new project. Fails with [`crate::error::Error::Constraint`]
    /// on `(org_id, name)` or `(org_id, path)` collision.
    async fn create(&self, project: &Project) -> Result<()>;
    /// Fetch a project by id, scoped to `org_id`.
    async fn get_by_id(&self, org_id: &str, id: &str) -> Result<Option<Project>>;
    /// Fetch a project by its unique `(org_id, name)` pair.
    async fn get_by_name(&self, org_id: &str, name: &str) -> Result<Option<Project>>;
    /// Fetch a project by its unique `(org_id, path)` pair.
    async fn get_by_path(&self, org_id: &str, path: &str) -> Result<Option<Project>>;
    /// List every project owned by `org_id`.
    async fn list(&self, org_id: &str) -> Result<Vec<Project>>;
    /// Overwrite an existing project record.
    async fn update(&self, project: &Project) -> Result<()>;
    /// Delete a project, scoped to `org_id`.
    async fn delete(&self, org_id: &str, id: &str) -> Result<()>;
    /// Run a full-text search over `(name, title, description, path)`,
    /// scoped to `org_id`.
    async fn fts_query(&self, org_id: &str, query: &str, limit: usize) -> Result<Vec<FtsHit>>;
}

/// Persistence for [`Job`] rows.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Insert a new job.
    async fn create(&self, job: &Job) -> Result<()>;
    /// Fetch a job by id, scoped to `org_id`.
    async fn get_by_id(&self, org_id: &str, id: &str) -> Result<Option<Job>>;
    /// Claim up to `limit` pending jobs whose `run_after` has elapsed,
    /// atomically transitioning them to `running`. Returns the claimed
    /// jobs with `attempts` already incremented.
    async fn claim_pending(&self, limit: usize) -> Result<Vec<Job>>;
    /// List every job still `status = running` whose `started_at` is
    /// before `threshold` (Unix epoch), across all organizations. Used by
    /// the scheduler's startup reaper for jobs orphaned by an unclean
    /// shutdown.
    async fn list_stuck_running(&self, threshold: i64) -> Result<Vec<Job>>;
    /// Overwrite an existing job record.
    async fn update(&self, job: &Job) -> Result<()>;
    /// Delete a job, scoped to `org_id`.
    async fn delete(&self, org_id: &str, id: &str) -> Result<()>;
}

/// Persistence for [`JobRun`] rows.
#[async_trait]
pub trait JobRunRepository: Send + Sync {
    /// Append a new job run record.
    async fn create(&self, run: &JobRun) -> Result<()>;
    /// Overwrite an existing job run record, used to finalize it.
    async fn update(&self, run: &JobRun) -> Result<()>;
    /// List every run recorded for `job_id`, oldest first.
    async fn list_for_job(&self, job_id: &str) -> Result<Vec<JobRun>>;
}

/// Entry point for acquiring scoped repositories against the relational
/// catalog store.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// The project repository, scoped to the current connection pool.
    fn projects(&self) -> &dyn ProjectRepository;
    /// The job repository, scoped to the current connection pool.
    fn jobs(&self) -> &dyn JobRepository;
    /// The job-run repository, scoped to the current connection pool.
    fn job_runs(&self) -> &dyn JobRunRepository;
}
