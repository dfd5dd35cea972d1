//! Job Scheduler / Worker (C9): a single supervisor task that polls the
//! job queue and a bounded pool of per-job tasks, each owning an
//! independent handler invocation with retry/backoff on failure.
//! Grounded on `original_source/catalog/runtime.py`'s worker loop and
//! `job_handlers.py`'s per-handler dispatch table.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use catalog_application::jobs::JobHandler;
use catalog_domain::entities::{Job, JobKind, JobRun, JobRunStatus, JobStatus};
use catalog_domain::error::Result;
use catalog_domain::ports::CatalogStore;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Maximum backoff between retry attempts, in seconds (§4.9).
const MAX_BACKOFF_SECONDS: i64 = 300;
/// Base backoff multiplier, in seconds (§4.9: `2^attempts * 5`).
const BACKOFF_BASE_SECONDS: i64 = 5;

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Dispatches a claimed job to the handler registered for its [`JobKind`].
pub struct HandlerRegistry {
    handlers: HashMap<JobKind, Arc<dyn JobHandler>>,
}

impl HandlerRegistry {
    /// Build a registry from explicit `(kind, handler)` pairs.
    #[must_use]
    pub fn new(handlers: Vec<(JobKind, Arc<dyn JobHandler>)>) -> Self {
        Self { handlers: handlers.into_iter().collect() }
    }

    fn get(&self, kind: JobKind) -> Option<Arc<dyn JobHandler>> {
        self.handlers.get(&kind).cloned()
    }
}

/// Supervisor-poll job scheduler (§4.9). A single long-running task polls
/// the store for claimable jobs and spawns up to `max_concurrent`
/// concurrent per-job tasks, each with its own handler invocation.
pub struct Scheduler {
    store: Arc<dyn CatalogStore>,
    registry: Arc<HandlerRegistry>,
    poll_interval: Duration,
    max_concurrent: usize,
    active: Arc<Mutex<HashSet<String>>>,
}

impl Scheduler {
    /// Construct a scheduler over `store`, dispatching to `registry`.
    #[must_use]
    pub fn new(
        store: Arc<dyn CatalogStore>,
        registry: HandlerRegistry,
        poll_interval: Duration,
        max_concurrent: usize,
    ) -> Self {
        Self {
            store,
            registry: Arc::new(registry),
            poll_interval,
            max_concurrent,
            active: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Run the supervisor loop until `shutdown` resolves. Does not mark
    /// in-flight jobs as failed on shutdown (§4.9): outstanding per-job
    /// tasks are left to finish or be cancelled at their next suspension
    /// point, and will be rediscovered as stuck `running` jobs by
    /// [`reap_stuck_jobs`] on a future startup.
    pub async fn run(&self, mut shutdown: tokio::sync::oneshot::Receiver<()>) {
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                () = tokio::time::sleep(self.poll_interval) => {
                    if let Err(error) = self.poll_and_dispatch(&mut tasks).await {
                        error!(%error, "scheduler poll failed");
                    }
                }
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
                _ = &mut shutdown => {
                    info!("scheduler shutting down, leaving in-flight jobs to finish");
                    return;
                }
            }
        }
    }

    async fn poll_and_dispatch(&self, tasks: &mut JoinSet<()>) -> Result<()> {
        let active_count = self.active.lock().await.len();
        let capacity = self.max_concurrent.saturating_sub(active_count);
        if capacity == 0 {
            return Ok(());
        }

        let claimed = self.store.jobs().claim_pending(capacity).await?;
        for job in claimed {
            self.active.lock().await.insert(job.id.clone());
            let store = Arc::clone(&self.store);
            let registry = Arc::clone(&self.registry);
            let active = Arc::clone(&self.active);
            tasks.spawn(async move {
                run_one(store, registry, job, active).await;
            });
        }
        Ok(())
    }

    /// Reset any job left `running` past `stale_after` back to `pending`,
    /// so it can be re-claimed after an unclean shutdown. `attempts` is
    /// left unchanged: a crash is not a retryable handler failure (§9 open
    /// question, resolved: see DESIGN.md's "Stuck `running` jobs" entry).
    /// Intended to run once, process-wide, on scheduler startup.
    pub async fn reap_stuck_jobs(store: &dyn CatalogStore, stale_after: Duration) -> Result<usize> {
        let threshold = now_unix() - i64::try_from(stale_after.as_secs()).unwrap_or(i64::MAX);
        let stuck = store.jobs().list_stuck_running(threshold).await?;

        for mut job in stuck.iter().cloned() {
            warn!(job_id = %job.id, kind = %job.kind, "reaping stuck running job");
            job.status = JobStatus::Pending;
            job.run_after = now_unix();
            job.last_error = Some(serde_json::json!({
                "message": "job left running past the stale threshold",
                "type": "stuck_running",
            }));
            store.jobs().update(&job).await?;
        }

        Ok(stuck.len())
    }
}

async fn run_one(
    store: Arc<dyn CatalogStore>,
    registry: Arc<HandlerRegistry>,
    mut job: Job,
    active: Arc<Mutex<HashSet<String>>>,
) {
    let started_at = now_unix();
    let run_id = Uuid::new_v4().to_string();
    let mut run = JobRun {
        id: run_id,
        job_id: job.id.clone(),
        status: JobRunStatus::Running,
        started_at,
        finished_at: None,
        result: None,
        error: None,
    };
    if let Err(error) = store.job_runs().create(&run).await {
        error!(job_id = %job.id, %error, "failed to record job run, marking job failed in a fresh session");
        job.status = JobStatus::Failed;
        job.completed_at = Some(now_unix());
        let _ = store.jobs().update(&job).await;
        active.lock().await.remove(&job.id);
        return;
    }

    let Some(handler) = registry.get(job.kind) else {
        error!(job_id = %job.id, kind = %job.kind, "no handler registered for job kind");
        finalize_failure(&store, &mut job, &mut run, "no handler registered for this job kind").await;
        active.lock().await.remove(&job.id);
        return;
    };

    match handler.execute(&job, store.as_ref()).await {
        Ok(result) => {
            job.status = JobStatus::Completed;
            job.completed_at = Some(now_unix());
            job.result = result.clone();
            run.status = JobRunStatus::Succeeded;
            run.finished_at = Some(now_unix());
            run.result = Some(result);
            if let Err(error) = store.jobs().update(&job).await {
                error!(job_id = %job.id, %error, "failed to persist completed job");
            }
            if let Err(error) = store.job_runs().update(&run).await {
                error!(job_id = %job.id, %error, "failed to persist succeeded job run");
            }
        }
        Err(error) => {
            finalize_failure(&store, &mut job, &mut run, &error.to_string()).await;
        }
    }

    active.lock().await.remove(&job.id);
}

async fn finalize_failure(store: &Arc<dyn CatalogStore>, job: &mut Job, run: &mut JobRun, message: &str) {
    job.last_error = Some(serde_json::json!({ "message": message, "type": "handler_error" }));
    if job.has_attempts_remaining() {
        job.status = JobStatus::Pending;
        let backoff = (BACKOFF_BASE_SECONDS * 2i64.pow(job.attempts.max(0) as u32)).min(MAX_BACKOFF_SECONDS);
        job.run_after = now_unix() + backoff;
    } else {
        job.status = JobStatus::Failed;
        job.completed_at = Some(now_unix());
    }

    run.status = JobRunStatus::Failed;
    run.finished_at = Some(now_unix());
    run.error = job.last_error.clone();

    if let Err(error) = store.jobs().update(job).await {
        error!(job_id = %job.id, %error, "failed to persist failed job");
    }
    if let Err(error) = store.job_runs().update(run).await {
        error!(job_id = %job.id, %error, "failed to persist failed job run");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_is_exponential_and_capped() {
        let backoff = |attempts: i32| (BACKOFF_BASE_SECONDS * 2i64.pow(attempts.max(0) as u32)).min(MAX_BACKOFF_SECONDS);
        assert_eq!(backoff(1), 10);
        assert_eq!(backoff(2), 20);
        assert_eq!(backoff(10), MAX_BACKOFF_SECONDS);
    }
}
