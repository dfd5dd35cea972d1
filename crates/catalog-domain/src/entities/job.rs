//! Background work items processed by the job scheduler (§4.9).

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

crate::define_entity! {
    /// A unit of background work: scan a root, refresh a project, run a
    /// health check, etc. Owned by a single `org_id`; optionally scoped to
    /// one `project_id`.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Job { id, org_id, created_at, updated_at } {
        /// The project this job operates on, if scoped to one.
        pub project_id: Option<String>,
        /// What kind of work this job performs.
        pub kind: JobKind,
        /// Current lifecycle state.
        pub status: JobStatus,
        /// Scheduling priority; lower values are dequeued first.
        pub priority: i32,
        /// Number of attempts made so far, incremented on each run.
        pub attempts: i32,
        /// Maximum attempts before the job is finalized as failed.
        pub max_attempts: i32,
        /// Earliest time (Unix epoch) at which this job may be dequeued.
        pub run_after: i64,
        /// Structured result payload from the most recent successful run.
        pub result: serde_json::Value,
        /// Structured error payload from the most recent failed attempt.
        pub last_error: Option<serde_json::Value>,
        /// When the current or most recent attempt started.
        pub started_at: Option<i64>,
        /// When the job reached a terminal state.
        pub completed_at: Option<i64>,
    }
}

impl Job {
    /// Whether another attempt is still permitted under `max_attempts`.
    #[must_use]
    pub fn has_attempts_remaining(&self) -> bool {
        self.attempts < self.max_attempts
    }
}

/// What kind of work a job performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Walk a watched root and create/update projects found under it.
    Scan,
    /// Re-read a single known project's manifest and filesystem state.
    Refresh,
    /// Recompute a project's deterministic health score.
    HealthCheck,
    /// Run an LLM-backed qualitative analysis of a project.
    LlmAnalysis,
    /// (Re)compute and upsert a project's embedding vector.
    EmbeddingIndex,
    /// Recompute a project's quality indicators and composite score.
    QualityAssessment,
}

/// Lifecycle state of a [`Job`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Queued, waiting for `run_after` and a free worker slot.
    #[default]
    Pending,
    /// Currently being processed by a worker task.
    Running,
    /// Finished successfully; terminal.
    Completed,
    /// Exhausted retries or failed catastrophically; terminal.
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempts_remaining_is_exclusive_of_max() {
        let mut job = Job {
            id: "j1".into(),
            org_id: "o1".into(),
            created_at: 0,
            updated_at: 0,
            project_id: None,
            kind: JobKind::Scan,
            status: JobStatus::Pending,
            priority: 0,
            attempts: 2,
            max_attempts: 3,
            run_after: 0,
            result: serde_json::Value::Null,
            last_error: None,
            started_at: None,
            completed_at: None,
        };
        assert!(job.has_attempts_remaining());
        job.attempts = 3;
        assert!(!job.has_attempts_remaining());
    }
}
