//! Append-only audit log of individual job attempts (§3, §4.9).

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// One attempt at running a [`super::Job`]. Never mutated after creation
/// except to set `finished_at`/`status`/`result`/`error` when the attempt
/// concludes; a job with `max_attempts = 3` accumulates up to three rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRun {
    /// Unique identifier for this run.
    pub id: String,
    /// The job this run belongs to.
    pub job_id: String,
    /// Outcome of this particular attempt.
    pub status: JobRunStatus,
    /// When this attempt started (Unix epoch).
    pub started_at: i64,
    /// When this attempt concluded, if it has.
    pub finished_at: Option<i64>,
    /// Structured result payload, populated on success.
    pub result: Option<serde_json::Value>,
    /// Structured error payload, populated on failure.
    pub error: Option<serde_json::Value>,
}

/// Outcome of a single [`JobRun`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobRunStatus {
    /// The attempt is still in progress.
    #[default]
    Running,
    /// The attempt completed successfully.
    Succeeded,
    /// The attempt failed.
    Failed,
}
