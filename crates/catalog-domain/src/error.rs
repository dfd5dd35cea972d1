//! Domain error taxonomy.
//!
//! Mirrors the five classes described for the core: not-found, validation,
//! transient-external, handler-failure, and catastrophic. `thiserror`
//! carries the `Display`/`std::error::Error` impls; library code always
//! returns [`Result`], never panics on expected failure paths.

use thiserror::Error;

/// Result type alias for domain and application operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Domain error type for the catalog and hybrid-search service.
#[derive(Error, Debug)]
pub enum Error {
    /// A project or job referenced by id does not exist. Never retried.
    #[error("not found: {resource}")]
    NotFound {
        /// Description of the missing resource, e.g. `"project O/demoapp"`.
        resource: String,
    },

    /// Caller-supplied input was invalid (bad path, construction invariant
    /// violated). Surfaced immediately, never retried.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Human-readable description of what was invalid.
        message: String,
    },

    /// A uniqueness or cardinality invariant held by the catalog store was
    /// violated (e.g. `(org_id, name)` collision on a fresh insert).
    #[error("constraint violated: {message}")]
    Constraint {
        /// Description of the violated constraint.
        message: String,
    },

    /// A transient failure in an external collaborator (embedder, LLM,
    /// filesystem snapshot write, store lock contention). Retried locally
    /// with backoff by the caller before being surfaced.
    #[error("transient error: {message}")]
    Transient {
        /// Description of the transient failure.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A job handler failed. Caught by the scheduler, which either
    /// reschedules with backoff or finalizes the job as failed.
    #[error("job handler failed: {message}")]
    Handler {
        /// Description of the handler failure.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Session acquisition or commit failed inside the job wrapper itself,
    /// outside the handler's own try/rollback. Best-effort recovered by the
    /// scheduler; never propagated to crash the process.
    #[error("catastrophic error: {message}")]
    Catastrophic {
        /// Description of the catastrophic failure.
        message: String,
    },

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Construct a [`Error::NotFound`].
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Construct a [`Error::InvalidArgument`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument { message: message.into() }
    }

    /// Construct a [`Error::Transient`] with no inner source.
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient { message: message.into(), source: None }
    }

    /// Construct a [`Error::Handler`] with no inner source.
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler { message: message.into(), source: None }
    }

    /// Whether this error class is one the job scheduler should retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. } | Self::Handler { .. })
    }
}
