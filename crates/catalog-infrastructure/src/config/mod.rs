//! Layered configuration (§6): a TOML file layer overridden by
//! `CATALOG_`-prefixed environment variables, following the teacher's
//! `figment`-based provider chain.

use std::path::PathBuf;

use catalog_domain::error::{Error, Result};
use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable, colorized when attached to a terminal.
    #[default]
    Pretty,
    /// Newline-delimited JSON, suited to log aggregators.
    Json,
}

/// Logging configuration. Not environment-overridable beyond `RUST_LOG`,
/// which `tracing_subscriber::EnvFilter` reads directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, used when `RUST_LOG` is unset.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), format: LogFormat::default() }
    }
}

/// Relational store connection settings. Structural, not environment
/// overridable (§6: "the relational store's connection string").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SeaORM/sqlx connection string, e.g. `sqlite://catalog.db?mode=rwc`.
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: "sqlite://catalog.db?mode=rwc".to_owned() }
    }
}

/// Filesystem watcher / debounce configuration (§4.7, §4.8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Comma-separated watch roots (`CATALOG_WATCH_PATHS`).
    pub paths: Vec<PathBuf>,
    /// C7 quiet window, in seconds (`CATALOG_DEBOUNCE_SECONDS`).
    pub debounce_seconds: f64,
    /// C7 upper bound, in seconds (`CATALOG_MAX_WAIT_SECONDS`).
    pub max_wait_seconds: f64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { paths: Vec::new(), debounce_seconds: 5.0, max_wait_seconds: 30.0 }
    }
}

/// Job scheduler configuration (§4.9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Supervisor poll period, in seconds (`CATALOG_WORKER_POLL_INTERVAL`).
    pub poll_interval_seconds: f64,
    /// In-flight job cap (`CATALOG_WORKER_MAX_CONCURRENT`).
    pub max_concurrent: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { poll_interval_seconds: 5.0, max_concurrent: 3 }
    }
}

/// Hybrid search tuning (§4.10).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// RRF semantic weight (`CATALOG_SEMANTIC_WEIGHT`).
    pub semantic_weight: f64,
    /// RRF full-text weight (`CATALOG_FTS_WEIGHT`).
    pub fts_weight: f64,
    /// Whether to use the semantic side of hybrid search when the embedder
    /// is available (`CATALOG_SEMANTIC_AUTO`).
    pub semantic_auto: bool,
    /// Whether to expand the query with LLM-suggested related terms
    /// before embedding it (`CATALOG_QUERY_EXPANSION`). Off by default:
    /// expansion widens recall but can drift (§9 Open Question, decided).
    pub query_expansion: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { semantic_weight: 0.4, fts_weight: 0.6, semantic_auto: true, query_expansion: false }
    }
}

/// Embedding/LLM provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Base URL of the Ollama-compatible embedding/generation server
    /// (`CATALOG_OLLAMA_BASE_URL`).
    pub ollama_base_url: String,
    /// Embedding model id (`CATALOG_EMBEDDING_MODEL`).
    pub embedding_model: String,
    /// Generation model id (`CATALOG_LLM_MODEL`).
    pub llm_model: String,
    /// Vector-store snapshot path (`CATALOG_VECTOR_CACHE`).
    pub vector_cache: PathBuf,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        let cache_dir = dirs::cache_dir().unwrap_or_else(std::env::temp_dir);
        Self {
            ollama_base_url: "http://localhost:11434".to_owned(),
            embedding_model: "nomic-embed-text".to_owned(),
            llm_model: "llama3.1".to_owned(),
            vector_cache: cache_dir.join("catalog").join("embeddings").join("project_embeddings.json"),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Relational store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Watcher/debounce settings.
    #[serde(default)]
    pub watch: WatchConfig,
    /// Scheduler settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Hybrid search settings.
    #[serde(default)]
    pub search: SearchConfig,
    /// Embedding/LLM provider settings.
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl AppConfig {
    /// Load configuration from an optional TOML file, then apply the
    /// fixed set of `CATALOG_*` environment variables from §6 over it.
    /// A missing file is not an error: defaults plus environment
    /// overrides still apply.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the TOML file is malformed or a
    /// `CATALOG_*` variable can't be parsed as its target type.
    pub fn load(toml_path: Option<&std::path::Path>) -> Result<Self> {
        let figment = Figment::from(Serialized::defaults(AppConfig::default()));
        let figment = match toml_path {
            Some(path) if path.is_file() => figment.merge(Toml::file(path).nested()),
            _ => figment,
        };

        let mut config: AppConfig =
            figment.extract().map_err(|error| Error::Config { message: error.to_string() })?;

        apply_env_overrides(&mut config)?;
        Ok(config)
    }
}

/// Apply the fixed `CATALOG_*` environment variables enumerated in §6.
/// These map to specific nested fields rather than a generic
/// struct-shaped prefix, so each is read and parsed explicitly.
fn apply_env_overrides(config: &mut AppConfig) -> Result<()> {
    fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
        match std::env::var(name) {
            Ok(value) => value
                .parse()
                .map(Some)
                .map_err(|_| Error::Config { message: format!("invalid value for {name}") }),
            Err(_) => Ok(None),
        }
    }

    if let Ok(paths) = std::env::var("CATALOG_WATCH_PATHS") {
        config.watch.paths = paths.split(',').map(str::trim).filter(|p| !p.is_empty()).map(PathBuf::from).collect();
    }
    if let Some(value) = parse_env::<f64>("CATALOG_DEBOUNCE_SECONDS")? {
        config.watch.debounce_seconds = value;
    }
    if let Some(value) = parse_env::<f64>("CATALOG_MAX_WAIT_SECONDS")? {
        config.watch.max_wait_seconds = value;
    }
    if let Some(value) = parse_env::<f64>("CATALOG_WORKER_POLL_INTERVAL")? {
        config.worker.poll_interval_seconds = value;
    }
    if let Some(value) = parse_env::<usize>("CATALOG_WORKER_MAX_CONCURRENT")? {
        config.worker.max_concurrent = value;
    }
    if let Some(value) = parse_env::<f64>("CATALOG_SEMANTIC_WEIGHT")? {
        config.search.semantic_weight = value;
    }
    if let Some(value) = parse_env::<f64>("CATALOG_FTS_WEIGHT")? {
        config.search.fts_weight = value;
    }
    if let Some(value) = parse_env::<bool>("CATALOG_SEMANTIC_AUTO")? {
        config.search.semantic_auto = value;
    }
    if let Some(value) = parse_env::<bool>("CATALOG_QUERY_EXPANSION")? {
        config.search.query_expansion = value;
    }
    if let Ok(value) = std::env::var("CATALOG_OLLAMA_BASE_URL") {
        config.providers.ollama_base_url = value;
    }
    if let Ok(value) = std::env::var("CATALOG_EMBEDDING_MODEL") {
        config.providers.embedding_model = value;
    }
    if let Ok(value) = std::env::var("CATALOG_LLM_MODEL") {
        config.providers.llm_model = value;
    }
    if let Ok(value) = std::env::var("CATALOG_VECTOR_CACHE") {
        config.providers.vector_cache = PathBuf::from(value);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_a_file() {
        let config = AppConfig::load(None).expect("defaults should always load");
        assert_eq!(config.worker.max_concurrent, 3);
        assert!((config.search.fts_weight - 0.6).abs() < 1e-9);
    }

    #[test]
    #[allow(unsafe_code, reason = "std::env::set_var is unsafe since edition 2024; scoped to this test")]
    fn environment_overrides_defaults() {
        // SAFETY: test-local env var, no other test in this process reads it concurrently.
        unsafe { std::env::set_var("CATALOG_WORKER_MAX_CONCURRENT", "7") };
        let config = AppConfig::load(None).expect("config should load");
        unsafe { std::env::remove_var("CATALOG_WORKER_MAX_CONCURRENT") };
        assert_eq!(config.worker.max_concurrent, 7);
    }
}
