//! CLI entry point for the project catalog and hybrid-search service.
//! Wires the application use cases to the SQLite-backed store, the
//! in-process vector index, and an Ollama-compatible embedding/LLM
//! backend, then dispatches to one of three subcommands.

mod wiring;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use catalog_application::jobs::{
    EmbeddingIndexHandler, HealthCheckHandler, JobHandler, LlmAnalysisHandler, QualityAssessmentHandler,
    RefreshHandler, ScanHandler,
};
use catalog_application::search::{HybridSearchEngine, SearchWeights};
use catalog_domain::entities::{Job, JobKind, JobStatus};
use catalog_domain::ports::{CatalogStore, FsWatcher};
use catalog_infrastructure::scheduler::{HandlerRegistry, Scheduler};
use catalog_infrastructure::watcher::{NotifyWatcher, RootDebouncer};
use catalog_infrastructure::{AppConfig, SeaOrmCatalogStore};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use wiring::Context as AppContext;

/// A multi-tenant catalog of discovered source-code projects with
/// full-text and semantic hybrid search.
#[derive(Debug, Parser)]
#[command(name = "catalog", version, about)]
struct Cli {
    /// Path to a TOML configuration file. Falls back to defaults plus
    /// `CATALOG_*` environment overrides if omitted or missing.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Organization scoping every operation (§6: no auth/tenancy layer,
    /// so this selects the tenant directly).
    #[arg(long, global = true, default_value = "default")]
    org: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the long-lived daemon: job scheduler, filesystem watcher, and
    /// root debouncer, until interrupted.
    Serve,
    /// Walk `path` and create/update the projects discovered under it.
    Scan {
        /// Root directory to scan.
        path: PathBuf,
    },
    /// Run a hybrid keyword-plus-semantic search and print the results.
    Search {
        /// Free-text query.
        query: String,
        /// Maximum number of results.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    catalog_infrastructure::logging::init_logging(&config.logging).context("initializing logging")?;

    match cli.command {
        Command::Serve => serve(&config).await,
        Command::Scan { path } => scan(&config, &cli.org, &path).await,
        Command::Search { query, limit } => search(&config, &cli.org, &query, limit).await,
    }
}

/// How long a job may sit `running` before the startup reaper assumes it
/// was orphaned by an unclean shutdown.
const STUCK_JOB_THRESHOLD: Duration = Duration::from_secs(600);

async fn serve(config: &AppConfig) -> Result<()> {
    let context = AppContext::build(config).await?;
    let reaped = Scheduler::reap_stuck_jobs(context.store.as_ref(), STUCK_JOB_THRESHOLD).await?;
    if reaped > 0 {
        tracing::warn!(reaped, "reaped jobs left running by an unclean shutdown");
    }

    let registry = HandlerRegistry::new(vec![
        (JobKind::Scan, Arc::new(ScanHandler) as Arc<dyn JobHandler>),
        (JobKind::Refresh, Arc::new(RefreshHandler)),
        (JobKind::HealthCheck, Arc::new(HealthCheckHandler)),
        (JobKind::LlmAnalysis, Arc::new(LlmAnalysisHandler::new(Some(Arc::clone(&context.llm)), Some(Arc::clone(&context.embedding))))),
        (JobKind::EmbeddingIndex, Arc::new(EmbeddingIndexHandler::new(Arc::clone(&context.embedding)))),
        (JobKind::QualityAssessment, Arc::new(QualityAssessmentHandler::new(Some(Arc::clone(&context.llm))))),
    ]);

    let scheduler = Scheduler::new(
        Arc::clone(&context.store) as Arc<dyn CatalogStore>,
        registry,
        Duration::from_secs_f64(config.worker.poll_interval_seconds),
        config.worker.max_concurrent,
    );

    let watcher = Arc::new(NotifyWatcher::new());
    let store_for_refresh = Arc::clone(&context.store);
    let debouncer = Arc::new(RootDebouncer::new(
        Duration::from_secs_f64(config.watch.debounce_seconds),
        Duration::from_secs_f64(config.watch.max_wait_seconds),
        Arc::new(move |root: PathBuf| {
            let store = Arc::clone(&store_for_refresh);
            tokio::spawn(async move {
                if let Err(error) = enqueue_refresh(store.as_ref(), &root).await {
                    tracing::error!(%error, root = %root.display(), "failed to enqueue refresh job");
                }
            });
        }),
    ));

    for root in &config.watch.paths {
        let debouncer = Arc::clone(&debouncer);
        let root_owned = root.clone();
        watcher
            .subscribe(
                root.clone(),
                Box::new(move |event| {
                    let debouncer = Arc::clone(&debouncer);
                    let path = event.path.clone();
                    tokio::spawn(async move {
                        debouncer.on_event(&path).await;
                    });
                }),
            )
            .await
            .with_context(|| format!("watching {}", root_owned.display()))?;
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        let _ = shutdown_tx.send(());
    });

    tracing::info!(roots = config.watch.paths.len(), "catalog daemon starting");
    scheduler.run(shutdown_rx).await;
    Ok(())
}

/// Resolve the project owning a refreshed root and enqueue a `refresh`
/// job for it. A root with no matching project is dropped (§4.7/§4.8:
/// the watcher only refreshes projects already known to the catalog; a
/// new project directory is picked up by the next `scan`).
async fn enqueue_refresh(store: &dyn CatalogStore, root: &std::path::Path) -> Result<()> {
    let path_str = root.to_string_lossy().into_owned();
    let projects = store.projects().list("default").await?;
    let Some(project) = projects.into_iter().find(|project| project.path == path_str) else {
        tracing::debug!(path = %path_str, "skipping refresh for unknown project root");
        return Ok(());
    };

    let now = chrono::Utc::now().timestamp();
    let job = Job {
        id: Uuid::new_v4().to_string(),
        org_id: project.org_id.clone(),
        created_at: now,
        updated_at: now,
        project_id: Some(project.id),
        kind: JobKind::Refresh,
        status: JobStatus::Pending,
        priority: 5,
        attempts: 0,
        max_attempts: 3,
        run_after: now,
        result: serde_json::Value::Null,
        last_error: None,
        started_at: None,
        completed_at: None,
    };
    store.jobs().create(&job).await?;
    Ok(())
}

async fn scan(config: &AppConfig, org: &str, path: &std::path::Path) -> Result<()> {
    let context = AppContext::build(config).await?;
    let now = chrono::Utc::now().timestamp();
    let job = Job {
        id: Uuid::new_v4().to_string(),
        org_id: org.to_owned(),
        created_at: now,
        updated_at: now,
        project_id: None,
        kind: JobKind::Scan,
        status: JobStatus::Running,
        priority: 0,
        attempts: 1,
        max_attempts: 3,
        run_after: now,
        result: serde_json::json!({"paths": [path.to_string_lossy()]}),
        last_error: None,
        started_at: Some(now),
        completed_at: None,
    };

    let result = ScanHandler.execute(&job, context.store.as_ref()).await.context("running scan")?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn search(config: &AppConfig, org: &str, query: &str, limit: usize) -> Result<()> {
    let context = AppContext::build(config).await?;
    let weights = SearchWeights { fts: config.search.fts_weight, semantic: config.search.semantic_weight };
    let engine = HybridSearchEngine::new(
        Arc::clone(&context.store) as Arc<dyn CatalogStore>,
        if config.search.semantic_auto { Some(Arc::clone(&context.embedding)) } else { None },
        weights,
        Some(Arc::clone(&context.llm)),
        config.search.query_expansion,
    );

    let results = engine.search(org, query, limit).await.context("running search")?;
    if results.is_empty() {
        println!("no matches");
        return Ok(());
    }
    for result in results {
        println!("{:>7.4}  {:<30}  {}", result.relevance_score, result.project.name, result.project.path);
    }
    Ok(())
}
