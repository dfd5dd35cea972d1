//! Infrastructure layer for the project catalog and hybrid-search
//! service: configuration, logging, the relational catalog store, the
//! in-process vector index, the filesystem watcher and root debouncer,
//! and the job scheduler.

pub mod config;
pub mod db;
pub mod logging;
pub mod scheduler;
pub mod vectorstore;
pub mod watcher;

pub use config::AppConfig;
pub use db::SeaOrmCatalogStore;
pub use scheduler::{HandlerRegistry, Scheduler};
pub use vectorstore::FileVectorStore;
pub use watcher::{NotifyWatcher, OnRefresh, RootDebouncer};
