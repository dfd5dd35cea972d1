//! Filesystem watch port (§4.8, §6).

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;

/// A raw filesystem change notification, prior to root-level debouncing.
#[derive(Debug, Clone)]
pub struct FsEvent {
    /// The watched root this event was observed under.
    pub root: PathBuf,
    /// The specific path that changed.
    pub path: PathBuf,
}

/// Subscribes to filesystem change notifications under a set of roots.
/// Implemented over the `notify` crate in `catalog-infrastructure`.
#[async_trait]
pub trait FsWatcher: Send + Sync {
    /// Begin watching `root` recursively, invoking `callback` for every
    /// observed change until the watcher is dropped or `root` is
    /// unsubscribed.
    async fn subscribe(
        &self,
        root: PathBuf,
        callback: Box<dyn Fn(FsEvent) + Send + Sync>,
    ) -> Result<()>;

    /// Stop watching `root`.
    async fn unsubscribe(&self, root: &std::path::Path) -> Result<()>;
}
