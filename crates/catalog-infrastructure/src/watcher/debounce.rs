//! Root Debouncer (C7): collapses bursts of filesystem events into one
//! refresh callback per project root, with a quiet window and an upper
//! bound on latency. Grounded on
//! `original_source/catalog/watcher/debounce.py`'s `RootDebouncer`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use catalog_application::manifest::ManifestReader;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// A callback invoked once a project root's debounce window fires. Both
/// synchronous and asynchronous triggers are supported by having the
/// caller hand in an already-boxed future-producing closure (§9: "model
/// this as ... an interface with a single `Trigger(root)` method").
pub type OnRefresh = Arc<dyn Fn(PathBuf) + Send + Sync>;

struct Pending {
    first_event_at: Instant,
    timer: JoinHandle<()>,
}

/// Debounces filesystem events per project root. Project root detection
/// walks up from the event path until it finds a recognised manifest (the
/// same set C2 checks) or a `.git` directory.
pub struct RootDebouncer {
    debounce_window: Duration,
    max_wait: Duration,
    pending: Mutex<HashMap<PathBuf, Pending>>,
    root_cache: Mutex<HashMap<PathBuf, Option<PathBuf>>>,
    on_refresh: OnRefresh,
}

impl RootDebouncer {
    /// Construct a debouncer with the given quiet window and upper bound,
    /// invoking `on_refresh` once per settled burst.
    #[must_use]
    pub fn new(debounce_window: Duration, max_wait: Duration, on_refresh: OnRefresh) -> Self {
        Self {
            debounce_window,
            max_wait,
            pending: Mutex::new(HashMap::new()),
            root_cache: Mutex::new(HashMap::new()),
            on_refresh,
        }
    }

    /// Clear the cached `path -> root` lookups, forcing the next event
    /// under each path to re-walk the filesystem.
    pub async fn clear_cache(&self) {
        self.root_cache.lock().await.clear();
    }

    /// Number of project roots currently awaiting a debounced refresh.
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Handle one filesystem event at `path`. Drops the event if no
    /// enclosing project root can be found.
    pub async fn on_event(self: &Arc<Self>, path: &Path) {
        let Some(root) = self.resolve_root(path).await else { return };
        self.register(root).await;
    }

    async fn resolve_root(&self, path: &Path) -> Option<PathBuf> {
        if let Some(cached) = self.root_cache.lock().await.get(path) {
            return cached.clone();
        }

        let mut current = if path.is_dir() { Some(path.to_path_buf()) } else { path.parent().map(Path::to_path_buf) };
        let root = loop {
            let Some(dir) = current else { break None };
            if ManifestReader::detect_best_manifest(&dir).is_some() || dir.join(".git").exists() {
                break Some(dir);
            }
            current = dir.parent().map(Path::to_path_buf);
        };

        self.root_cache.lock().await.insert(path.to_path_buf(), root.clone());
        root
    }

    async fn register(self: &Arc<Self>, root: PathBuf) {
        let mut pending = self.pending.lock().await;

        if let Some(entry) = pending.get(&root) {
            if entry.first_event_at.elapsed() >= self.max_wait {
                let entry = pending.remove(&root).expect("just checked present");
                entry.timer.abort();
                drop(pending);
                self.fire(root);
                return;
            }
            entry.timer.abort();
        }

        let first_event_at = pending.get(&root).map_or_else(Instant::now, |entry| entry.first_event_at);
        let this = Arc::clone(self);
        let fire_at = root.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(this.debounce_window).await;
            this.pending.lock().await.remove(&fire_at);
            this.fire(fire_at);
        });

        pending.insert(root, Pending { first_event_at, timer });
    }

    fn fire(&self, root: PathBuf) {
        (self.on_refresh)(root);
    }

    /// Force every pending entry to fire immediately, cancelling its timer.
    pub async fn flush(&self) {
        let mut pending = self.pending.lock().await;
        for (root, entry) in pending.drain() {
            entry.timer.abort();
            self.fire(root);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tempfile::tempdir;

    use super::*;

    #[tokio::test]
    async fn burst_of_events_fires_once_after_quiet_window() {
        let dir = tempdir().expect("tempdir");
        std::fs::write(dir.path().join("Cargo.toml"), "[package]\nname=\"x\"").expect("write");

        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);
        let debouncer = Arc::new(RootDebouncer::new(
            Duration::from_millis(50),
            Duration::from_secs(30),
            Arc::new(move |_root| {
                fired_clone.fetch_add(1, Ordering::SeqCst);
            }),
        ));

        for _ in 0..5 {
            debouncer.on_event(&dir.path().join("src/lib.rs")).await;
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn event_outside_any_project_is_dropped() {
        let dir = tempdir().expect("tempdir");
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);
        let debouncer = Arc::new(RootDebouncer::new(
            Duration::from_millis(10),
            Duration::from_secs(30),
            Arc::new(move |_root| {
                fired_clone.fetch_add(1, Ordering::SeqCst);
            }),
        ));

        debouncer.on_event(&dir.path().join("loose_file.txt")).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
