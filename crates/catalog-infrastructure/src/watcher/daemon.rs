//! Filesystem Watcher (C8): subscribes to recursive filesystem
//! notifications over configured roots and forwards surviving events to
//! the C7 debouncer. Grounded on
//! `original_source/catalog/watcher/daemon.py`'s `WatcherDaemon`, ported
//! from `watchdog` to the `notify` crate per SPEC_FULL.md §4.8.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use catalog_domain::error::{Error, Result};
use catalog_domain::ports::{FsEvent, FsWatcher};
use globset::{Glob, GlobSet, GlobSetBuilder};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::Mutex;

const IGNORE_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "__pycache__",
    ".venv",
    "venv",
    ".env",
    ".idea",
    ".vscode",
    "target",
    "build",
    "dist",
    ".next",
    ".nuxt",
    "coverage",
    ".pytest_cache",
    ".mypy_cache",
    ".ruff_cache",
];

const IGNORE_PATTERNS: &[&str] =
    &["*.pyc", "*.pyo", "*.egg-info", "*.so", "*.dll", "*.log", "*.tmp", "*.temp", "*.swp", "*.lock"];

static IGNORE_GLOBS: LazyLock<GlobSet> = LazyLock::new(|| {
    let mut builder = GlobSetBuilder::new();
    for pattern in IGNORE_PATTERNS {
        builder.add(Glob::new(pattern).expect("ignore pattern is a valid glob"));
    }
    builder.build().expect("ignore glob set compiles")
});

fn should_ignore(path: &Path) -> bool {
    if path.components().any(|component| IGNORE_DIRS.contains(&component.as_os_str().to_string_lossy().as_ref())) {
        return true;
    }
    path.file_name().is_some_and(|name| IGNORE_GLOBS.is_match(name))
}

struct Subscription {
    watcher: RecommendedWatcher,
}

/// `notify`-backed implementation of [`FsWatcher`]. One `notify` watcher
/// is created per subscribed root so roots can be unsubscribed
/// independently.
pub struct NotifyWatcher {
    subscriptions: Mutex<HashMap<PathBuf, Subscription>>,
}

impl Default for NotifyWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyWatcher {
    /// Construct an empty watcher with no active subscriptions.
    #[must_use]
    pub fn new() -> Self {
        Self { subscriptions: Mutex::new(HashMap::new()) }
    }
}

#[async_trait]
impl FsWatcher for NotifyWatcher {
    async fn subscribe(&self, root: PathBuf, callback: Box<dyn Fn(FsEvent) + Send + Sync>) -> Result<()> {
        let callback = Arc::new(callback);
        let watch_root = root.clone();

        let mut watcher = notify::recommended_watcher(move |event: notify::Result<Event>| {
            let Ok(event) = event else { return };
            if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)) {
                return;
            }
            for path in event.paths {
                if path.is_dir() || should_ignore(&path) {
                    continue;
                }
                callback(FsEvent { root: watch_root.clone(), path });
            }
        })
        .map_err(|error| Error::transient(format!("failed to create filesystem watcher: {error}")))?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|error| Error::transient(format!("failed to watch {}: {error}", root.display())))?;

        self.subscriptions.lock().await.insert(root, Subscription { watcher });
        Ok(())
    }

    async fn unsubscribe(&self, root: &Path) -> Result<()> {
        if let Some(mut subscription) = self.subscriptions.lock().await.remove(root) {
            let _ = subscription.watcher.unwatch(root);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_known_noise_directories_and_patterns() {
        assert!(should_ignore(Path::new("/repo/node_modules/pkg/index.js")));
        assert!(should_ignore(Path::new("/repo/src/main.rs.swp")));
        assert!(!should_ignore(Path::new("/repo/src/main.rs")));
    }
}
