//! Filesystem watching and root-level debouncing (C7, C8).

mod daemon;
mod debounce;

pub use daemon::NotifyWatcher;
pub use debounce::{OnRefresh, RootDebouncer};
