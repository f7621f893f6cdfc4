//! Error types for the directory watcher.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from establishing a watch.
///
/// These reach the caller of `watch()` once; the store stays fully usable
/// without a live watcher.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("failed to initialize watcher: {reason}")]
    InitFailed { reason: String },

    #[error("cannot watch path {path}: {reason}")]
    PathWatchFailed { path: PathBuf, reason: String },
}

impl From<notify::Error> for WatchError {
    fn from(e: notify::Error) -> Self {
        WatchError::InitFailed {
            reason: e.to_string(),
        }
    }
}
