//! Error types for store operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by [`TaskStore`](super::TaskStore) operations.
///
/// Per-file problems during a scan are not here: those are logged and the
/// file skipped, never aborting the scan. Mutation failures always reach
/// the caller, and the index stays untouched when they do.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("tasks directory does not exist: {path}")]
    RootMissing { path: PathBuf },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
