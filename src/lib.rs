//! taskdeck: file-backed task tracking.
//!
//! One markdown file per task, frontmatter for structured metadata. The
//! [`TaskStore`] keeps an in-memory index synchronized with the directory
//! (externally-mutable by editors, scripts, or version control), accepts
//! programmatic mutations written back to the files, and broadcasts a full
//! snapshot to subscribers on every logical change, debounced across
//! filesystem bursts.

pub mod config;
pub mod logging;
pub mod parsing;
pub mod store;
pub mod types;
pub mod watcher;

pub use config::Settings;
pub use parsing::{parse_task, task_to_markdown};
pub use store::{StoreError, StoreResult, TaskStore};
pub use types::{NewTask, Task, TaskPatch, TaskSnapshot};
pub use watcher::{WatchError, WatchHandle};
