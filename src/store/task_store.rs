//! The synchronized task store.
//!
//! Owns the in-memory id → task index and keeps it consistent with the
//! tasks directory. The files are the single source of truth; the index is
//! a cache rebuilt wholesale on every scan. Programmatic mutations write
//! the file first and only touch the index once the write succeeded.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use walkdir::WalkDir;

use crate::config::Settings;
use crate::parsing::{parse_task, task_to_markdown};
use crate::types::{NewTask, Task, TaskPatch, TaskSnapshot};

use super::error::{StoreError, StoreResult};
use super::events::ChangeBroadcaster;

/// Snapshot backlog per subscriber before it starts lagging.
const BROADCAST_CAPACITY: usize = 64;

/// In-memory index over a directory of task files.
///
/// All index mutation (`load`, `create`, `update`, the watcher's reload)
/// runs under the index write lock, so mutations never interleave
/// destructively. Reads clone out from under the read lock.
pub struct TaskStore {
    settings: Arc<Settings>,
    index: RwLock<HashMap<String, Task>>,
    broadcaster: ChangeBroadcaster,
}

impl TaskStore {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            settings,
            index: RwLock::new(HashMap::new()),
            broadcaster: ChangeBroadcaster::new(BROADCAST_CAPACITY),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Rebuild the index from the tasks directory. Returns the task count.
    ///
    /// The previous index is replaced, not merged: a file deleted since the
    /// last scan disappears even if nothing else changed. Unreadable files
    /// are logged and skipped. Paths are sorted before parsing so that two
    /// files resolving to the same id collide deterministically (the
    /// lexicographically last one wins).
    pub fn load(&self) -> StoreResult<usize> {
        let root = self.settings.tasks_dir.clone();
        if !root.is_dir() {
            return Err(StoreError::RootMissing { path: root });
        }

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(&root) {
            match entry {
                Ok(entry) if entry.file_type().is_file() && self.is_eligible(entry.path()) => {
                    files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("[store] skipping unreadable entry: {e}");
                }
            }
        }
        files.sort();

        let mut index = self.index.write();
        let mut fresh = HashMap::with_capacity(files.len());
        for path in &files {
            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("[store] failed to read {}: {e}", path.display());
                    continue;
                }
            };
            let relative = path.strip_prefix(&root).unwrap_or(path).to_string_lossy();
            let task = parse_task(&relative, &content, &self.settings.default_status);
            if let Some(previous) = fresh.insert(task.id.clone(), task) {
                tracing::warn!(
                    "[store] duplicate task id '{}', overwritten by {}",
                    previous.id,
                    path.display()
                );
            }
        }

        let count = fresh.len();
        *index = fresh;
        crate::log_event!("store", "loaded", "{count} tasks");
        Ok(count)
    }

    /// All tasks in the current index. Order is unspecified.
    pub fn get_all(&self) -> Vec<Task> {
        self.index.read().values().cloned().collect()
    }

    /// Point lookup. `None` is an expected outcome, not a failure.
    pub fn get(&self, id: &str) -> Option<Task> {
        self.index.read().get(id).cloned()
    }

    /// Number of tasks in the current index.
    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }

    /// Register for full-snapshot notifications.
    ///
    /// Dropping the receiver revokes the subscription; other subscribers
    /// are unaffected.
    pub fn subscribe(&self) -> broadcast::Receiver<TaskSnapshot> {
        self.broadcaster.subscribe()
    }

    /// Create a task: serialize, write its file, upsert the index, publish.
    ///
    /// When no id is supplied a fresh `task-<unix-millis>` id is assigned.
    /// On write failure the index is untouched and nothing is published.
    pub fn create(&self, new: NewTask) -> StoreResult<Task> {
        let id = match new.id.filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => format!("task-{}", chrono::Utc::now().timestamp_millis()),
        };
        let task = Task {
            title: if new.title.is_empty() {
                id.clone()
            } else {
                new.title
            },
            id,
            description: new.description,
            dependencies: new.dependencies,
            status: new
                .status
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| self.settings.default_status.clone()),
        };

        let mut index = self.index.write();
        self.write_task_file(&task)?;
        index.insert(task.id.clone(), task.clone());
        drop(index);

        crate::log_event!("store", "created", "{}", task.id);
        self.publish();
        Ok(task)
    }

    /// Merge `patch` over an existing task, rewrite its file, publish.
    ///
    /// Returns `Ok(None)` when the id is unknown. The id itself is
    /// immutable across an update.
    pub fn update(&self, id: &str, patch: TaskPatch) -> StoreResult<Option<Task>> {
        let mut index = self.index.write();
        let Some(existing) = index.get(id) else {
            return Ok(None);
        };

        let updated = patch.apply(existing);
        self.write_task_file(&updated)?;
        index.insert(updated.id.clone(), updated.clone());
        drop(index);

        crate::log_event!("store", "updated", "{id}");
        self.publish();
        Ok(Some(updated))
    }

    /// Publish the current index as one snapshot to all subscribers.
    pub(crate) fn publish(&self) {
        let snapshot: TaskSnapshot = Arc::new(self.get_all());
        self.broadcaster.send(snapshot);
    }

    /// Whether a path carries the recognized task-file extension.
    /// This is the watcher's qualifying test for change events.
    pub(crate) fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.settings.extension))
    }

    /// Extension matches and the filename is not a reserved one
    /// (README and friends, compared case-insensitively).
    fn is_eligible(&self, path: &Path) -> bool {
        if !self.matches_extension(path) {
            return false;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        !self
            .settings
            .excluded_files
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(name))
    }

    /// Where a task with this id is written: `<tasks_dir>/<id>.<ext>`.
    /// Ids may contain `/`, producing nested files.
    fn task_path(&self, id: &str) -> PathBuf {
        self.settings
            .tasks_dir
            .join(format!("{id}.{}", self.settings.extension))
    }

    fn write_task_file(&self, task: &Task) -> StoreResult<()> {
        let path = self.task_path(&task.id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: path.clone(),
                source,
            })?;
        }
        fs::write(&path, task_to_markdown(task)).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })
    }
}

impl std::fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskStore")
            .field("tasks_dir", &self.settings.tasks_dir)
            .field("task_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn store_at(dir: &Path) -> TaskStore {
        let settings = Settings {
            tasks_dir: dir.to_path_buf(),
            ..Settings::default()
        };
        TaskStore::new(Arc::new(settings))
    }

    #[test]
    fn test_eligibility() {
        let store = store_at(Path::new("/tmp/tasks"));
        assert!(store.is_eligible(Path::new("/tmp/tasks/a.md")));
        assert!(store.is_eligible(Path::new("/tmp/tasks/nested/b.MD")));
        assert!(!store.is_eligible(Path::new("/tmp/tasks/notes.txt")));
        assert!(!store.is_eligible(Path::new("/tmp/tasks/README.md")));
        assert!(!store.is_eligible(Path::new("/tmp/tasks/readme.md")));
        assert!(!store.is_eligible(Path::new("/tmp/tasks/CLAUDE.md")));
    }

    #[test]
    fn test_task_path_supports_nested_ids() {
        let store = store_at(Path::new("/tmp/tasks"));
        assert_eq!(
            store.task_path("features/login"),
            PathBuf::from("/tmp/tasks/features/login.md")
        );
    }

    #[test]
    fn test_load_missing_root_is_an_error() {
        let store = store_at(Path::new("/definitely/not/here"));
        assert!(matches!(
            store.load(),
            Err(StoreError::RootMissing { .. })
        ));
    }
}
