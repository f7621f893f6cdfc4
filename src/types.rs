//! Public record types shared across the store, the parser, and consumers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// One work item, backed by exactly one markdown file.
///
/// The file is the source of truth; a `Task` is what its content parses to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique across the index. Frontmatter `id`, or the file's relative
    /// path with the `.md` suffix stripped.
    pub id: String,
    /// Never empty: frontmatter `title`, else the first `#` heading, else the id.
    pub title: String,
    /// Body text after the title heading. May be empty.
    pub description: String,
    /// Ids of tasks this one depends on, in header order. Dangling
    /// references are legal; no existence or cycle checks are made.
    pub dependencies: Vec<String>,
    /// Free-form, conventionally one of the configured columns.
    pub status: String,
}

/// Input to [`TaskStore::create`](crate::TaskStore::create).
///
/// When `id` is `None` the store assigns a fresh `task-<unix-millis>` id.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub dependencies: Vec<String>,
    pub status: Option<String>,
}

/// Field-wise patch for [`TaskStore::update`](crate::TaskStore::update).
/// `None` fields keep their current value; the id is immutable.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub dependencies: Option<Vec<String>>,
    pub status: Option<String>,
}

impl TaskPatch {
    /// Apply this patch over an existing task, preserving its id.
    pub fn apply(self, existing: &Task) -> Task {
        Task {
            id: existing.id.clone(),
            title: self.title.unwrap_or_else(|| existing.title.clone()),
            description: self
                .description
                .unwrap_or_else(|| existing.description.clone()),
            dependencies: self
                .dependencies
                .unwrap_or_else(|| existing.dependencies.clone()),
            status: self.status.unwrap_or_else(|| existing.status.clone()),
        }
    }
}

/// A complete, self-consistent view of the index at one instant.
///
/// Delivered to every subscriber on each logical change. Shared rather than
/// cloned per subscriber.
pub type TaskSnapshot = Arc<Vec<Task>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        Task {
            id: "t1".to_string(),
            title: "Title".to_string(),
            description: "Body".to_string(),
            dependencies: vec!["t0".to_string()],
            status: "todo".to_string(),
        }
    }

    #[test]
    fn test_patch_keeps_unset_fields() {
        let patch = TaskPatch {
            status: Some("done".to_string()),
            ..TaskPatch::default()
        };
        let updated = patch.apply(&task());
        assert_eq!(updated.status, "done");
        assert_eq!(updated.title, "Title");
        assert_eq!(updated.dependencies, vec!["t0"]);
    }

    #[test]
    fn test_patch_cannot_change_id() {
        let updated = TaskPatch::default().apply(&task());
        assert_eq!(updated.id, "t1");
    }
}
