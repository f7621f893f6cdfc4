//! Markdown file content to [`Task`] and back.
//!
//! Parsing is a total function: every input, including the empty string,
//! yields a valid record. The serializer writes the canonical file shape
//! and is the exact inverse of parsing for the fields it emits.

use crate::types::Task;

use super::frontmatter::parse_frontmatter;

/// Parse one task file.
///
/// Field derivation:
/// - id: frontmatter `id`, else `relative_path` with the `.md` suffix stripped
/// - title: frontmatter `title`, else the first `#` heading, else the id
/// - description: everything after the first `#` heading line (or the whole
///   body if there is none), trimmed
/// - dependencies: frontmatter `dependsOn` (canonical) or `depends`
/// - status: frontmatter `status`, else `default_status`
pub fn parse_task(relative_path: &str, content: &str, default_status: &str) -> Task {
    let (attrs, body) = parse_frontmatter(content);

    let id = attrs.id.unwrap_or_else(|| path_to_id(relative_path));

    let lines: Vec<&str> = body.lines().collect();
    let mut title = attrs.title;
    let mut description_start = 0;

    for (i, line) in lines.iter().enumerate() {
        if let Some(text) = title_heading(line) {
            if title.is_none() {
                title = Some(text.to_string());
            }
            description_start = i + 1;
            break;
        }
    }

    let description = lines[description_start..].join("\n").trim().to_string();

    Task {
        title: title.unwrap_or_else(|| id.clone()),
        id,
        description,
        dependencies: attrs.dependencies.unwrap_or_default(),
        status: attrs.status.unwrap_or_else(|| default_status.to_string()),
    }
}

/// Serialize a task to the canonical file shape.
///
/// The dependency block is omitted when empty, the description block when
/// empty. Dependencies are written under the canonical `dependsOn` key.
pub fn task_to_markdown(task: &Task) -> String {
    let mut lines: Vec<String> = vec!["---".to_string()];
    if !task.id.is_empty() {
        lines.push(format!("id: {}", task.id));
    }
    lines.push(format!("status: {}", task.status));
    if !task.dependencies.is_empty() {
        lines.push("dependsOn:".to_string());
        for dep in &task.dependencies {
            lines.push(format!("  - {dep}"));
        }
    }
    lines.push("---".to_string());
    lines.push(String::new());
    lines.push(format!("# {}", task.title));
    if !task.description.is_empty() {
        lines.push(String::new());
        lines.push(task.description.clone());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Derive an id from a relative path: separators normalized to `/`,
/// trailing `.md` stripped.
fn path_to_id(relative_path: &str) -> String {
    let normalized = relative_path.replace('\\', "/");
    match normalized.strip_suffix(".md") {
        Some(stem) => stem.to_string(),
        None => normalized,
    }
}

/// Match a single-`#` title heading. Deeper levels (`##`+) never match.
fn title_heading(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('#')?;
    if rest.starts_with('#') || !rest.starts_with([' ', '\t']) {
        return None;
    }
    let text = rest.trim();
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_as_id_when_no_frontmatter_id() {
        let task = parse_task("features/auth/login.md", "# My Task\n\nSome text.\n", "backlog");
        assert_eq!(task.id, "features/auth/login");
    }

    #[test]
    fn test_frontmatter_id_overrides_path() {
        let content = "---\nid: custom-id\n---\n\n# My Task\n";
        let task = parse_task("features/auth/login.md", content, "backlog");
        assert_eq!(task.id, "custom-id");
    }

    #[test]
    fn test_frontmatter_title_wins_over_heading() {
        let content = "---\ntitle: Custom Title\n---\n\n# Heading Title\n\nSome description.\n";
        let task = parse_task("task.md", content, "backlog");
        assert_eq!(task.title, "Custom Title");
        // The heading line is still excluded from the description.
        assert_eq!(task.description, "Some description.");
    }

    #[test]
    fn test_first_heading_becomes_title() {
        let task = parse_task("task.md", "# My Heading Title\n\nSome text.\n", "backlog");
        assert_eq!(task.title, "My Heading Title");
    }

    #[test]
    fn test_title_falls_back_to_id() {
        let task = parse_task("my-task.md", "Just some content without a heading.\n", "backlog");
        assert_eq!(task.title, "my-task");
    }

    #[test]
    fn test_description_is_everything_after_heading() {
        let content = "# The Heading\n\nFirst paragraph.\n\n## Subheading\n\nMore content.\n";
        let task = parse_task("task.md", content, "backlog");
        assert_eq!(
            task.description,
            "First paragraph.\n\n## Subheading\n\nMore content."
        );
    }

    #[test]
    fn test_description_is_whole_body_without_heading() {
        let content = "---\ntitle: My Task\n---\n\nSome content here.\nMore content.\n";
        let task = parse_task("task.md", content, "backlog");
        assert_eq!(task.description, "Some content here.\nMore content.");
    }

    #[test]
    fn test_double_hash_heading_is_not_the_title() {
        let content = "## This is a subheading\n\n# This is the real title\n\nAfter.\n";
        let task = parse_task("task.md", content, "backlog");
        assert_eq!(task.title, "This is the real title");
        assert_eq!(task.description, "After.");
    }

    #[test]
    fn test_dependencies_from_frontmatter_in_order() {
        let content = "---\ndepends:\n  - task-a\n  - task-b\n---\n\n# T\n";
        let task = parse_task("task.md", content, "backlog");
        assert_eq!(task.dependencies, vec!["task-a", "task-b"]);
    }

    #[test]
    fn test_dependencies_default_empty() {
        let task = parse_task("task.md", "# T\n", "backlog");
        assert!(task.dependencies.is_empty());
    }

    #[test]
    fn test_status_defaults() {
        assert_eq!(parse_task("t.md", "# T\n", "backlog").status, "backlog");
        assert_eq!(parse_task("t.md", "# T\n", "todo").status, "todo");
    }

    #[test]
    fn test_frontmatter_status_wins() {
        let content = "---\nstatus: in-progress\n---\n\n# T\n";
        assert_eq!(parse_task("t.md", content, "backlog").status, "in-progress");
    }

    #[test]
    fn test_empty_content_is_still_a_task() {
        let task = parse_task("a/b/c.md", "", "backlog");
        assert_eq!(task.id, "a/b/c");
        assert_eq!(task.title, "a/b/c");
        assert_eq!(task.description, "");
        assert!(task.dependencies.is_empty());
        assert_eq!(task.status, "backlog");
    }

    #[test]
    fn test_frontmatter_only() {
        let content = "---\nid: only-frontmatter\ntitle: Only Frontmatter\ndepends:\n  - dep1\n---\n";
        let task = parse_task("task.md", content, "backlog");
        assert_eq!(task.id, "only-frontmatter");
        assert_eq!(task.title, "Only Frontmatter");
        assert_eq!(task.description, "");
        assert_eq!(task.dependencies, vec!["dep1"]);
    }

    #[test]
    fn test_headerless_file() {
        let task = parse_task("welcome.md", "Welcome to the board!", "backlog");
        assert_eq!(task.id, "welcome");
        assert_eq!(task.title, "welcome");
        assert_eq!(task.description, "Welcome to the board!");
        assert!(task.dependencies.is_empty());
        assert_eq!(task.status, "backlog");
    }

    #[test]
    fn test_all_fields_together() {
        let content = "---\nid: x\nstatus: done\ndependsOn:\n  - y\n---\n\n# Ship it\n\nAll done.\n";
        let task = parse_task("anything.md", content, "backlog");
        assert_eq!(task.id, "x");
        assert_eq!(task.title, "Ship it");
        assert_eq!(task.status, "done");
        assert_eq!(task.dependencies, vec!["y"]);
        assert_eq!(task.description, "All done.");
    }

    #[test]
    fn test_round_trip() {
        let task = Task {
            id: "auth-login".to_string(),
            title: "Implement Login".to_string(),
            description: "Build the login form.\n\n## Requirements\n\n- OAuth support".to_string(),
            dependencies: vec!["setup-db".to_string(), "auth-config".to_string()],
            status: "in-progress".to_string(),
        };
        let rendered = task_to_markdown(&task);
        let reparsed = parse_task("somewhere/else.md", &rendered, "backlog");
        assert_eq!(reparsed, task);
    }

    #[test]
    fn test_round_trip_without_description_or_deps() {
        let task = Task {
            id: "t1".to_string(),
            title: "Bare".to_string(),
            description: String::new(),
            dependencies: Vec::new(),
            status: "todo".to_string(),
        };
        let rendered = task_to_markdown(&task);
        assert!(!rendered.contains("dependsOn"));
        let reparsed = parse_task("t1.md", &rendered, "backlog");
        assert_eq!(reparsed, task);
    }
}
