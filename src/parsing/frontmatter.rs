//! Line-oriented frontmatter parsing.
//!
//! The header grammar is deliberately small: a `---` delimiter line at the
//! very start of the file, `key: value` scalar lines, and indented `- item`
//! lists under a key whose value line is empty. Anything richer belongs in
//! the body.

/// Recognized header fields. Unrecognized keys parse but are dropped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Frontmatter {
    pub id: Option<String>,
    pub title: Option<String>,
    pub status: Option<String>,
    pub dependencies: Option<Vec<String>>,
    /// Whether `dependencies` came from the canonical `dependsOn` key.
    /// When both spellings appear, `dependsOn` wins.
    deps_canonical: bool,
}

/// Split `content` into its frontmatter fields and the remaining body.
///
/// A missing or unterminated header is not an error: the whole content is
/// returned as the body and every field is absent. The body is trimmed of
/// leading and trailing blank lines.
pub fn parse_frontmatter(content: &str) -> (Frontmatter, &str) {
    let mut attrs = Frontmatter::default();

    let Some(open_end) = content.find('\n') else {
        return (attrs, content.trim());
    };
    if content[..open_end].trim_end() != "---" {
        return (attrs, content.trim());
    }

    // Locate the closing delimiter line. A dangling opener consumes nothing.
    let header_start = open_end + 1;
    let mut pos = header_start;
    let mut span: Option<(usize, usize)> = None;
    while pos < content.len() {
        let line_end = content[pos..].find('\n').map(|i| pos + i);
        let line = match line_end {
            Some(end) => &content[pos..end],
            None => &content[pos..],
        };
        if line.trim_end() == "---" {
            let body_start = line_end.map(|end| end + 1).unwrap_or(content.len());
            span = Some((pos, body_start));
            break;
        }
        match line_end {
            Some(end) => pos = end + 1,
            None => break,
        }
    }
    let Some((header_end, body_start)) = span else {
        return (attrs, content.trim());
    };

    parse_header_lines(&content[header_start..header_end], &mut attrs);

    (attrs, content[body_start..].trim())
}

fn parse_header_lines(header: &str, attrs: &mut Frontmatter) {
    let mut pending_key: Option<&str> = None;
    let mut pending_list: Vec<String> = Vec::new();

    for line in header.lines() {
        if let Some(item) = list_item(line) {
            // Items without an open list are ignored.
            if pending_key.is_some() {
                pending_list.push(item.to_string());
            }
            continue;
        }

        // Any non-item line closes an in-progress list.
        if let Some(key) = pending_key.take() {
            commit_list(attrs, key, std::mem::take(&mut pending_list));
        }

        if let Some((key, value)) = key_line(line) {
            if value.is_empty() {
                pending_key = Some(key);
            } else {
                set_scalar(attrs, key, value);
            }
        }
    }

    if let Some(key) = pending_key {
        commit_list(attrs, key, pending_list);
    }
}

/// Match `  - text`, returning the trimmed item text.
fn list_item(line: &str) -> Option<&str> {
    if !line.starts_with([' ', '\t']) {
        return None;
    }
    let rest = line.trim_start().strip_prefix('-')?;
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    let item = rest.trim();
    (!item.is_empty()).then_some(item)
}

/// Match `key: value` at the start of a line, with a word-character key.
fn key_line(line: &str) -> Option<(&str, &str)> {
    let (key, rest) = line.split_once(':')?;
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some((key, rest.trim()))
}

fn set_scalar(attrs: &mut Frontmatter, key: &str, value: &str) {
    match key {
        "id" => attrs.id = Some(value.to_string()),
        "title" => attrs.title = Some(value.to_string()),
        "status" => attrs.status = Some(value.to_string()),
        _ => {}
    }
}

fn commit_list(attrs: &mut Frontmatter, key: &str, items: Vec<String>) {
    if items.is_empty() {
        return;
    }
    match key {
        "dependsOn" => {
            attrs.dependencies = Some(items);
            attrs.deps_canonical = true;
        }
        "depends" if !attrs.deps_canonical => attrs.dependencies = Some(items),
        _ => {}
    }
}
