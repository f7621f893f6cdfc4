//! Pure content parsing: file text in, structured record out.
//!
//! Nothing in this module touches the filesystem. The store hands it a
//! relative path and the file's content; it hands back a [`Task`](crate::Task).

mod frontmatter;
mod task;

pub use frontmatter::{Frontmatter, parse_frontmatter};
pub use task::{parse_task, task_to_markdown};
