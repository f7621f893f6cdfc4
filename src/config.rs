//! Layered configuration for the task store.
//!
//! Sources, lowest to highest precedence:
//! - built-in defaults
//! - `taskdeck.toml` (found by searching from the current directory upward)
//! - environment variables
//!
//! # Environment Variables
//!
//! Variables are prefixed with `TASKDECK_` and use double underscores to
//! separate nested levels:
//! - `TASKDECK_TASKS_DIR=./work` sets `tasks_dir`
//! - `TASKDECK_WATCH__DEBOUNCE_MS=250` sets `watch.debounce_ms`

use std::collections::HashMap;
use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

/// Name of the config file searched for in ancestor directories.
pub const CONFIG_FILE: &str = "taskdeck.toml";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Directory holding one markdown file per task.
    #[serde(default = "default_tasks_dir")]
    pub tasks_dir: PathBuf,

    /// File extension recognized as a task file.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Status assigned when a file's header has none.
    #[serde(default = "default_status")]
    pub default_status: String,

    /// Board columns, in display order. Consumers group tasks by status
    /// against this list; the store itself does not validate against it.
    #[serde(default = "default_columns")]
    pub columns: Vec<String>,

    /// Reserved filenames never indexed, compared case-insensitively.
    #[serde(default = "default_excluded_files")]
    pub excluded_files: Vec<String>,

    /// Watcher settings.
    #[serde(default)]
    pub watch: WatchConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WatchConfig {
    /// Quiet window before a burst of change events triggers a reload.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default log level (error, warn, info, debug, trace).
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module level overrides.
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

// Default value functions
fn default_tasks_dir() -> PathBuf {
    PathBuf::from("tasks")
}
fn default_extension() -> String {
    "md".to_string()
}
fn default_status() -> String {
    "backlog".to_string()
}
fn default_columns() -> Vec<String> {
    ["backlog", "todo", "in-progress", "done"]
        .map(String::from)
        .to_vec()
}
fn default_excluded_files() -> Vec<String> {
    ["README.md", "AGENTS.md", "CLAUDE.md"]
        .map(String::from)
        .to_vec()
}
fn default_debounce_ms() -> u64 {
    100
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tasks_dir: default_tasks_dir(),
            extension: default_extension(),
            default_status: default_status(),
            columns: default_columns(),
            excluded_files: default_excluded_files(),
            watch: WatchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path =
            Self::find_config_file().unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            // Double underscore separates nested levels; single underscores
            // stay part of the field name.
            .merge(Env::prefixed("TASKDECK_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(Box::new)
    }

    /// Find `taskdeck.toml` by searching from the current directory upward.
    pub fn find_config_file() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        for ancestor in current.ancestors() {
            let candidate = ancestor.join(CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }

    /// Save current configuration to file.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        std::fs::write(path, toml_string)
    }

    /// Write a default `taskdeck.toml` in the current directory.
    pub fn init_config_file(force: bool) -> std::io::Result<PathBuf> {
        let config_path = PathBuf::from(CONFIG_FILE);
        if !force && config_path.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "configuration file already exists, use --force to overwrite",
            ));
        }
        Settings::default().save(&config_path)?;
        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.tasks_dir, PathBuf::from("tasks"));
        assert_eq!(settings.extension, "md");
        assert_eq!(settings.default_status, "backlog");
        assert_eq!(settings.watch.debounce_ms, 100);
        assert_eq!(settings.columns.len(), 4);
        assert!(settings.excluded_files.contains(&"README.md".to_string()));
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("taskdeck.toml");

        let toml_content = r#"
tasks_dir = "work-items"
default_status = "todo"

[watch]
debounce_ms = 250

[logging]
default = "debug"
"#;
        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.tasks_dir, PathBuf::from("work-items"));
        assert_eq!(settings.default_status, "todo");
        assert_eq!(settings.watch.debounce_ms, 250);
        assert_eq!(settings.logging.default, "debug");
        // Unset fields fall back to defaults.
        assert_eq!(settings.extension, "md");
        assert_eq!(settings.columns.len(), 4);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("taskdeck.toml");

        let mut settings = Settings::default();
        settings.default_status = "todo".to_string();
        settings.watch.debounce_ms = 42;
        settings.save(&config_path).unwrap();

        let loaded = Settings::load_from(&config_path).unwrap();
        assert_eq!(loaded.default_status, "todo");
        assert_eq!(loaded.watch.debounce_ms, 42);
    }
}
