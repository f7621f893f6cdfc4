use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use taskdeck::{NewTask, Settings, TaskPatch, TaskStore};

#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(about = "File-backed task tracking over a directory of markdown files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default taskdeck.toml in the current directory
    Init {
        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// List tasks
    List {
        /// Only show tasks with this status
        #[arg(short, long)]
        status: Option<String>,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one task
    Show { id: String },

    /// Create a task
    Add {
        title: String,

        /// Task body text
        #[arg(short, long, default_value = "")]
        description: String,

        /// Status column (defaults to the configured default status)
        #[arg(short, long)]
        status: Option<String>,

        /// Id of a task this one depends on (repeatable)
        #[arg(long = "depends", value_name = "ID")]
        dependencies: Vec<String>,

        /// Explicit id (defaults to a fresh task-<millis> id)
        #[arg(long)]
        id: Option<String>,
    },

    /// Move a task to another status column
    SetStatus { id: String, status: String },

    /// Watch the tasks directory and log every change until interrupted
    Watch,
}

/// Load configuration, initialize logging, and scan the tasks directory.
/// Every command except `init` starts here.
fn open_store() -> Result<Arc<TaskStore>> {
    let settings = Settings::load().map_err(|e| anyhow::anyhow!(e))?;
    taskdeck::logging::init_with_config(&settings.logging);

    let store = Arc::new(TaskStore::new(Arc::new(settings)));
    store
        .load()
        .context("failed to load tasks (run `taskdeck init` and create the tasks directory?)")?;
    Ok(store)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            let path = Settings::init_config_file(force)?;
            println!("Created {}", path.display());
        }

        Commands::List { status, json } => {
            let store = open_store()?;
            let mut tasks = store.get_all();
            if let Some(status) = status {
                tasks.retain(|t| t.status == status);
            }
            tasks.sort_by(|a, b| a.id.cmp(&b.id));

            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else {
                for task in &tasks {
                    println!("{:<12} {:<24} {}", task.status, task.id, task.title);
                }
            }
        }

        Commands::Show { id } => {
            let store = open_store()?;
            let Some(task) = store.get(&id) else {
                bail!("no task with id '{id}'");
            };
            println!("id:     {}", task.id);
            println!("title:  {}", task.title);
            println!("status: {}", task.status);
            if !task.dependencies.is_empty() {
                println!("deps:   {}", task.dependencies.join(", "));
            }
            if !task.description.is_empty() {
                println!("\n{}", task.description);
            }
        }

        Commands::Add {
            title,
            description,
            status,
            dependencies,
            id,
        } => {
            let store = open_store()?;
            let task = store.create(NewTask {
                id,
                title,
                description,
                dependencies,
                status,
            })?;
            println!("Created {}", task.id);
        }

        Commands::SetStatus { id, status } => {
            let store = open_store()?;
            let patch = TaskPatch {
                status: Some(status),
                ..TaskPatch::default()
            };
            match store.update(&id, patch)? {
                Some(task) => println!("{} -> {}", task.id, task.status),
                None => bail!("no task with id '{id}'"),
            }
        }

        Commands::Watch => {
            let store = open_store()?;
            let mut changes = store.subscribe();
            let handle = store.watch()?;
            println!(
                "Watching {} ({} tasks). Ctrl-C to stop.",
                store.settings().tasks_dir.display(),
                store.len()
            );

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    received = changes.recv() => match received {
                        Ok(snapshot) => println!("changed: {} tasks", snapshot.len()),
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                            eprintln!("missed {n} change notifications");
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
            handle.shutdown().await;
        }
    }

    Ok(())
}
