//! Directory watch loop: filesystem events in, debounced reloads out.
//!
//! The notify backend delivers raw events on its own thread; they are
//! forwarded over a channel into a tokio task that only ever feeds the
//! debouncer. When a burst quiesces, the task runs a full `load()` and
//! publishes one snapshot, on the same serialization point (the index
//! write lock) used by direct mutations. Handling an event never blocks
//! on an in-flight reload.

use std::sync::Arc;

use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, sleep};
use tokio_util::sync::CancellationToken;

use crate::store::TaskStore;

use super::debouncer::Debouncer;
use super::error::WatchError;

/// How often the loop polls the debouncer for a quiesced burst.
const TICK_MS: u64 = 25;

/// Running watch over a store's tasks directory.
///
/// Dropping the handle detaches the watch task; call [`shutdown`] to stop
/// it cleanly, cancelling any in-flight debounce window.
///
/// [`shutdown`]: WatchHandle::shutdown
pub struct WatchHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl WatchHandle {
    /// Stop watching and wait for the watch task to finish.
    pub async fn shutdown(self) {
        self.token.cancel();
        let _ = self.task.await;
    }
}

impl TaskStore {
    /// Begin watching the tasks directory tree for changes.
    ///
    /// Qualifying events (paths with the recognized extension) reset the
    /// debounce window; once a burst quiesces the store reloads and all
    /// subscribers receive one snapshot. Must be called from within a
    /// tokio runtime. Establishment failure is surfaced here once; the
    /// store keeps working through `load()` and mutations without a watch.
    pub fn watch(self: &Arc<Self>) -> Result<WatchHandle, WatchError> {
        let root = self.settings().tasks_dir.clone();
        let (tx, rx) = mpsc::channel(256);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.blocking_send(res);
        })?;
        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| WatchError::PathWatchFailed {
                path: root.clone(),
                reason: e.to_string(),
            })?;

        crate::log_event!("watcher", "watching", "{}", root.display());

        let token = CancellationToken::new();
        let task = tokio::spawn(run_watch_loop(
            Arc::clone(self),
            watcher,
            rx,
            token.clone(),
        ));

        Ok(WatchHandle { token, task })
    }
}

async fn run_watch_loop(
    store: Arc<TaskStore>,
    _watcher: notify::RecommendedWatcher,
    mut events: mpsc::Receiver<notify::Result<Event>>,
    token: CancellationToken,
) {
    let mut debouncer = Debouncer::new(store.settings().watch.debounce_ms);

    loop {
        let tick = sleep(Duration::from_millis(TICK_MS));
        tokio::pin!(tick);

        tokio::select! {
            _ = token.cancelled() => {
                crate::debug_event!("watcher", "stopped");
                break;
            }

            maybe = events.recv() => {
                match maybe {
                    Some(Ok(event)) => {
                        // Reads emit Access events, including the store's own
                        // reload reading every file. Only content-changing
                        // kinds qualify, or each reload would arm the next.
                        let changes_content = matches!(
                            event.kind,
                            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                        );
                        if changes_content
                            && event.paths.iter().any(|p| store.matches_extension(p))
                        {
                            debouncer.record();
                        }
                    }
                    Some(Err(e)) => {
                        tracing::error!("[watcher] file watch error: {e}");
                    }
                    None => {
                        tracing::warn!("[watcher] event channel closed");
                        break;
                    }
                }
            }

            _ = &mut tick => {
                if debouncer.take_ready() {
                    match store.load() {
                        Ok(count) => {
                            crate::log_event!("watcher", "reloaded", "{count} tasks");
                            store.publish();
                        }
                        Err(e) => {
                            tracing::error!("[watcher] reload failed: {e}");
                        }
                    }
                }
            }
        }
    }
}
