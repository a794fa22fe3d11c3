//! Watch supervisor.
//! Starts one subscription, delivery thread and worker pool per folder, and tears
//! them down again. A folder that cannot be watched is reported and skipped; the
//! others still start.

use rayon::{ThreadPool, ThreadPoolBuilder};
use std::path::Path;
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::category::CategoryTable;
use crate::config::validate::is_valid_folder_path;
use crate::config::{prepare_watch_root, FolderConfig, RootState, WatchTuning};
use crate::errors::OrganizeError;
use crate::sink::LogSink;

use super::handler::{FolderWatchHandler, HandlerState};
use super::source::{EventSource, Subscription};

/// How often the delivery thread re-checks the running flag while idle.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Runtime handle of one watched folder. Dropping it stops the watch.
pub struct WatchHandle {
    handler: Arc<FolderWatchHandler>,
    worker: Option<JoinHandle<()>>,
}

impl WatchHandle {
    pub fn root(&self) -> &Path {
        self.handler.root()
    }

    pub fn handler(&self) -> &Arc<FolderWatchHandler> {
        &self.handler
    }

    pub fn state(&self) -> HandlerState {
        self.handler.state()
    }

    pub fn pause(&self) {
        self.handler.pause();
    }

    pub fn resume(&self) {
        self.handler.resume();
    }

    /// Stop delivery and wait until no task of this folder is still running.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.handler.stop();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!(root = %self.handler.root().display(), "delivery thread panicked");
            }
            debug!(root = %self.handler.root().display(), "delivery thread joined");
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Start watching every folder in `folders`. Returns the handles that started;
/// callers compare them with the request to spot partial failures.
pub fn start(
    folders: &[FolderConfig],
    categories: Arc<CategoryTable>,
    sink: LogSink,
    organize_by_date: bool,
    tuning: WatchTuning,
    source: &dyn EventSource,
) -> Vec<WatchHandle> {
    let mut handles = Vec::new();

    for folder in folders {
        let path = &folder.path;
        if !is_valid_folder_path(path) {
            debug!(folder = %path.display(), "Invalid folder path");
            sink(&format!("Invalid folder path: {}", path.display()));
            continue;
        }

        match prepare_watch_root(path) {
            Ok(RootState::Created) => sink(&format!("Created folder {}", path.display())),
            Ok(RootState::Existing) => {}
            Err(OrganizeError::PermissionDenied { .. }) => {
                debug!(folder = %path.display(), "No read/write access to folder");
                sink(&format!(
                    "No read/write access to folder {}. Try running as administrator.",
                    path.display()
                ));
                continue;
            }
            Err(e) => {
                debug!(code = e.code(), folder = %path.display(), "{e}");
                sink(&format!("Error starting watcher for {}: {e}", path.display()));
                continue;
            }
        }

        match start_one(folder, Arc::clone(&categories), Arc::clone(&sink), organize_by_date, tuning, source) {
            Ok(handle) => {
                debug!(folder = %path.display(), recursive = folder.recursive, "Started file watcher");
                sink(&format!(
                    "Started file watcher for {} (recursive={})",
                    path.display(),
                    folder.recursive
                ));
                handles.push(handle);
            }
            Err(e) => {
                debug!(code = e.code(), kind = e.kind(), folder = %path.display(), "{e}");
                sink(&format!("Error starting watcher for {}: {e}", path.display()));
            }
        }
    }

    if handles.is_empty() {
        debug!("No watchers started for any folders");
        sink("Warning: No watchers started. Check folder paths and permissions.");
    }
    handles
}

/// Stop every handle, waiting for each folder's in-flight work. Safe on an empty list.
pub fn stop(handles: Vec<WatchHandle>) {
    if handles.is_empty() {
        return;
    }
    for handle in handles {
        handle.stop();
    }
    info!("Stopped all file watchers");
}

fn start_one(
    folder: &FolderConfig,
    categories: Arc<CategoryTable>,
    sink: LogSink,
    organize_by_date: bool,
    tuning: WatchTuning,
    source: &dyn EventSource,
) -> Result<WatchHandle, OrganizeError> {
    let watch_start = |reason: String| OrganizeError::WatchStart {
        path: folder.path.clone(),
        reason,
    };

    let pool = ThreadPoolBuilder::new()
        .num_threads(tuning.workers.max(1))
        .thread_name(|i| format!("tidy-watch-task-{i}"))
        .build()
        .map_err(|e| watch_start(e.to_string()))?;
    let subscription = source.subscribe(&folder.path, folder.recursive)?;
    let handler = Arc::new(FolderWatchHandler::new(folder, categories, organize_by_date, tuning, sink));

    let delivery_handler = Arc::clone(&handler);
    let worker = thread::Builder::new()
        .name("tidy-watch-delivery".into())
        .spawn(move || deliver(delivery_handler, subscription, pool))
        .map_err(|e| watch_start(e.to_string()))?;

    Ok(WatchHandle {
        handler,
        worker: Some(worker),
    })
}

/// Delivery loop of one folder. Events are prepared in order on this thread; the
/// resulting tasks run on `pool`. The scope only returns once every spawned task has
/// finished, so joining this thread leaves nothing running.
fn deliver(handler: Arc<FolderWatchHandler>, subscription: Subscription, pool: ThreadPool) {
    pool.in_place_scope(|scope| {
        while handler.is_running() {
            match subscription.recv_timeout(POLL_INTERVAL) {
                Ok(event) => {
                    if let Some(task) = handler.prepare(event) {
                        let h = Arc::clone(&handler);
                        scope.spawn(move |_| h.run(task));
                    }
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    warn!(root = %handler.root().display(), "Event stream closed");
                    break;
                }
            }
        }
    });
    drop(subscription);
    debug!(root = %handler.root().display(), "delivery finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::default_categories;
    use crate::sink::MemorySink;
    use crate::watch::source::ChannelSource;

    #[test]
    fn stop_on_empty_list_is_a_no_op() {
        stop(Vec::new());
    }

    #[test]
    fn relative_folder_is_rejected_and_warned() {
        let mem = MemorySink::new();
        let source = ChannelSource::new();
        let handles = start(
            &[FolderConfig::new("relative/inbox")],
            Arc::new(default_categories()),
            mem.sink(),
            false,
            WatchTuning::default(),
            &source,
        );
        assert!(handles.is_empty());
        assert!(mem.contains("Invalid folder path: relative/inbox"));
        assert!(mem.contains("Warning: No watchers started"));
        assert_eq!(source.subscriptions(), 0);
    }
}
