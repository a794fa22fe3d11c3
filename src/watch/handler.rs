//! Folder watch handler.
//! One per monitored folder. Events are split in two phases:
//! - `prepare` runs on the delivery thread in arrival order: it records deletions,
//!   applies the state/directory/exclusion filters and pairs creates with recent
//!   deletions in the same directory.
//! - `run` executes the resulting task (bounded retry around the mover) and may
//!   sleep, so the supervisor runs it on the folder's worker pool.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::category::CategoryTable;
use crate::config::{FolderConfig, WatchTuning};
use crate::errors::OrganizeError;
use crate::fs_ops::{organize_file, MoveOutcome};
use crate::placement::{is_within, normalize_path};
use crate::platform::{has_access, Access};
use crate::sink::LogSink;

use super::pending::PendingDeletions;
use super::source::FsEvent;

/// Longest single sleep while waiting between attempts; bounds stop latency.
const WAIT_SLICE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    Running,
    Paused,
    /// Terminal; a new handler is needed to watch again.
    Stopped,
}

/// Work left after filtering one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// New file; `renamed_from` is set when it was paired with a recent deletion.
    Created { path: PathBuf, renamed_from: Option<PathBuf> },
    Renamed { from: PathBuf, to: PathBuf },
}

enum Step {
    Done,
    Retry,
}

pub struct FolderWatchHandler {
    root: PathBuf,
    recursive: bool,
    exclusions: Vec<PathBuf>,
    categories: Arc<CategoryTable>,
    organize_by_date: bool,
    tuning: WatchTuning,
    sink: LogSink,
    running: AtomicBool,
    paused: AtomicBool,
    pending: Mutex<PendingDeletions>,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl FolderWatchHandler {
    pub fn new(
        folder: &FolderConfig,
        categories: Arc<CategoryTable>,
        organize_by_date: bool,
        tuning: WatchTuning,
        sink: LogSink,
    ) -> Self {
        debug!(
            root = %folder.path.display(),
            recursive = folder.recursive,
            exclusions = ?folder.exclusions,
            organize_by_date,
            "initialized handler"
        );
        Self {
            root: folder.path.clone(),
            recursive: folder.recursive,
            exclusions: folder.exclusions.iter().map(|e| normalize_path(e)).collect(),
            categories,
            organize_by_date,
            tuning,
            sink,
            running: AtomicBool::new(true),
            paused: AtomicBool::new(false),
            pending: Mutex::new(PendingDeletions::new(tuning.rename_window)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn recursive(&self) -> bool {
        self.recursive
    }

    pub fn state(&self) -> HandlerState {
        if !self.running.load(Ordering::SeqCst) {
            HandlerState::Stopped
        } else if self.paused.load(Ordering::SeqCst) {
            HandlerState::Paused
        } else {
            HandlerState::Running
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn pause(&self) {
        if self.is_running() && !self.paused.swap(true, Ordering::SeqCst) {
            debug!(root = %self.root.display(), "Paused handler");
            self.report(format!("Paused watching {}", self.root.display()));
        }
    }

    pub fn resume(&self) {
        if self.is_running() && self.paused.swap(false, Ordering::SeqCst) {
            debug!(root = %self.root.display(), "Resumed handler");
            self.report(format!("Resumed watching {}", self.root.display()));
        }
    }

    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!(root = %self.root.display(), "Handler stopped");
        }
    }

    /// True when `path` lies under one of the configured exclusions.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclusions.iter().any(|e| is_within(path, e))
    }

    /// True if a deletion of `path` is still waiting to be paired.
    pub fn has_pending_deletion(&self, path: &Path) -> bool {
        self.pending.lock().map(|p| p.contains(path)).unwrap_or(false)
    }

    fn report(&self, line: String) {
        (self.sink)(&line);
    }

    fn drop_reason(&self, is_dir: bool) -> Option<&'static str> {
        match self.state() {
            HandlerState::Stopped => Some("stopped"),
            HandlerState::Paused => Some("paused"),
            HandlerState::Running if is_dir => Some("directory"),
            HandlerState::Running => None,
        }
    }

    /// Filter and correlate one event. Must be called in arrival order.
    pub fn prepare(&self, event: FsEvent) -> Option<Task> {
        match event {
            FsEvent::Deleted { path, is_dir } => {
                if !is_dir {
                    debug!(file = %file_name(&path), "tracked deletion for rename detection");
                    if let Ok(mut pending) = self.pending.lock() {
                        pending.record(path, Instant::now());
                    }
                }
                None
            }
            FsEvent::Created { path, is_dir } => {
                if let Some(reason) = self.drop_reason(is_dir) {
                    self.report(format!("Skipped create event for {}: {reason}", path.display()));
                    return None;
                }
                if self.is_excluded(&path) {
                    self.report(format!("Skipped {}: in excluded folder", file_name(&path)));
                    return None;
                }
                debug!(file = %file_name(&path), root = %self.root.display(), "Detected create event");
                let renamed_from = self
                    .pending
                    .lock()
                    .ok()
                    .and_then(|mut p| p.take_rename_source(&path, Instant::now()));
                Some(Task::Created { path, renamed_from })
            }
            FsEvent::Renamed { from, to, is_dir } => {
                if let Some(reason) = self.drop_reason(is_dir) {
                    self.report(format!("Skipped rename event for {}: {reason}", from.display()));
                    return None;
                }
                if self.is_excluded(&to) {
                    self.report(format!("Skipped {}: in excluded folder", file_name(&to)));
                    return None;
                }
                debug!(
                    file = %file_name(&to),
                    from = %file_name(&from),
                    root = %self.root.display(),
                    "Detected rename event"
                );
                Some(Task::Renamed { from, to })
            }
            FsEvent::Other(what) => {
                debug!(root = %self.root.display(), event = %what, "ignored event");
                None
            }
        }
    }

    /// Process a prepared task, retrying transient failures.
    pub fn run(&self, task: Task) {
        match task {
            Task::Created { path, renamed_from } => self.process_created(&path, renamed_from.as_deref()),
            Task::Renamed { from, to } => self.process_renamed(&from, &to),
        }
    }

    /// `prepare` then `run` on the calling thread.
    pub fn handle_event(&self, event: FsEvent) {
        if let Some(task) = self.prepare(event) {
            self.run(task);
        }
    }

    fn process_created(&self, path: &Path, renamed_from: Option<&Path>) {
        let name = file_name(path);
        let prefix = renamed_from.map(|old| format!("Renamed {} to {name}: ", file_name(old)));
        for attempt in 1..=self.tuning.max_attempts {
            if !self.is_running() {
                debug!(file = %name, attempt, "handler stopped; abandoning");
                return;
            }
            let step = if path.is_file() {
                self.attempt_organize(path, prefix.as_deref())
            } else {
                debug!(file = %name, attempt, "Skipped: file not ready");
                self.report(format!("Attempt {attempt}: Skipped {name}: file not ready"));
                Step::Retry
            };
            match step {
                Step::Done => return,
                Step::Retry => self.wait_before(attempt),
            }
        }
        self.exhausted("created", &name);
    }

    fn process_renamed(&self, from: &Path, to: &Path) {
        let name = file_name(to);
        let prefix = format!("Renamed {} to {name}: ", file_name(from));
        for attempt in 1..=self.tuning.max_attempts {
            if !self.is_running() {
                debug!(file = %name, attempt, "handler stopped; abandoning");
                return;
            }
            debug!(file = %to.display(), attempt, "checking rename target");
            let step = if !to.exists() {
                debug!(file = %name, "Rename target does not exist");
                self.report(format!("Skipped {name}: rename target does not exist"));
                Step::Done
            } else if !to.is_file() {
                debug!(file = %name, attempt, "Skipped: not a file");
                self.report(format!("Attempt {attempt}: Skipped {name}: not a file"));
                Step::Retry
            } else if !has_access(to, Access::ReadWrite) {
                debug!(file = %name, "Permission error: no read/write access");
                self.report(format!(
                    "Permission error for {name}: no read/write access. Try running as administrator."
                ));
                Step::Retry
            } else {
                self.attempt_organize(to, Some(&prefix))
            };
            match step {
                Step::Done => return,
                Step::Retry => self.wait_before(attempt),
            }
        }
        self.exhausted("renamed", &name);
    }

    fn attempt_organize(&self, path: &Path, prefix: Option<&str>) -> Step {
        let outcome: MoveOutcome = organize_file(path, &self.root, &self.categories, self.organize_by_date);
        let line = match prefix {
            Some(p) => format!("{p}{}", outcome.message),
            None => outcome.message.clone(),
        };
        self.report(line);
        match &outcome.failure {
            None => {
                debug!(file = %path.display(), message = %outcome.message, "processed");
                Step::Done
            }
            Some(OrganizeError::SourceVanished(_)) => Step::Done,
            Some(e) if e.is_retryable() => Step::Retry,
            Some(_) => Step::Done,
        }
    }

    fn exhausted(&self, what: &str, name: &str) {
        let line = format!(
            "Failed to process {what} file {name} after {} attempts",
            self.tuning.max_attempts
        );
        debug!(root = %self.root.display(), "{line}");
        self.report(line);
    }

    /// Sleep the retry delay unless this was the last attempt; wakes early on stop.
    fn wait_before(&self, attempt: u32) {
        if attempt >= self.tuning.max_attempts {
            return;
        }
        let deadline = Instant::now() + self.tuning.retry_delay;
        while self.is_running() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep((deadline - now).min(WAIT_SLICE));
        }
    }
}
