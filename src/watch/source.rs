//! Change-notification sources.
//! A source turns "watch path P (recursively or not)" into a typed stream of
//! [`FsEvent`]s. `NotifySource` is backed by the `notify` crate; `ChannelSource`
//! lets callers inject events by hand.

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

use crate::errors::OrganizeError;

/// One change notification, already classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsEvent {
    Created { path: PathBuf, is_dir: bool },
    Deleted { path: PathBuf, is_dir: bool },
    Renamed { from: PathBuf, to: PathBuf, is_dir: bool },
    /// Anything not acted upon (attribute changes, writes, half rename pairs).
    Other(String),
}

/// A live event stream. Dropping it ends the underlying watch.
pub struct Subscription {
    events: Receiver<FsEvent>,
    _guard: Box<dyn Send>,
}

impl Subscription {
    /// Wrap a receiver together with whatever keeps its sender alive.
    pub fn new(events: Receiver<FsEvent>, guard: impl Send + 'static) -> Self {
        Self {
            events,
            _guard: Box::new(guard),
        }
    }

    /// Subscription fed by the caller through the returned sender.
    pub fn channel() -> (mpsc::Sender<FsEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self::new(rx, ()))
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<FsEvent, RecvTimeoutError> {
        self.events.recv_timeout(timeout)
    }
}

/// Capability to subscribe to change events below a directory.
pub trait EventSource: Send + Sync {
    fn subscribe(&self, path: &Path, recursive: bool) -> Result<Subscription, OrganizeError>;
}

/// OS-native notifications through `notify::recommended_watcher`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifySource;

impl EventSource for NotifySource {
    fn subscribe(&self, path: &Path, recursive: bool) -> Result<Subscription, OrganizeError> {
        let (tx, rx) = mpsc::channel();
        let root = path.to_path_buf();
        let mut translator = Translator::new();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for ev in translator.translate(event) {
                    // Receiver gone means the watch is being torn down.
                    if tx.send(ev).is_err() {
                        return;
                    }
                }
            }
            Err(e) => warn!(root = %root.display(), error = %e, "Watch error"),
        })
        .map_err(|e| OrganizeError::WatchStart {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(path, mode).map_err(|e| OrganizeError::WatchStart {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!(path = %path.display(), recursive, "notify watcher registered");
        Ok(Subscription::new(rx, watcher))
    }
}

/// Source whose events are injected by the caller, one channel per subscription.
#[derive(Default)]
pub struct ChannelSource {
    senders: Mutex<Vec<(PathBuf, mpsc::Sender<FsEvent>)>>,
    refused: Mutex<Vec<PathBuf>>,
}

impl ChannelSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make later subscriptions for `path` fail with `WatchStart`.
    pub fn refuse(&self, path: impl Into<PathBuf>) {
        if let Ok(mut r) = self.refused.lock() {
            r.push(path.into());
        }
    }

    /// Deliver `event` to the newest live subscription for `root`.
    /// Returns false when nobody is listening.
    pub fn send(&self, root: &Path, event: FsEvent) -> bool {
        let Ok(senders) = self.senders.lock() else {
            return false;
        };
        senders
            .iter()
            .rev()
            .filter(|(p, _)| p == root)
            .any(|(_, tx)| tx.send(event.clone()).is_ok())
    }

    /// Number of subscriptions handed out so far.
    pub fn subscriptions(&self) -> usize {
        self.senders.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl EventSource for ChannelSource {
    fn subscribe(&self, path: &Path, _recursive: bool) -> Result<Subscription, OrganizeError> {
        let refused = self
            .refused
            .lock()
            .map(|r| r.iter().any(|p| p == path))
            .unwrap_or(false);
        if refused {
            return Err(OrganizeError::WatchStart {
                path: path.to_path_buf(),
                reason: "subscription refused".into(),
            });
        }
        let (tx, sub) = Subscription::channel();
        if let Ok(mut senders) = self.senders.lock() {
            senders.push((path.to_path_buf(), tx));
        }
        Ok(sub)
    }
}

/// Rename cookies remembered per subscription.
const MAX_TRACKED_RENAMES: usize = 64;

/// Classifies raw `notify` events for one subscription.
///
/// inotify reports a rename inside the watched tree as a `From` half, a `To` half
/// (sharing a tracker) and then a `Both` event; only `Both` is kept. A `To` half whose
/// tracker was never seen on a `From` half is a move in from outside the tree and
/// reads as a create. Backends without a tracker report the halves alone, which read
/// as delete and create and go through rename correlation.
#[derive(Debug, Default)]
pub struct Translator {
    seen_from: VecDeque<usize>,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(&mut self, event: Event) -> Vec<FsEvent> {
        let tracker = event.attrs.tracker();
        match event.kind {
            EventKind::Create(kind) => event
                .paths
                .into_iter()
                .map(|path| {
                    let is_dir = matches!(kind, CreateKind::Folder) || path.is_dir();
                    FsEvent::Created { path, is_dir }
                })
                .collect(),
            EventKind::Remove(kind) => event
                .paths
                .into_iter()
                .map(|path| FsEvent::Deleted {
                    path,
                    is_dir: matches!(kind, RemoveKind::Folder),
                })
                .collect(),
            EventKind::Modify(ModifyKind::Name(mode)) => self.rename_events(mode, event.paths, tracker),
            other => vec![FsEvent::Other(format!("{other:?} {:?}", event.paths))],
        }
    }

    fn remember_from(&mut self, tracker: usize) {
        if self.seen_from.len() >= MAX_TRACKED_RENAMES {
            self.seen_from.pop_front();
        }
        self.seen_from.push_back(tracker);
    }

    /// True (and forgotten) if `tracker` was seen on a `From` half.
    fn take_from(&mut self, tracker: usize) -> bool {
        match self.seen_from.iter().position(|t| *t == tracker) {
            Some(i) => {
                self.seen_from.remove(i);
                true
            }
            None => false,
        }
    }

    fn rename_events(&mut self, mode: RenameMode, paths: Vec<PathBuf>, tracker: Option<usize>) -> Vec<FsEvent> {
        match (mode, tracker) {
            (RenameMode::Both, _) if paths.len() == 2 => {
                let mut it = paths.into_iter();
                match (it.next(), it.next()) {
                    (Some(from), Some(to)) => {
                        let is_dir = to.is_dir();
                        vec![FsEvent::Renamed { from, to, is_dir }]
                    }
                    _ => Vec::new(),
                }
            }
            (RenameMode::From, Some(t)) => {
                self.remember_from(t);
                vec![FsEvent::Other(format!("From half of tracked rename {paths:?}"))]
            }
            (RenameMode::To, Some(t)) if self.take_from(t) => {
                vec![FsEvent::Other(format!("To half of tracked rename {paths:?}"))]
            }
            (RenameMode::From, None) => paths
                .into_iter()
                .map(|path| FsEvent::Deleted { path, is_dir: false })
                .collect(),
            (RenameMode::To, _) => paths
                .into_iter()
                .map(|path| {
                    let is_dir = path.is_dir();
                    FsEvent::Created { path, is_dir }
                })
                .collect(),
            _ => paths
                .into_iter()
                .map(|path| {
                    if path.exists() {
                        let is_dir = path.is_dir();
                        FsEvent::Created { path, is_dir }
                    } else {
                        FsEvent::Deleted { path, is_dir: false }
                    }
                })
                .collect(),
        }
    }
}

/// Classify a single event with no rename history.
pub fn translate(event: Event) -> Vec<FsEvent> {
    Translator::new().translate(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{DataChange, EventAttributes};

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        Event {
            kind,
            paths: paths.iter().map(PathBuf::from).collect(),
            attrs: EventAttributes::new(),
        }
    }

    #[test]
    fn file_create_and_remove_map_directly() {
        let created = translate(event(EventKind::Create(CreateKind::File), &["/nowhere/a.txt"]));
        assert_eq!(
            created,
            vec![FsEvent::Created {
                path: PathBuf::from("/nowhere/a.txt"),
                is_dir: false
            }]
        );
        let removed = translate(event(EventKind::Remove(RemoveKind::Folder), &["/nowhere/d"]));
        assert_eq!(
            removed,
            vec![FsEvent::Deleted {
                path: PathBuf::from("/nowhere/d"),
                is_dir: true
            }]
        );
    }

    #[test]
    fn paired_rename_becomes_one_event() {
        let ev = event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/nowhere/old.txt", "/nowhere/new.txt"],
        );
        assert_eq!(
            translate(ev),
            vec![FsEvent::Renamed {
                from: PathBuf::from("/nowhere/old.txt"),
                to: PathBuf::from("/nowhere/new.txt"),
                is_dir: false
            }]
        );
    }

    fn tracked(mode: RenameMode, path: &str, tracker: usize) -> Event {
        let mut ev = event(EventKind::Modify(ModifyKind::Name(mode)), &[path]);
        ev.attrs.set_tracker(tracker);
        ev
    }

    #[test]
    fn paired_tracked_halves_are_ignored() {
        let mut t = Translator::new();
        let from = t.translate(tracked(RenameMode::From, "/nowhere/old.txt", 7));
        assert!(matches!(from.as_slice(), [FsEvent::Other(_)]));
        let to = t.translate(tracked(RenameMode::To, "/nowhere/new.txt", 7));
        assert!(matches!(to.as_slice(), [FsEvent::Other(_)]));
    }

    #[test]
    fn unpaired_tracked_to_reads_as_create() {
        let mut t = Translator::new();
        t.translate(tracked(RenameMode::From, "/nowhere/old.txt", 7));
        let moved_in = t.translate(tracked(RenameMode::To, "/nowhere/invoice.pdf", 8));
        assert_eq!(
            moved_in,
            vec![FsEvent::Created {
                path: PathBuf::from("/nowhere/invoice.pdf"),
                is_dir: false
            }]
        );
    }

    #[test]
    fn tracker_is_consumed_by_its_to_half() {
        let mut t = Translator::new();
        t.translate(tracked(RenameMode::From, "/nowhere/old.txt", 3));
        t.translate(tracked(RenameMode::To, "/nowhere/new.txt", 3));
        let again = t.translate(tracked(RenameMode::To, "/nowhere/other.txt", 3));
        assert!(matches!(again.as_slice(), [FsEvent::Created { .. }]));
    }

    #[test]
    fn remembered_trackers_are_bounded() {
        let mut t = Translator::new();
        for n in 0..(MAX_TRACKED_RENAMES + 10) {
            t.translate(tracked(RenameMode::From, "/nowhere/gone.txt", n));
        }
        assert_eq!(t.seen_from.len(), MAX_TRACKED_RENAMES);
        let oldest = t.translate(tracked(RenameMode::To, "/nowhere/late.txt", 0));
        assert!(matches!(oldest.as_slice(), [FsEvent::Created { .. }]));
    }

    #[test]
    fn untracked_rename_halves_read_as_delete_and_create() {
        let from = translate(event(EventKind::Modify(ModifyKind::Name(RenameMode::From)), &["/nowhere/old.txt"]));
        assert!(matches!(from.as_slice(), [FsEvent::Deleted { .. }]));
        let to = translate(event(EventKind::Modify(ModifyKind::Name(RenameMode::To)), &["/nowhere/new.txt"]));
        assert!(matches!(to.as_slice(), [FsEvent::Created { is_dir: false, .. }]));
    }

    #[test]
    fn content_writes_are_other() {
        let ev = event(EventKind::Modify(ModifyKind::Data(DataChange::Content)), &["/nowhere/a.txt"]);
        assert!(matches!(translate(ev).as_slice(), [FsEvent::Other(_)]));
    }
}
