//! Engine: the context object a front end drives.
//! Owns the configuration snapshot, the store it is persisted through, the log sink
//! and the live watch handles. Control entry points are safe to call redundantly;
//! every configuration mutation is saved before it takes effect and restarts the
//! watchers when they are running.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::category::normalize_extension;
use crate::config::{check_exclusion, check_folder_path, ConfigStore, EngineConfig, FolderConfig};
use crate::errors::OrganizeError;
use crate::placement::clean_path;
use crate::sink::LogSink;
use crate::watch::{self, EventSource, WatchHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Stopped,
    Watching,
    Paused,
}

pub struct Engine {
    config: EngineConfig,
    store: Box<dyn ConfigStore>,
    sink: LogSink,
    source: Arc<dyn EventSource>,
    handles: Vec<WatchHandle>,
    watching: bool,
    paused: bool,
}

impl Engine {
    pub fn new(
        config: EngineConfig,
        store: Box<dyn ConfigStore>,
        sink: LogSink,
        source: Arc<dyn EventSource>,
    ) -> Self {
        Self {
            config,
            store,
            sink,
            source,
            handles: Vec::new(),
            watching: false,
            paused: false,
        }
    }

    /// Build an engine from whatever `store` currently holds.
    pub fn from_store(store: Box<dyn ConfigStore>, sink: LogSink, source: Arc<dyn EventSource>) -> Self {
        let config = store.load();
        Self::new(config, store, sink, source)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store_location(&self) -> String {
        self.store.location()
    }

    pub fn handles(&self) -> &[WatchHandle] {
        &self.handles
    }

    pub fn status(&self) -> EngineStatus {
        match (self.watching, self.paused) {
            (false, _) => EngineStatus::Stopped,
            (true, false) => EngineStatus::Watching,
            (true, true) => EngineStatus::Paused,
        }
    }

    pub fn is_watching(&self) -> bool {
        self.watching
    }

    fn report(&self, line: &str) {
        (self.sink)(line);
    }

    // ---- control ----

    /// Start a watcher per configured folder. Returns how many started.
    pub fn start(&mut self) -> usize {
        if self.watching {
            debug!("start ignored: already watching");
            return self.handles.len();
        }
        if self.config.folders.is_empty() {
            debug!("No folders selected to monitor");
            self.report("Error: No folders selected to monitor.");
            return 0;
        }

        let handles = watch::start(
            &self.config.folders,
            Arc::new(self.config.categories.clone()),
            Arc::clone(&self.sink),
            self.config.organize_by_date,
            self.config.tuning,
            self.source.as_ref(),
        );

        let missing: Vec<String> = self
            .config
            .folders
            .iter()
            .filter(|f| !handles.iter().any(|h| f.is_for(h.root())))
            .map(|f| f.path.display().to_string())
            .collect();
        if !missing.is_empty() {
            self.report(&format!("Warning: Failed to start watchers for {}", missing.join(", ")));
        }

        self.handles = handles;
        self.watching = true;
        self.paused = false;
        debug!(started = self.handles.len(), requested = self.config.folders.len(), "Started watching");
        self.report("Started watching folders.");
        self.handles.len()
    }

    pub fn pause(&mut self) {
        if !self.watching || self.paused {
            return;
        }
        for h in &self.handles {
            h.pause();
        }
        self.paused = true;
        self.report("Paused watching all folders.");
    }

    pub fn resume(&mut self) {
        if !self.watching || !self.paused {
            return;
        }
        for h in &self.handles {
            h.resume();
        }
        self.paused = false;
        self.report("Resumed watching all folders.");
    }

    /// Stop all watchers; returns once no folder task is running any more.
    pub fn stop(&mut self) {
        if !self.watching {
            return;
        }
        watch::stop(std::mem::take(&mut self.handles));
        self.watching = false;
        self.paused = false;
        self.report("Stopped watching folders.");
    }

    /// Stop then start, only when currently watching.
    pub fn restart(&mut self) {
        if self.watching {
            self.stop();
            self.start();
        }
    }

    // ---- configuration ----

    /// Save `next`, adopt it, report `line` and restart running watchers.
    fn commit(&mut self, next: EngineConfig, line: String) -> Result<(), OrganizeError> {
        if let Err(e) = self.store.save(&next) {
            self.report(&format!("Error saving config: {e}"));
            return Err(e);
        }
        self.config = next;
        debug!("{line}");
        self.report(&line);
        self.restart();
        Ok(())
    }

    /// Add a folder with default settings. Returns false if it is already monitored.
    pub fn add_folder(&mut self, path: &Path) -> Result<bool, OrganizeError> {
        check_folder_path(path)?;
        if self.config.folder(path).is_some() {
            return Ok(false);
        }
        let path = clean_path(path);
        let mut next = self.config.clone();
        next.folders.push(FolderConfig::new(&path));
        self.commit(next, format!("Added folder: {}", path.display()))?;
        Ok(true)
    }

    /// Remove a folder and its settings. Returns false if it was not monitored.
    pub fn remove_folder(&mut self, path: &Path) -> Result<bool, OrganizeError> {
        let Some(existing) = self.config.folder(path).map(|f| f.path.clone()) else {
            return Ok(false);
        };
        let mut next = self.config.clone();
        next.folders.retain(|f| !f.is_for(path));
        self.commit(next, format!("Removed folder: {}", existing.display()))?;
        Ok(true)
    }

    /// Replace the recursive flag and exclusions of a monitored folder.
    /// Every exclusion must lie inside the folder.
    pub fn update_folder_settings(
        &mut self,
        path: &Path,
        recursive: bool,
        exclusions: &[PathBuf],
    ) -> Result<(), OrganizeError> {
        let mut next = self.config.clone();
        let folder = next
            .folder_mut(path)
            .ok_or_else(|| OrganizeError::ConfigInvalid(format!("not a monitored folder: {}", path.display())))?;

        let mut accepted: Vec<PathBuf> = Vec::new();
        for e in exclusions {
            let cleaned = check_exclusion(&folder.path, e)?;
            if !accepted.contains(&cleaned) {
                accepted.push(cleaned);
            }
        }
        folder.recursive = recursive;
        folder.exclusions = accepted;

        let line = format!(
            "Updated settings for {}: recursive={}, exclusions={:?}",
            folder.path.display(),
            folder.recursive,
            folder.exclusions
        );
        self.commit(next, line)
    }

    /// Map `ext` to `label`. Returns the normalized extension key.
    pub fn add_category(&mut self, ext: &str, label: &str) -> Result<String, OrganizeError> {
        let key = normalize_extension(ext)
            .ok_or_else(|| OrganizeError::ConfigInvalid(format!("invalid extension: '{ext}'")))?;
        let label = label.trim();
        if label.is_empty() {
            return Err(OrganizeError::ConfigInvalid("category label must not be empty".into()));
        }
        let mut next = self.config.clone();
        next.categories.insert(key.clone(), label.to_string());
        self.commit(next, format!("Added category: {key} -> {label}"))?;
        Ok(key)
    }

    /// Drop the mapping for `ext`. Returns false if there was none.
    pub fn remove_category(&mut self, ext: &str) -> Result<bool, OrganizeError> {
        let Some(key) = normalize_extension(ext) else {
            return Ok(false);
        };
        if !self.config.categories.contains_key(&key) {
            return Ok(false);
        }
        let mut next = self.config.clone();
        next.categories.remove(&key);
        self.commit(next, format!("Removed category: {key}"))?;
        Ok(true)
    }

    pub fn set_organize_by_date(&mut self, enabled: bool) -> Result<(), OrganizeError> {
        let mut next = self.config.clone();
        next.organize_by_date = enabled;
        let line = format!("{} organize by date", if enabled { "Enabled" } else { "Disabled" });
        self.commit(next, line)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if self.watching {
            watch::stop(std::mem::take(&mut self.handles));
        }
    }
}
