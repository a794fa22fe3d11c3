//! Core configuration types.
//! - EngineConfig is the in-memory snapshot the engine works from.
//! - FolderConfig carries the per-folder watch settings.
//! - WatchTuning groups the timing knobs of the watch handlers.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::category::{default_categories, CategoryTable};
use crate::placement::normalize_path;

use super::{DEFAULT_APPEARANCE_MODE, DEFAULT_MAX_ATTEMPTS, DEFAULT_RENAME_WINDOW, DEFAULT_RETRY_DELAY, DEFAULT_WORKERS};

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Timing knobs for the folder watch handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchTuning {
    /// How long a deletion stays eligible as the source of a rename.
    pub rename_window: Duration,
    /// Pause between two processing attempts of the same file.
    pub retry_delay: Duration,
    /// Attempts per notification before giving up.
    pub max_attempts: u32,
    /// Size of each folder's task pool.
    pub workers: usize,
}

impl Default for WatchTuning {
    fn default() -> Self {
        Self {
            rename_window: DEFAULT_RENAME_WINDOW,
            retry_delay: DEFAULT_RETRY_DELAY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            workers: DEFAULT_WORKERS,
        }
    }
}

/// Watch settings of one monitored folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderConfig {
    pub path: PathBuf,
    pub recursive: bool,
    /// Absolute descendants of `path` whose contents are never organized.
    pub exclusions: Vec<PathBuf>,
}

impl FolderConfig {
    /// Settings a folder gets when none are stored: recursive, nothing excluded.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            recursive: true,
            exclusions: Vec::new(),
        }
    }

    /// True when this entry refers to `path` (normalized comparison).
    pub fn is_for(&self, path: &Path) -> bool {
        normalize_path(&self.path) == normalize_path(path)
    }
}

/// Configuration snapshot the engine runs from.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub categories: CategoryTable,
    /// Monitored folders, in the order they were added.
    pub folders: Vec<FolderConfig>,
    pub organize_by_date: bool,
    /// Kept so the file round-trips; not interpreted here.
    pub startup_enabled: bool,
    /// Kept so the file round-trips; not interpreted here.
    pub appearance_mode: String,
    pub tuning: WatchTuning,
    /// Console verbosity; None leaves the front end's default in place.
    pub log_level: Option<LogLevel>,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            folders: Vec::new(),
            organize_by_date: false,
            startup_enabled: false,
            appearance_mode: DEFAULT_APPEARANCE_MODE.to_string(),
            tuning: WatchTuning::default(),
            log_level: None,
            log_file: None,
        }
    }
}

impl EngineConfig {
    pub fn folder(&self, path: &Path) -> Option<&FolderConfig> {
        self.folders.iter().find(|f| f.is_for(path))
    }

    pub fn folder_mut(&mut self, path: &Path) -> Option<&mut FolderConfig> {
        self.folders.iter_mut().find(|f| f.is_for(path))
    }

    /// Paths of all monitored folders.
    pub fn folder_paths(&self) -> Vec<PathBuf> {
        self.folders.iter().map(|f| f.path.clone()).collect()
    }
}
