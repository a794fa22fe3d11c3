//! Config module (modularized).
//! Provides configuration types, default paths, JSON persistence, and validation.

mod json;
pub mod paths;
mod store;
pub mod types;
pub mod validate;

pub use json::{parse_config, render_config};
pub use paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
pub use store::{ConfigStore, JsonFileStore, MemoryStore};
pub use types::{EngineConfig, FolderConfig, LogLevel, WatchTuning};
pub use validate::{check_exclusion, check_folder_path, prepare_watch_root, RootState};

use std::time::Duration;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "TIDY_WATCH_CONFIG";
pub const APP_DIR_NAME: &str = "tidy_watch";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const LOG_FILE_NAME: &str = "tidy_watch.log";

pub const DEFAULT_APPEARANCE_MODE: &str = "system";
pub const DEFAULT_RENAME_WINDOW: Duration = Duration::from_secs(5);
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_WORKERS: usize = 4;
