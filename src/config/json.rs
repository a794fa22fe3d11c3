//! JSON configuration format.
//! - Maps the on-disk record to [`EngineConfig`] and back (serde_json).
//! - Loading is lenient: keys missing from the file take defaults, unusable folders and
//!   exclusions are dropped with a warning.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::category::{default_categories, normalize_extension, CategoryTable};
use crate::errors::OrganizeError;
use crate::placement::{clean_path, normalize_path};

use super::types::{EngineConfig, FolderConfig, LogLevel, WatchTuning};
use super::validate::is_valid_folder_path;
use super::DEFAULT_APPEARANCE_MODE;

/// Struct mirroring the JSON file.
#[derive(Debug, Serialize, Deserialize)]
struct ConfigRecord {
    #[serde(default = "default_categories")]
    categories: CategoryTable,
    #[serde(default)]
    monitored_folders: Vec<String>,
    #[serde(default)]
    startup_enabled: bool,
    #[serde(default = "default_appearance_mode")]
    appearance_mode: String,
    #[serde(default)]
    organize_by_date: bool,
    #[serde(default)]
    folder_settings: BTreeMap<String, FolderSettingsRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tuning: Option<TuningRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    log_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    log_file: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FolderSettingsRecord {
    // An entry that exists but omits the flag is non-recursive.
    #[serde(default)]
    recursive: bool,
    #[serde(default)]
    exclusions: Vec<String>,
}

/// Optional timing overrides, all in milliseconds.
#[derive(Debug, Default, Serialize, Deserialize)]
struct TuningRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rename_window_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    retry_delay_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    workers: Option<usize>,
}

fn default_appearance_mode() -> String {
    DEFAULT_APPEARANCE_MODE.to_string()
}

/// Parse the JSON text of a config file.
pub fn parse_config(text: &str) -> Result<EngineConfig, OrganizeError> {
    let record: ConfigRecord =
        serde_json::from_str(text).map_err(|e| OrganizeError::ConfigInvalid(e.to_string()))?;
    Ok(from_record(record))
}

/// Render `config` as pretty-printed JSON.
pub fn render_config(config: &EngineConfig) -> Result<String, OrganizeError> {
    serde_json::to_string_pretty(&to_record(config)).map_err(|e| OrganizeError::ConfigInvalid(e.to_string()))
}

fn from_record(record: ConfigRecord) -> EngineConfig {
    let mut categories = CategoryTable::new();
    for (ext, label) in record.categories {
        match normalize_extension(&ext) {
            Some(key) => {
                categories.insert(key, label);
            }
            None => warn!(extension = %ext, "Ignoring invalid extension in categories"),
        }
    }

    let settings: Vec<(PathBuf, FolderSettingsRecord)> = record
        .folder_settings
        .into_iter()
        .map(|(k, v)| (normalize_path(Path::new(&k)), v))
        .collect();

    let mut folders: Vec<FolderConfig> = Vec::new();
    for raw in &record.monitored_folders {
        let path = Path::new(raw);
        if !is_valid_folder_path(path) {
            warn!(folder = %raw, "Dropping invalid monitored folder");
            continue;
        }
        let path = clean_path(path);
        if folders.iter().any(|f| f.is_for(&path)) {
            debug!(folder = %path.display(), "duplicate monitored folder");
            continue;
        }
        let key = normalize_path(&path);
        let folder = match settings.iter().find(|(k, _)| *k == key) {
            Some((_, s)) => FolderConfig {
                path,
                recursive: s.recursive,
                exclusions: s
                    .exclusions
                    .iter()
                    .map(PathBuf::from)
                    .filter(|e| e.is_absolute())
                    .map(|e| clean_path(&e))
                    .collect(),
            },
            None => FolderConfig::new(path),
        };
        folders.push(folder);
    }

    let mut tuning = WatchTuning::default();
    if let Some(t) = record.tuning {
        if let Some(ms) = t.rename_window_ms {
            tuning.rename_window = Duration::from_millis(ms);
        }
        if let Some(ms) = t.retry_delay_ms {
            tuning.retry_delay = Duration::from_millis(ms);
        }
        if let Some(n) = t.max_attempts.filter(|n| *n > 0) {
            tuning.max_attempts = n;
        }
        if let Some(n) = t.workers.filter(|n| *n > 0) {
            tuning.workers = n;
        }
    }

    let log_level = record.log_level.as_deref().and_then(|s| {
        let parsed = LogLevel::parse(s);
        if parsed.is_none() {
            warn!(value = %s, "Ignoring unknown log_level in config");
        }
        parsed
    });
    let log_file = record.log_file.as_deref().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() { None } else { Some(PathBuf::from(trimmed)) }
    });

    EngineConfig {
        categories,
        folders,
        organize_by_date: record.organize_by_date,
        startup_enabled: record.startup_enabled,
        appearance_mode: record.appearance_mode,
        tuning,
        log_level,
        log_file,
    }
}

fn to_record(config: &EngineConfig) -> ConfigRecord {
    let monitored_folders = config
        .folders
        .iter()
        .map(|f| f.path.to_string_lossy().into_owned())
        .collect();
    let folder_settings = config
        .folders
        .iter()
        .map(|f| {
            (
                f.path.to_string_lossy().into_owned(),
                FolderSettingsRecord {
                    recursive: f.recursive,
                    exclusions: f.exclusions.iter().map(|e| e.to_string_lossy().into_owned()).collect(),
                },
            )
        })
        .collect();

    let defaults = WatchTuning::default();
    let t = &config.tuning;
    let tuning = (*t != defaults).then(|| TuningRecord {
        rename_window_ms: (t.rename_window != defaults.rename_window).then(|| t.rename_window.as_millis() as u64),
        retry_delay_ms: (t.retry_delay != defaults.retry_delay).then(|| t.retry_delay.as_millis() as u64),
        max_attempts: (t.max_attempts != defaults.max_attempts).then_some(t.max_attempts),
        workers: (t.workers != defaults.workers).then_some(t.workers),
    });

    ConfigRecord {
        categories: config.categories.clone(),
        monitored_folders,
        startup_enabled: config.startup_enabled,
        appearance_mode: config.appearance_mode.clone(),
        organize_by_date: config.organize_by_date,
        folder_settings,
        tuning,
        log_level: config.log_level.map(|l| l.to_string()),
        log_file: config.log_file.as_ref().map(|p| p.to_string_lossy().into_owned()),
    }
}
