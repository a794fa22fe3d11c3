//! Configuration persistence.
//! - `ConfigStore` is the seam the engine saves through after every mutation.
//! - `JsonFileStore` reads/writes the JSON file; a missing file gets a default one.
//! - `MemoryStore` keeps everything in memory (tests, embedding).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

use crate::errors::OrganizeError;
use crate::platform::{set_dir_mode_0700, write_config_atomic};

use super::json::{parse_config, render_config};
use super::paths::{default_config_path, path_has_symlink_ancestor};
use super::types::EngineConfig;

/// Where configuration snapshots are loaded from and saved to.
pub trait ConfigStore: Send {
    /// Load the stored configuration. Never fails: unusable input yields defaults.
    fn load(&self) -> EngineConfig;

    /// Persist `config`, replacing what was stored.
    fn save(&self, config: &EngineConfig) -> Result<(), OrganizeError>;

    /// Human description of where the data lives.
    fn location(&self) -> String;
}

/// JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location (`$TIDY_WATCH_CONFIG` or the OS config dir).
    pub fn at_default_location() -> anyhow::Result<Self> {
        Ok(Self::new(default_config_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the file. `Ok(None)` when it does not exist.
    pub fn read(&self) -> Result<Option<EngineConfig>, OrganizeError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(OrganizeError::ConfigInvalid(format!(
                    "cannot read {}: {e}",
                    self.path.display()
                )));
            }
        };
        parse_config(&text).map(Some)
    }

    /// Write the default configuration to a file that does not exist yet.
    /// Refuses to write beneath a symlinked ancestor.
    pub fn create_template(&self) -> Result<EngineConfig, OrganizeError> {
        let cfg = EngineConfig::default();
        if path_has_symlink_ancestor(&self.path).unwrap_or(true) {
            return Err(OrganizeError::ConfigInvalid(format!(
                "refusing to create config: ancestor of {} is a symlink",
                self.path.display()
            )));
        }
        if let Some(parent) = self.path.parent() {
            let existed = parent.exists();
            fs::create_dir_all(parent).map_err(|e| OrganizeError::from_io("create config directory", parent, e))?;
            if !existed {
                let _ = set_dir_mode_0700(parent);
            }
        }
        self.save(&cfg)?;
        info!(path = %self.path.display(), "Created default config");
        Ok(cfg)
    }
}

impl ConfigStore for JsonFileStore {
    fn load(&self) -> EngineConfig {
        match self.read() {
            Ok(Some(cfg)) => {
                info!(
                    path = %self.path.display(),
                    folders = cfg.folders.len(),
                    "Loaded config"
                );
                cfg
            }
            Ok(None) => {
                info!(path = %self.path.display(), "No config file found, using default config");
                match self.create_template() {
                    Ok(cfg) => cfg,
                    Err(e) => {
                        warn!(code = e.code(), path = %self.path.display(), "{e}");
                        EngineConfig::default()
                    }
                }
            }
            Err(e) => {
                error!(
                    code = e.code(),
                    kind = e.kind(),
                    path = %self.path.display(),
                    "Error loading config file: {e}"
                );
                EngineConfig::default()
            }
        }
    }

    fn save(&self, config: &EngineConfig) -> Result<(), OrganizeError> {
        let text = render_config(config)?;
        write_config_atomic(&self.path, text.as_bytes()).map_err(|e| {
            let e = OrganizeError::Io(format!("Error saving config to {}: {e:#}", self.path.display()));
            error!(code = e.code(), path = %self.path.display(), "{e}");
            e
        })?;
        info!(path = %self.path.display(), "Saved config");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory store; records how often it was saved. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<(EngineConfig, usize)>>,
}

impl MemoryStore {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new((config, 0))),
        }
    }

    /// Last saved snapshot (or the initial one).
    pub fn snapshot(&self) -> EngineConfig {
        self.state.lock().map(|s| s.0.clone()).unwrap_or_default()
    }

    pub fn save_count(&self) -> usize {
        self.state.lock().map(|s| s.1).unwrap_or(0)
    }
}

impl ConfigStore for MemoryStore {
    fn load(&self) -> EngineConfig {
        self.snapshot()
    }

    fn save(&self, config: &EngineConfig) -> Result<(), OrganizeError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| OrganizeError::Io("config store lock poisoned".into()))?;
        state.0 = config.clone();
        state.1 += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".into()
    }
}
