//! Default path helpers and symlink checks.
//! Determines OS-appropriate config/log paths and detects symlinked ancestors for safety.

use anyhow::{anyhow, Context, Result};
use dirs::{config_dir, data_dir};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{APP_DIR_NAME, CONFIG_ENV, CONFIG_FILE_NAME, LOG_FILE_NAME};

/// Config path: `$TIDY_WATCH_CONFIG` when set (relative values resolve against the
/// current directory, a directory value gets `config.json` appended), otherwise the
/// OS config dir.
pub fn default_config_path() -> Result<PathBuf> {
    if let Some(raw) = env::var_os(CONFIG_ENV) {
        let mut p = PathBuf::from(raw);
        if p.as_os_str().is_empty() {
            return Err(anyhow!("{CONFIG_ENV} is set but empty"));
        }
        if p.is_relative() {
            let cwd = env::current_dir().context("resolve current directory")?;
            p = cwd.join(p);
        }
        if p.is_dir() {
            p.push(CONFIG_FILE_NAME);
        }
        return Ok(p);
    }

    if let Some(mut base) = config_dir() {
        base.push(APP_DIR_NAME);
        base.push(CONFIG_FILE_NAME);
        return Ok(base);
    }
    env::var("HOME")
        .map(|h| {
            PathBuf::from(h)
                .join(".config")
                .join(APP_DIR_NAME)
                .join(CONFIG_FILE_NAME)
        })
        .map_err(|_| anyhow!("cannot determine a config directory"))
}

/// Log file path: next to the config when `$TIDY_WATCH_CONFIG` is set, otherwise the
/// OS data dir.
pub fn default_log_path() -> Result<PathBuf> {
    if env::var_os(CONFIG_ENV).is_some() {
        let cfg = default_config_path()?;
        let dir = cfg
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| anyhow!("config path has no parent: {}", cfg.display()))?;
        return Ok(dir.join(LOG_FILE_NAME));
    }

    if let Some(mut base) = data_dir() {
        base.push(APP_DIR_NAME);
        // ensure dir exists (best-effort)
        let _ = fs::create_dir_all(&base);
        base.push(LOG_FILE_NAME);
        return Ok(base);
    }
    env::var("HOME")
        .map(|h| {
            PathBuf::from(h)
                .join(".local")
                .join("share")
                .join(APP_DIR_NAME)
                .join(LOG_FILE_NAME)
        })
        .map_err(|_| anyhow!("cannot determine a data directory"))
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if anc.exists() {
            let meta = fs::symlink_metadata(anc)?;
            if meta.file_type().is_symlink() {
                return Ok(true);
            }
        }
        p = anc.parent();
    }
    Ok(false)
}
