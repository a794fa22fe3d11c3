//! Typed error definitions for tidy_watch.
//! Provides a small set of well-known failure modes so the retry loop can act on values
//! and the log sink gets consistent messages.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error("Permission denied on {path}: {context}")]
    PermissionDenied { path: PathBuf, context: String },

    #[error("File disappeared before it could be processed: {0}")]
    SourceVanished(PathBuf),

    #[error("File is not ready yet: {0}")]
    NotReady(PathBuf),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Could not watch {path}: {reason}")]
    WatchStart { path: PathBuf, reason: String },

    #[error("{0}")]
    Io(String),
}

impl OrganizeError {
    /// Stable numeric code, used as a structured field in logs.
    pub fn code(&self) -> i32 {
        match self {
            OrganizeError::PermissionDenied { .. } => 13,
            OrganizeError::SourceVanished(_) => 2,
            OrganizeError::NotReady(_) => 11,
            OrganizeError::ConfigInvalid(_) => 22,
            OrganizeError::WatchStart { .. } => 19,
            OrganizeError::Io(_) => 5,
        }
    }

    /// Short machine-friendly name for the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            OrganizeError::PermissionDenied { .. } => "permission_denied",
            OrganizeError::SourceVanished(_) => "source_vanished",
            OrganizeError::NotReady(_) => "not_ready",
            OrganizeError::ConfigInvalid(_) => "config_invalid",
            OrganizeError::WatchStart { .. } => "watch_start",
            OrganizeError::Io(_) => "io",
        }
    }

    /// True for failures worth another attempt after a delay.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OrganizeError::PermissionDenied { .. } | OrganizeError::NotReady(_) | OrganizeError::Io(_)
        )
    }

    /// Classify an io::Error raised while operating on `path`.
    pub fn from_io(op: &str, path: &Path, e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => OrganizeError::SourceVanished(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => OrganizeError::PermissionDenied {
                path: path.to_path_buf(),
                context: crate::fs_ops::describe_io_error(op, path, &e),
            },
            _ => OrganizeError::Io(crate::fs_ops::describe_io_error(op, path, &e)),
        }
    }
}
