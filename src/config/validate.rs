//! Folder and exclusion validation.
//! Checks path shape (absolute, no form-feed), exclusion ancestry, and readiness of a
//! folder to be watched (created if missing, read/write access otherwise).

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::errors::OrganizeError;
use crate::placement::{clean_path, is_within};
use crate::platform::{has_access, Access};

/// Character some pickers leak into paths; such paths are rejected.
pub const INVALID_PATH_CHAR: char = '\x0c';

/// True when `path` is absolute and free of [`INVALID_PATH_CHAR`].
pub fn is_valid_folder_path(path: &Path) -> bool {
    path.is_absolute() && !path.to_string_lossy().contains(INVALID_PATH_CHAR)
}

pub fn check_folder_path(path: &Path) -> Result<(), OrganizeError> {
    if is_valid_folder_path(path) {
        Ok(())
    } else {
        Err(OrganizeError::ConfigInvalid(format!(
            "folder path must be absolute and printable: {}",
            path.display()
        )))
    }
}

/// Validate an exclusion for `folder` and return it cleaned.
pub fn check_exclusion(folder: &Path, exclusion: &Path) -> Result<PathBuf, OrganizeError> {
    if !is_valid_folder_path(exclusion) {
        return Err(OrganizeError::ConfigInvalid(format!(
            "exclusion must be an absolute path: {}",
            exclusion.display()
        )));
    }
    if !is_within(exclusion, folder) {
        return Err(OrganizeError::ConfigInvalid(format!(
            "exclusion {} is not inside {}",
            exclusion.display(),
            folder.display()
        )));
    }
    Ok(clean_path(exclusion))
}

/// What [`prepare_watch_root`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootState {
    Existing,
    Created,
}

/// Make `path` ready to be watched: create it when missing, else require read/write
/// access.
pub fn prepare_watch_root(path: &Path) -> Result<RootState, OrganizeError> {
    check_folder_path(path)?;
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| {
            error!(path = %path.display(), error = %e, "Failed to create watch folder");
            OrganizeError::WatchStart {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        info!(path = %path.display(), "Created watch folder");
        return Ok(RootState::Created);
    }
    if !path.is_dir() {
        return Err(OrganizeError::WatchStart {
            path: path.to_path_buf(),
            reason: "not a directory".into(),
        });
    }
    if !has_access(path, Access::ReadWrite) {
        return Err(OrganizeError::PermissionDenied {
            path: path.to_path_buf(),
            context: "no read/write access".into(),
        });
    }
    debug!(path = %path.display(), "watch folder readable and writable");
    Ok(RootState::Existing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn relative_and_form_feed_paths_are_rejected() {
        assert!(check_folder_path(Path::new("relative/dir")).is_err());
        let bad = std::env::temp_dir().join("bad\x0cname");
        assert!(check_folder_path(&bad).is_err());
        assert!(check_folder_path(&std::env::temp_dir()).is_ok());
    }

    #[test]
    fn exclusion_must_be_a_descendant() {
        let root = std::env::temp_dir().join("watched");
        let inside = root.join("Keep").join(".");
        assert_eq!(check_exclusion(&root, &inside).unwrap(), root.join("Keep"));
        assert!(check_exclusion(&root, &std::env::temp_dir().join("elsewhere")).is_err());
        assert!(check_exclusion(&root, Path::new("Keep")).is_err());
    }

    #[test]
    fn missing_root_is_created() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("a").join("b");
        assert_eq!(prepare_watch_root(&root).unwrap(), RootState::Created);
        assert!(root.is_dir());
        assert_eq!(prepare_watch_root(&root).unwrap(), RootState::Existing);
    }

    #[test]
    fn file_is_not_a_watch_root() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(prepare_watch_root(&file), Err(OrganizeError::WatchStart { .. })));
    }
}
