//! File move implementation.
//! Checks write access, creates the category folder, picks a collision-free name and
//! relocates the file with a single rename. Every result is folded into a `MoveOutcome`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::category::CategoryTable;
use crate::errors::OrganizeError;
use crate::placement::{plan, Placement, Plan, SkipReason};
use crate::platform::{has_access, Access};

use super::atomic::try_atomic_move;
use super::duplicate::resolve_destination;
use super::helpers::describe_io_error;

/// Result of one organize attempt; failures are carried as values, never raised.
#[derive(Debug)]
pub struct MoveOutcome {
    pub moved: bool,
    pub message: String,
    pub destination: Option<PathBuf>,
    pub failure: Option<OrganizeError>,
}

impl MoveOutcome {
    fn moved(message: String, destination: PathBuf) -> Self {
        Self {
            moved: true,
            message,
            destination: Some(destination),
            failure: None,
        }
    }

    fn skipped(message: String) -> Self {
        Self {
            moved: false,
            message,
            destination: None,
            failure: None,
        }
    }

    fn failed(message: String, failure: OrganizeError) -> Self {
        Self {
            moved: false,
            message,
            destination: None,
            failure: Some(failure),
        }
    }

    /// True when the attempt reached a final state (moved or deliberately skipped).
    pub fn is_settled(&self) -> bool {
        self.failure.is_none()
    }
}

fn display_name(file: &Path) -> String {
    file.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string())
}

/// Plan and, if needed, move `file` into its category folder under `root`.
pub fn organize_file(file: &Path, root: &Path, table: &CategoryTable, organize_by_date: bool) -> MoveOutcome {
    let name = display_name(file);
    match plan(file, root, table, organize_by_date) {
        Placement::Skip(SkipReason::AlreadyOrganized(category)) => {
            debug!(src = %file.display(), category = %category, "Skipped: already organized");
            MoveOutcome::skipped(format!("Skipped {name}: already in correct folder {category}"))
        }
        Placement::Skip(SkipReason::Unsupported) => {
            debug!(src = %file.display(), "Skipped: temporary or unsupported file type");
            MoveOutcome::skipped(format!("Skipped {name}: temporary or unsupported file type"))
        }
        Placement::Move(p) => move_file(file, root, &p),
    }
}

/// Execute a plan for `file`. `root` is the watched folder the plan was made against.
pub fn move_file(file: &Path, root: &Path, plan: &Plan) -> MoveOutcome {
    let name = display_name(file);
    match relocate(file, root, plan) {
        Ok(dest) => {
            debug!(src = %file.display(), dest = %dest.display(), "Moved file");
            MoveOutcome::moved(format!("Moved {name} to {}", plan.label()), dest)
        }
        Err(e) => {
            let message = match &e {
                OrganizeError::PermissionDenied { context, .. } => {
                    format!("Permission error moving {name}: {context}. Try running as administrator.")
                }
                OrganizeError::SourceVanished(_) => format!("File not found for {name}: {e}"),
                _ => format!("Error moving {name}: {e}"),
            };
            debug!(
                code = e.code(),
                kind = e.kind(),
                src = %file.display(),
                dest = %plan.target_dir.display(),
                "{message}"
            );
            MoveOutcome::failed(message, e)
        }
    }
}

fn relocate(file: &Path, root: &Path, plan: &Plan) -> Result<PathBuf, OrganizeError> {
    if !file.try_exists().unwrap_or(false) {
        return Err(OrganizeError::SourceVanished(file.to_path_buf()));
    }

    let parent = file.parent().unwrap_or(root);
    if !has_access(parent, Access::Write) || !has_access(root, Access::Write) {
        return Err(OrganizeError::PermissionDenied {
            path: parent.to_path_buf(),
            context: "No write access to source or destination folder".into(),
        });
    }

    fs::create_dir_all(&plan.target_dir).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => OrganizeError::Io(describe_io_error(
            "create destination directory",
            &plan.target_dir,
            &e,
        )),
        _ => OrganizeError::from_io("create destination directory", &plan.target_dir, e),
    })?;

    let file_name = file
        .file_name()
        .ok_or_else(|| OrganizeError::Io(format!("source has no file name: {}", file.display())))?;
    let dest = resolve_destination(&plan.target_dir, file_name);

    try_atomic_move(file, &dest).map_err(|e| OrganizeError::from_io("move file", file, e))?;
    Ok(dest)
}
