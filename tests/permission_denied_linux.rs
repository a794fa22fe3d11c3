#![cfg(target_os = "linux")]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

use tidy_watch::watch::FolderWatchHandler;
use tidy_watch::{default_categories, organize_file, FolderConfig, FsEvent, MemorySink, OrganizeError, WatchTuning};

fn running_as_root() -> bool {
    // SAFETY: geteuid has no preconditions.
    unsafe { libc::geteuid() == 0 }
}

fn set_mode(path: &Path, mode: u32) {
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(mode);
    fs::set_permissions(path, perms).unwrap();
}

fn two_attempt_handler(root: &Path, mem: &MemorySink) -> FolderWatchHandler {
    let tuning = WatchTuning {
        retry_delay: Duration::from_millis(10),
        max_attempts: 2,
        ..WatchTuning::default()
    };
    FolderWatchHandler::new(
        &FolderConfig::new(root),
        Arc::new(default_categories()),
        false,
        tuning,
        mem.sink(),
    )
}

/// A file in a folder the process cannot write to is reported as a permission error
/// and stays where it is.
#[test]
fn readonly_source_folder_yields_permission_outcome() {
    // Root bypasses permission checks.
    if running_as_root() {
        eprintln!("skipping: running as root");
        return;
    }

    let td = tempdir().expect("tempdir");
    let root = td.path();
    let locked = root.join("locked");
    fs::create_dir_all(&locked).unwrap();
    let src = locked.join("sample.txt");
    fs::write(&src, b"hello").unwrap();

    let mut perms = fs::metadata(&locked).unwrap().permissions();
    perms.set_mode(0o555);
    fs::set_permissions(&locked, perms).unwrap();

    let outcome = organize_file(&src, root, &default_categories(), false);

    let mut restore = fs::metadata(&locked).unwrap().permissions();
    restore.set_mode(0o755);
    let _ = fs::set_permissions(&locked, restore);

    assert!(!outcome.moved);
    assert!(
        matches!(outcome.failure, Some(OrganizeError::PermissionDenied { .. })),
        "unexpected outcome: {outcome:?}"
    );
    assert!(outcome.message.starts_with("Permission error moving sample.txt"), "{}", outcome.message);
    assert!(outcome.failure.as_ref().is_some_and(|e| e.is_retryable()));
    assert!(src.exists());
}

#[test]
fn permission_failure_is_retried_then_reported_exhausted() {
    if running_as_root() {
        eprintln!("skipping: running as root");
        return;
    }

    let td = tempdir().expect("tempdir");
    let root = td.path();
    let locked = root.join("locked");
    fs::create_dir_all(&locked).unwrap();
    let src = locked.join("sample.txt");
    fs::write(&src, b"hello").unwrap();
    set_mode(&locked, 0o555);

    let mem = MemorySink::new();
    let h = two_attempt_handler(root, &mem);
    h.handle_event(FsEvent::Created {
        path: src.clone(),
        is_dir: false,
    });

    set_mode(&locked, 0o755);

    let lines = mem.lines();
    assert_eq!(mem.count_containing("Permission error moving sample.txt"), 2, "lines: {lines:?}");
    assert_eq!(
        lines.last().map(String::as_str),
        Some("Failed to process created file sample.txt after 2 attempts")
    );
    assert!(src.exists());
}

#[test]
fn unreadable_rename_target_is_retried_then_reported_exhausted() {
    if running_as_root() {
        eprintln!("skipping: running as root");
        return;
    }

    let td = tempdir().expect("tempdir");
    let root = td.path();
    let target = root.join("new.txt");
    fs::write(&target, b"hello").unwrap();
    set_mode(&target, 0o000);

    let mem = MemorySink::new();
    let h = two_attempt_handler(root, &mem);
    h.handle_event(FsEvent::Renamed {
        from: root.join("old.txt"),
        to: target.clone(),
        is_dir: false,
    });

    set_mode(&target, 0o644);

    let lines = mem.lines();
    assert_eq!(
        mem.count_containing("Permission error for new.txt: no read/write access"),
        2,
        "lines: {lines:?}"
    );
    assert_eq!(
        lines.last().map(String::as_str),
        Some("Failed to process renamed file new.txt after 2 attempts")
    );
    assert!(target.exists());
    assert!(!root.join("Documents").join("new.txt").exists());
}
