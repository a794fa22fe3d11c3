use assert_cmd::Command;
use assert_fs::prelude::*;
use std::fs;
use std::path::Path;

const BIN: &str = env!("CARGO_BIN_EXE_tidy_watch");

fn cmd(config: &Path) -> Command {
    let mut c = Command::new(BIN);
    c.env("TIDY_WATCH_CONFIG", config).args(["--log-level", "quiet"]);
    c
}

fn stdout_of(c: &mut Command) -> String {
    let out = c.output().expect("spawn binary");
    assert!(
        out.status.success(),
        "binary failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn saved(config: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(config).expect("config written")).expect("valid json")
}

#[test]
fn print_config_reports_env_location_without_creating_it() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let cfg = tmp.child("config.json");
    let stdout = stdout_of(cmd(cfg.path()).arg("print-config"));
    assert!(stdout.contains(&cfg.path().display().to_string()), "stdout: {stdout}");
    assert!(!cfg.path().exists());
}

#[test]
fn add_folder_and_list_round_trip() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let cfg = tmp.child("config.json");
    let inbox = tmp.child("inbox");
    inbox.create_dir_all().unwrap();

    let stdout = stdout_of(cmd(cfg.path()).arg("add-folder").arg(inbox.path()));
    assert!(stdout.contains("Now monitoring"), "stdout: {stdout}");
    let raw = saved(cfg.path());
    assert_eq!(
        raw["monitored_folders"][0],
        serde_json::Value::from(inbox.path().display().to_string())
    );

    let again = stdout_of(cmd(cfg.path()).arg("add-folder").arg(inbox.path()));
    assert!(again.contains("already monitored"), "stdout: {again}");

    let listing = stdout_of(cmd(cfg.path()).arg("list"));
    assert!(listing.contains(&inbox.path().display().to_string()), "listing: {listing}");
    assert!(listing.contains("recursive=true"), "listing: {listing}");
    assert!(listing.contains(".pdf"), "listing: {listing}");
}

#[test]
fn set_folder_anchors_relative_exclusions() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let cfg = tmp.child("config.json");
    let inbox = tmp.child("inbox");
    inbox.create_dir_all().unwrap();

    stdout_of(cmd(cfg.path()).arg("add-folder").arg(inbox.path()));
    stdout_of(
        cmd(cfg.path())
            .arg("set-folder")
            .arg(inbox.path())
            .args(["--recursive", "false", "--exclude", "Keep"]),
    );

    let raw = saved(cfg.path());
    let key = inbox.path().display().to_string();
    let settings = &raw["folder_settings"][key.as_str()];
    assert_eq!(settings["recursive"], serde_json::Value::Bool(false));
    assert_eq!(
        settings["exclusions"][0],
        serde_json::Value::from(inbox.path().join("Keep").display().to_string())
    );
}

#[test]
fn category_and_date_options_are_saved() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let cfg = tmp.child("config.json");

    stdout_of(cmd(cfg.path()).args(["add-category", "EPUB", "Books"]));
    stdout_of(cmd(cfg.path()).args(["organize-by-date", "on"]));
    let raw = saved(cfg.path());
    assert_eq!(raw["categories"][".epub"], serde_json::Value::from("Books"));
    assert_eq!(raw["organize_by_date"], serde_json::Value::Bool(true));

    stdout_of(cmd(cfg.path()).args(["remove-category", ".epub"]));
    assert!(saved(cfg.path())["categories"].get(".epub").is_none());
}

#[test]
fn watch_without_folders_fails() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let cfg = tmp.child("config.json");
    let out = cmd(cfg.path()).arg("watch").output().expect("spawn binary");
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("No folder is being watched"));
}

#[test]
fn relative_folder_is_refused() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let cfg = tmp.child("config.json");
    let out = cmd(cfg.path()).args(["add-folder", "not/absolute"]).output().expect("spawn binary");
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Invalid configuration"));
}
