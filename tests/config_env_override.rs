use serial_test::serial;
use std::fs;
use tempfile::tempdir;

use tidy_watch::config::CONFIG_ENV;
use tidy_watch::{default_config_path, default_log_path};

#[test]
#[serial]
fn log_colocates_with_env_override_config() {
    let td = tempdir().unwrap();
    let base = fs::canonicalize(td.path()).unwrap();
    let cfg = base.join("custom_config.json");
    fs::write(&cfg, "{}").unwrap();

    unsafe {
        std::env::set_var(CONFIG_ENV, &cfg);
    }
    let resolved_cfg = default_config_path();
    let resolved_log = default_log_path();
    unsafe {
        std::env::remove_var(CONFIG_ENV);
    }

    assert_eq!(resolved_cfg.unwrap(), cfg);
    assert_eq!(resolved_log.unwrap(), base.join("tidy_watch.log"));
}

#[test]
#[serial]
fn directory_override_gets_file_name_appended() {
    let td = tempdir().unwrap();
    let base = fs::canonicalize(td.path()).unwrap();

    unsafe {
        std::env::set_var(CONFIG_ENV, &base);
    }
    let resolved = default_config_path();
    unsafe {
        std::env::remove_var(CONFIG_ENV);
    }

    assert_eq!(resolved.unwrap(), base.join("config.json"));
}

#[test]
#[serial]
fn empty_override_is_an_error() {
    unsafe {
        std::env::set_var(CONFIG_ENV, "");
    }
    let resolved = default_config_path();
    unsafe {
        std::env::remove_var(CONFIG_ENV);
    }
    assert!(resolved.is_err());
}

#[test]
#[serial]
fn default_location_ends_with_app_dir() {
    unsafe {
        std::env::remove_var(CONFIG_ENV);
    }
    let path = default_config_path().unwrap();
    assert!(path.ends_with("tidy_watch/config.json"), "{}", path.display());
}
