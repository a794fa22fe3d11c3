//! Application orchestrator.
//! Resolves the config file, initializes logging, builds the engine and runs the
//! requested subcommand. `watch` installs the Ctrl-C handler and blocks until it fires.

use anyhow::{anyhow, bail, Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use tidy_watch::config::CONFIG_ENV;
use tidy_watch::output as out;
use tidy_watch::{
    default_config_path, default_log_path, shutdown, tracing_sink, Engine, EngineConfig, JsonFileStore, NotifySource,
    OrganizeError,
};

use crate::cli::{anchor_exclusion, sanitize_path, Args, Command};
use crate::logging::init_tracing;

const SHUTDOWN_POLL: Duration = Duration::from_millis(200);

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    let command = args.command();

    // Handled before logging init so it never touches the config file.
    if command == Command::PrintConfig {
        print_config();
        return Ok(());
    }

    let store = JsonFileStore::at_default_location().context("resolve config location")?;

    // Peek at the file for logging settings; full loading (and its logging) happens below.
    let peeked: Option<EngineConfig> = store.read().ok().flatten();
    let level = args
        .effective_log_level()
        .or_else(|| peeked.as_ref().and_then(|c| c.log_level))
        .unwrap_or_default();
    let log_file: Option<PathBuf> = args
        .log_file
        .clone()
        .or_else(|| peeked.as_ref().and_then(|c| c.log_file.clone()))
        .or_else(|| default_log_path().ok());

    let guard = init_tracing(level, log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {e}"));
        e
    })?;

    debug!(?args, config = %store.path().display(), "starting tidy_watch");
    let mut engine = Engine::from_store(Box::new(store), tracing_sink(), Arc::new(NotifySource));

    let result = dispatch(&mut engine, command);

    // Stop watchers before the log writer is flushed.
    drop(engine);
    drop(guard);
    result
}

fn dispatch(engine: &mut Engine, command: Command) -> Result<()> {
    match command {
        Command::Watch => watch(engine),
        Command::PrintConfig => {
            print_config();
            Ok(())
        }
        Command::List => {
            list(engine.config());
            Ok(())
        }
        Command::AddFolder { path } => {
            let path = sanitize_path(&path);
            if engine.add_folder(&path).map_err(user_error)? {
                out::print_success(&format!("Now monitoring {}", path.display()));
            } else {
                out::print_info(&format!("{} is already monitored", path.display()));
            }
            Ok(())
        }
        Command::RemoveFolder { path } => {
            let path = sanitize_path(&path);
            if engine.remove_folder(&path).map_err(user_error)? {
                out::print_success(&format!("No longer monitoring {}", path.display()));
            } else {
                out::print_warn(&format!("{} is not a monitored folder", path.display()));
            }
            Ok(())
        }
        Command::SetFolder {
            path,
            recursive,
            exclude,
            include,
        } => {
            let path = sanitize_path(&path);
            let current = engine
                .config()
                .folder(&path)
                .cloned()
                .ok_or_else(|| anyhow!("{} is not a monitored folder", path.display()))?;

            let dropped: Vec<PathBuf> = include.iter().map(|p| anchor_exclusion(&current.path, p)).collect();
            let mut exclusions: Vec<PathBuf> = current
                .exclusions
                .iter()
                .filter(|e| !dropped.contains(e))
                .cloned()
                .collect();
            exclusions.extend(exclude.iter().map(|p| anchor_exclusion(&current.path, p)));

            engine
                .update_folder_settings(&path, recursive.unwrap_or(current.recursive), &exclusions)
                .map_err(user_error)?;
            out::print_success(&format!("Updated settings for {}", current.path.display()));
            Ok(())
        }
        Command::AddCategory { extension, label } => {
            let key = engine.add_category(&extension, &label).map_err(user_error)?;
            out::print_success(&format!("{key} -> {}", label.trim()));
            Ok(())
        }
        Command::RemoveCategory { extension } => {
            if engine.remove_category(&extension).map_err(user_error)? {
                out::print_success(&format!("Removed mapping for {extension}"));
            } else {
                out::print_warn(&format!("No mapping for {extension}"));
            }
            Ok(())
        }
        Command::OrganizeByDate { state } => {
            engine.set_organize_by_date(state.enabled()).map_err(user_error)?;
            out::print_success(&format!(
                "Organize by date is {}",
                if state.enabled() { "on" } else { "off" }
            ));
            Ok(())
        }
    }
}

fn user_error(e: OrganizeError) -> anyhow::Error {
    out::print_error(&e.to_string());
    anyhow::Error::new(e)
}

fn watch(engine: &mut Engine) -> Result<()> {
    ctrlc::set_handler(shutdown::request).context("failed to install signal handler")?;

    if engine.start() == 0 {
        out::print_error("No folder is being watched. Add one with `tidy_watch add-folder <path>`.");
        bail!("nothing to watch");
    }
    out::print_info(&format!(
        "Watching {} folder(s); press Ctrl-C to stop.",
        engine.handles().len()
    ));

    shutdown::wait(SHUTDOWN_POLL);
    out::print_warn("Received interrupt; shutting down gracefully...");
    engine.stop();
    info!("tidy_watch stopped");
    Ok(())
}

fn print_config() {
    if let Ok(cfg_env) = std::env::var(CONFIG_ENV) {
        out::print_info(&format!("Using {CONFIG_ENV} (explicit):\n  {cfg_env}\n"));
        out::print_info(&format!("To override, unset {CONFIG_ENV} or set it to another file."));
    }
    match default_config_path() {
        Ok(p) => {
            out::print_user(&p.display().to_string());
            if p.exists() {
                out::print_info("A config file already exists at that location.");
            } else {
                out::print_info("No config file exists there yet. Any other command creates one with defaults.");
            }
        }
        Err(e) => out::print_error(&format!("Could not determine a config path: {e}")),
    }
}

fn list(config: &EngineConfig) {
    out::print_heading("Folders");
    if config.folders.is_empty() {
        out::print_user("  (none)");
    }
    for f in &config.folders {
        let exclusions = if f.exclusions.is_empty() {
            "none".to_string()
        } else {
            f.exclusions
                .iter()
                .map(|e| e.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        out::print_entry(
            &f.path.display().to_string(),
            &format!("recursive={} exclusions={exclusions}", f.recursive),
        );
    }

    out::print_heading("Categories");
    for (ext, label) in &config.categories {
        out::print_entry(ext, label);
    }

    out::print_heading("Options");
    out::print_entry("organize_by_date", &config.organize_by_date.to_string());
    out::print_entry(
        "rename_window",
        &format!("{}ms", config.tuning.rename_window.as_millis()),
    );
    out::print_entry("retry_delay", &format!("{}ms", config.tuning.retry_delay.as_millis()));
    out::print_entry("max_attempts", &config.tuning.max_attempts.to_string());
}
