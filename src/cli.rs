//! CLI definition and parsing.
//! Defines Args and the subcommands that drive the engine and edit the config.
//!
//! Notes:
//! - Running without a subcommand is the same as `watch`.
//! - --debug is a shorthand for --log-level debug.

use clap::{Parser, Subcommand, ValueEnum, ValueHint};
use std::path::{Path, PathBuf};

use tidy_watch::LogLevel;

/// Watch folders and file new or renamed files into category subfolders.
/// Settings live in a JSON config file (see `print-config`).
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Watch folders and organize files by extension")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'd',
        long,
        global = true,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, global = true, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Write logs to this file in addition to stdout.
    #[arg(long, global = true, value_hint = ValueHint::FilePath, help = "Also write logs to this file")]
    pub log_file: Option<PathBuf>,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, global = true, help = "Emit logs in structured JSON")]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Watch the configured folders until interrupted.
    Watch,
    /// Print the config file location and exit.
    PrintConfig,
    /// List monitored folders, their settings and the category table.
    List,
    /// Start monitoring a folder (recursive, no exclusions).
    AddFolder {
        #[arg(value_hint = ValueHint::DirPath)]
        path: PathBuf,
    },
    /// Stop monitoring a folder.
    RemoveFolder {
        #[arg(value_hint = ValueHint::DirPath)]
        path: PathBuf,
    },
    /// Change the settings of a monitored folder.
    SetFolder {
        #[arg(value_hint = ValueHint::DirPath)]
        path: PathBuf,
        /// Watch subfolders too (true/false).
        #[arg(long)]
        recursive: Option<bool>,
        /// Add an excluded subfolder (absolute, or relative to the folder). Repeatable.
        #[arg(long = "exclude", value_name = "DIR", value_hint = ValueHint::DirPath)]
        exclude: Vec<PathBuf>,
        /// Remove an excluded subfolder. Repeatable.
        #[arg(long = "include", value_name = "DIR", value_hint = ValueHint::DirPath)]
        include: Vec<PathBuf>,
    },
    /// Map an extension to a category folder, e.g. `add-category .xlsx Spreadsheets`.
    AddCategory { extension: String, label: String },
    /// Remove an extension mapping; such files then go to "Others".
    RemoveCategory { extension: String },
    /// Turn dated subfolders (`Category/YYYY-MM-DD`) on or off.
    OrganizeByDate {
        #[arg(value_enum)]
        state: Toggle,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        matches!(self, Toggle::On)
    }
}

impl Args {
    /// Subcommand to run; `watch` when none was given.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Watch)
    }

    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }
}

/// Strip quotes a shell left around a pasted path, plus one trailing separator.
pub fn sanitize_path(p: &Path) -> PathBuf {
    let raw = p.to_string_lossy();
    let mut inner: String = raw
        .trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .to_string();
    if (inner.ends_with('/') || inner.ends_with('\\')) && inner.len() > 1 {
        inner.pop();
    }
    PathBuf::from(inner)
}

/// Make `exclusion` absolute by anchoring relative values at `folder`.
pub fn anchor_exclusion(folder: &Path, exclusion: &Path) -> PathBuf {
    let cleaned = sanitize_path(exclusion);
    if cleaned.is_absolute() {
        cleaned
    } else {
        folder.join(cleaned)
    }
}

pub fn parse() -> Args {
    Args::parse()
}
