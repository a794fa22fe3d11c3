//! Extension-based category resolution.
//!
//! A file name maps to a category label through a lower-cased extension lookup.
//! Extensions left behind by partial downloads and sync placeholders are never filed.

use std::collections::BTreeMap;
use std::path::Path;

/// Mapping from lower-cased extension (with the leading dot) to category label.
pub type CategoryTable = BTreeMap<String, String>;

/// Label used when the extension has no entry in the table.
pub const FALLBACK_CATEGORY: &str = "Others";

/// Files still being written or cloud placeholders; always skipped.
pub const TRANSIENT_EXTENSIONS: &[&str] = &[".tmp", ".download", ".crdownload", ".onetoc2", ".onecache"];

/// Result of resolving a file name against a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    Category(&'a str),
    Skip,
}

impl<'a> Resolution<'a> {
    pub fn category(&self) -> Option<&'a str> {
        match self {
            Resolution::Category(c) => Some(c),
            Resolution::Skip => None,
        }
    }
}

/// Lower-cased extension including the dot, e.g. `".pdf"`. Dotfiles such as `.env` have none.
pub fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
}

/// Resolve a file name to its category label, or `Skip` for transient files.
pub fn resolve<'a>(file_name: &str, table: &'a CategoryTable) -> Resolution<'a> {
    let Some(ext) = extension_of(file_name) else {
        return Resolution::Category(FALLBACK_CATEGORY);
    };
    if TRANSIENT_EXTENSIONS.contains(&ext.as_str()) {
        return Resolution::Skip;
    }
    match table.get(&ext) {
        Some(label) => Resolution::Category(label.as_str()),
        None => Resolution::Category(FALLBACK_CATEGORY),
    }
}

/// Normalize user input into a table key: trimmed, lower-cased, dot-prefixed.
pub fn normalize_extension(ext: &str) -> Option<String> {
    let trimmed = ext.trim().trim_start_matches('.');
    if trimmed.is_empty() || trimmed.contains(['/', '\\']) {
        return None;
    }
    Some(format!(".{}", trimmed.to_lowercase()))
}

/// Table shipped with a fresh configuration.
pub fn default_categories() -> CategoryTable {
    [
        (".pdf", "Documents"),
        (".doc", "Documents"),
        (".docx", "Documents"),
        (".txt", "Documents"),
        (".jpg", "Images"),
        (".jpeg", "Images"),
        (".png", "Images"),
        (".gif", "Images"),
        (".mp4", "Videos"),
        (".mkv", "Videos"),
        (".avi", "Videos"),
        (".zip", "Archives"),
        (".rar", "Archives"),
        (".py", "Code"),
        (".java", "Code"),
        (".cpp", "Code"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
