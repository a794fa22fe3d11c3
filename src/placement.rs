//! Destination planning.
//! Decides where a file belongs under its watched root (category, optionally a dated
//! subfolder) and whether it already sits there.

use chrono::{DateTime, Local};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

use crate::category::{resolve, CategoryTable, Resolution};

/// Where a file should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub category: String,
    /// `YYYY-MM-DD` segment when organizing by date and the creation time was readable.
    pub date: Option<String>,
    pub target_dir: PathBuf,
}

impl Plan {
    /// Human label of the destination relative to the root, e.g. `Images/2024-03-02`.
    pub fn label(&self) -> String {
        match &self.date {
            Some(d) => format!("{}/{}", self.category, d),
            None => self.category.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Already inside its category folder (label attached).
    AlreadyOrganized(String),
    /// Transient or sync-placeholder extension.
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Move(Plan),
    Skip(SkipReason),
}

/// Lexically clean a path: `.`/`..` collapsed and verbatim prefixes simplified.
/// Case is preserved, so the result is suitable for storing.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in dunce::simplified(path).components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// [`clean_path`] plus case folding on Windows; use for comparisons only.
pub fn normalize_path(path: &Path) -> PathBuf {
    let out = clean_path(path);
    if cfg!(windows) {
        PathBuf::from(out.to_string_lossy().to_lowercase())
    } else {
        out
    }
}

/// True when `path` equals `ancestor` or lies beneath it (component-wise, normalized).
pub fn is_within(path: &Path, ancestor: &Path) -> bool {
    normalize_path(path).starts_with(normalize_path(ancestor))
}

fn file_name_of(file: &Path) -> String {
    file.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// True if the file is already inside `root/<category>` (or below it, e.g. a dated
/// folder), or if its type must never be touched.
///
/// A file lying directly in the root is never considered organized.
pub fn is_already_organized(file: &Path, root: &Path, table: &CategoryTable) -> bool {
    let name = file_name_of(file);
    let Resolution::Category(category) = resolve(&name, table) else {
        return true;
    };

    let current = normalize_path(file.parent().unwrap_or(Path::new("")));
    let expected = normalize_path(&root.join(category));
    let root_norm = normalize_path(root);

    let organized = current.starts_with(&expected) && current != root_norm;
    if organized {
        debug!(file = %name, category, "already in correct folder");
    } else {
        debug!(
            file = %name,
            current = %current.display(),
            expected = %expected.display(),
            root = %root_norm.display(),
            "needs organizing"
        );
    }
    organized
}

/// Format a timestamp as a local calendar date (`YYYY-MM-DD`).
pub fn date_segment(t: SystemTime) -> String {
    DateTime::<Local>::from(t).format("%Y-%m-%d").to_string()
}

/// Local creation date of the file, if the platform and filesystem expose it.
pub fn creation_date(file: &Path) -> Option<String> {
    match fs::metadata(file).and_then(|m| m.created()) {
        Ok(t) => Some(date_segment(t)),
        Err(e) => {
            warn!(file = %file.display(), error = %e, "creation time unavailable; filing without date");
            None
        }
    }
}

/// Plan the destination for `file` under `root`.
pub fn plan(file: &Path, root: &Path, table: &CategoryTable, organize_by_date: bool) -> Placement {
    // Skip the metadata read for files that will not move anyway.
    if is_already_organized(file, root, table) {
        return plan_with_date(file, root, table, None);
    }
    let date = if organize_by_date { creation_date(file) } else { None };
    plan_with_date(file, root, table, date)
}

/// Same as [`plan`] with the date segment supplied by the caller.
pub fn plan_with_date(file: &Path, root: &Path, table: &CategoryTable, date: Option<String>) -> Placement {
    let name = file_name_of(file);
    let category = match resolve(&name, table) {
        Resolution::Skip => return Placement::Skip(SkipReason::Unsupported),
        Resolution::Category(c) => c.to_string(),
    };
    if is_already_organized(file, root, table) {
        return Placement::Skip(SkipReason::AlreadyOrganized(category));
    }

    let mut target_dir = root.join(&category);
    if let Some(d) = &date {
        target_dir.push(d);
    }
    Placement::Move(Plan {
        category,
        date,
        target_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::default_categories;

    #[test]
    fn loose_file_in_root_is_not_organized() {
        let table = default_categories();
        assert!(!is_already_organized(Path::new("/watch/a.pdf"), Path::new("/watch"), &table));
    }

    #[test]
    fn file_in_category_or_dated_folder_is_organized() {
        let table = default_categories();
        let root = Path::new("/watch");
        assert!(is_already_organized(Path::new("/watch/Documents/a.pdf"), root, &table));
        assert!(is_already_organized(Path::new("/watch/Images/2024-03-02/p.jpg"), root, &table));
        assert!(!is_already_organized(Path::new("/watch/Images/a.pdf"), root, &table));
    }

    #[test]
    fn sibling_with_shared_prefix_is_not_a_match() {
        let table = default_categories();
        assert!(!is_already_organized(
            Path::new("/watch/Documents2/a.pdf"),
            Path::new("/watch"),
            &table
        ));
    }

    #[test]
    fn transient_counts_as_organized() {
        let table = default_categories();
        assert!(is_already_organized(Path::new("/watch/x.crdownload"), Path::new("/watch"), &table));
    }

    #[test]
    fn dated_plan_appends_segment() {
        let table = default_categories();
        let placement = plan_with_date(
            Path::new("/watch/photo.jpg"),
            Path::new("/watch"),
            &table,
            Some("2024-03-02".into()),
        );
        let Placement::Move(p) = placement else { panic!("expected move") };
        assert_eq!(p.target_dir, PathBuf::from("/watch/Images/2024-03-02"));
        assert_eq!(p.label(), "Images/2024-03-02");
    }

    #[test]
    fn date_segment_uses_local_calendar_day() {
        use chrono::TimeZone;
        let noon = Local.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).single().unwrap();
        assert_eq!(date_segment(SystemTime::from(noon)), "2024-03-02");
    }

    #[test]
    fn normalize_collapses_dots() {
        assert_eq!(normalize_path(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
    }
}
