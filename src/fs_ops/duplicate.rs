//! Duplicate-name resolution.
//!
//! Policy: keep the source name; when taken, append `_1`, `_2`, ... before the
//! extension until a free name is found. Existing files are never overwritten and no
//! content comparison is made.
//!
//! Notes:
//! - This only decides the path name based on current filesystem state; the mover
//!   re-checks the destination right before renaming.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::trace;

/// Pick the destination path for `name` inside `dst_dir`.
///
/// Examples:
/// - "report.pdf" -> "report.pdf", then "report_1.pdf", "report_2.pdf", ...
/// - ".env" -> ".env_1"
/// - "archive.tar.gz" -> "archive.tar_1.gz"
pub fn resolve_destination(dst_dir: &Path, name: &OsStr) -> PathBuf {
    let candidate = dst_dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let base = Path::new(name);
    let stem: OsString = base
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from(name));
    let ext: Option<OsString> = base.extension().map(|e| e.to_os_string());

    let mut n: u64 = 1;
    loop {
        let new_name = build_name_with_suffix(&stem, ext.as_deref(), &format!("_{n}"));
        let candidate = dst_dir.join(&new_name);
        if !candidate.exists() {
            return candidate;
        }
        if n % 100 == 0 {
            trace!(name = ?name, dir = %dst_dir.display(), n, "duplicate: still searching for a free suffix");
        }
        n = n.saturating_add(1);
    }
}

// Conservative filename limits (bytes/characters, platform-specific and approximate).
#[cfg(windows)]
const MAX_FILENAME_LEN: usize = 240;
#[cfg(not(windows))]
const MAX_FILENAME_LEN: usize = 255;

#[cfg(unix)]
fn name_len_units(s: &OsStr) -> usize {
    use std::os::unix::ffi::OsStrExt;
    s.as_bytes().len()
}

#[cfg(windows)]
fn name_len_units(s: &OsStr) -> usize {
    s.to_string_lossy().len()
}

/// Join `stem + suffix + ["." + ext]`, truncating the stem so the result fits MAX_FILENAME_LEN.
fn build_name_with_suffix(stem: &OsStr, ext: Option<&OsStr>, suffix: &str) -> OsString {
    let mut overhead = name_len_units(OsStr::new(suffix));
    let mut ext_part = OsString::new();
    if let Some(e) = ext {
        overhead = overhead.saturating_add(1 + name_len_units(e));
        ext_part.push(".");
        ext_part.push(e);
    }

    let mut stem_os = stem.to_os_string();
    if name_len_units(&stem_os) + overhead > MAX_FILENAME_LEN {
        let budget = MAX_FILENAME_LEN.saturating_sub(overhead).max(1);
        let lossy = stem.to_string_lossy();
        let mut acc = String::new();
        for ch in lossy.chars() {
            acc.push(ch);
            if name_len_units(OsStr::new(&acc)) > budget {
                acc.pop();
                break;
            }
        }
        if acc.is_empty() {
            acc.push('f');
        }
        stem_os = OsString::from(acc);
    }

    let mut new_name = OsString::new();
    new_name.push(&stem_os);
    new_name.push(suffix);
    new_name.push(&ext_part);
    new_name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_stem_is_truncated_to_fit() {
        let stem = "a".repeat(300);
        let name = build_name_with_suffix(OsStr::new(&stem), Some(OsStr::new("txt")), "_1");
        assert!(name_len_units(&name) <= MAX_FILENAME_LEN);
        assert!(name.to_string_lossy().ends_with("_1.txt"));
    }
}
