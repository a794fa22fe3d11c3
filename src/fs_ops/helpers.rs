//! Hints attached to I/O failures hit while organizing a file.

use std::io;
use std::path::Path;

/// `"<op> '<path>': <error> (<hint>)"`, plus the raw OS code when there is one.
pub fn describe_io_error(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);
    if let Some(hint) = e.raw_os_error().and_then(os_hint).or_else(|| kind_hint(e.kind())) {
        msg.push_str(&format!(" ({hint})"));
    }
    if let Some(code) = e.raw_os_error() {
        msg.push_str(&format!(" [os code: {code}]"));
    }
    msg
}

#[cfg(unix)]
fn os_hint(code: i32) -> Option<&'static str> {
    match code {
        libc::EACCES | libc::EPERM => Some("this user cannot write to the watched folder or the file"),
        libc::EBUSY | libc::ETXTBSY => Some("another program still holds the file; it will be retried"),
        libc::ENOSPC => Some("no space left to create the category folder"),
        libc::EROFS => Some("the watched folder is on a read-only filesystem"),
        libc::ENAMETOOLONG => Some("the category path is too long for this filesystem"),
        _ => None,
    }
}

#[cfg(windows)]
fn os_hint(code: i32) -> Option<&'static str> {
    match code {
        5 => Some("this user cannot write to the watched folder or the file"), // ERROR_ACCESS_DENIED
        32 | 33 => Some("another program still holds the file; it will be retried"), // sharing / lock violation
        112 => Some("no space left to create the category folder"), // ERROR_DISK_FULL
        206 => Some("the category path is too long for this filesystem"), // ERROR_FILENAME_EXCED_RANGE
        _ => None,
    }
}

#[cfg(not(any(unix, windows)))]
fn os_hint(_code: i32) -> Option<&'static str> {
    None
}

fn kind_hint(kind: io::ErrorKind) -> Option<&'static str> {
    match kind {
        io::ErrorKind::PermissionDenied => Some("this user cannot write to the watched folder or the file"),
        io::ErrorKind::NotFound => Some("the path no longer exists"),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
            Some("the file is still being written; it will be retried")
        }
        _ => None,
    }
}
