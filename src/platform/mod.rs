//! Platform-specific helpers.
//! This module hides OS differences (Unix/Windows) behind a uniform API so
//! the rest of the codebase can remain platform-agnostic.

mod temp;
#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod windows;

/// Access the current process needs on a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    ReadWrite,
}

#[cfg(unix)]
pub use unix::{has_access, open_log_file_secure_append, set_dir_mode_0700, write_config_atomic};

#[cfg(not(unix))]
pub use windows::{has_access, open_log_file_secure_append, set_dir_mode_0700, write_config_atomic};
