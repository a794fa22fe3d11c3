//! Atomic rename helper.
//! - Performs a single rename (never copy+delete), so a failure leaves the source intact.
//! - Refuses to replace an existing destination; collisions are resolved before calling.
//! - On Unix, best-effort fsync of the destination directory after rename.

use std::fs;
use std::io;
use std::path::Path;

pub(crate) fn try_atomic_move(src: &Path, dst: &Path) -> io::Result<()> {
    // rename(2) would silently replace; a file that appeared since planning must survive.
    if dst.try_exists()? {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("destination appeared before move: {}", dst.display()),
        ));
    }

    fs::rename(src, dst)?;

    #[cfg(unix)]
    if let Some(parent) = dst.parent() {
        // The rename already happened; a failed fsync is not reported.
        let _ = fs::File::open(parent).and_then(|d| d.sync_all());
    }

    Ok(())
}
