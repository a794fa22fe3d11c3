//! Process-wide shutdown coordination.
//! The Ctrl-C handler sets a flag; the watch loop polls it and then stops the engine
//! on the main thread.
//!
//! Notes:
//! - Relaxed atomics are sufficient for a one-way "stop" flag.
//! - `request()` is safe to call from signal handlers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Request a cooperative shutdown (idempotent).
#[inline]
pub fn request() {
    SHUTDOWN.store(true, Ordering::Relaxed);
}

/// Check whether a shutdown has been requested.
#[inline]
pub fn is_requested() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

/// Block until a shutdown is requested, checking every `poll`.
pub fn wait(poll: Duration) {
    while !is_requested() {
        thread::sleep(poll);
    }
}

/// Clear the flag (tests, or embedders that run the engine more than once).
#[inline]
pub fn reset() {
    SHUTDOWN.store(false, Ordering::Relaxed);
}
