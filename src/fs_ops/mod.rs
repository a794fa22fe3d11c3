//! Filesystem operations: the mover, duplicate naming and I/O error hints.

mod atomic;
mod duplicate;
mod file_move;
mod helpers;

pub use duplicate::resolve_destination;
pub use file_move::{move_file, organize_file, MoveOutcome};
pub use helpers::describe_io_error;
