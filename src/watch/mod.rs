//! Folder watching: change sources, per-folder handlers and the supervisor that
//! starts and stops them.

pub mod handler;
pub mod pending;
pub mod source;
pub mod supervisor;

pub use handler::{FolderWatchHandler, HandlerState, Task};
pub use pending::PendingDeletions;
pub use source::{translate, ChannelSource, EventSource, FsEvent, NotifySource, Subscription, Translator};
pub use supervisor::{start, stop, WatchHandle};
