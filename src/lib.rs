//! Core library for `tidy_watch`.
//!
//! Watches folders and files new or renamed entries into category subfolders
//! (optionally dated) chosen by extension. The pieces, leaves first:
//! - `category`: extension table lookup.
//! - `placement`: destination planning and the already-organized check.
//! - `fs_ops`: the mover (access checks, collision-free names, atomic rename).
//! - `watch`: change sources, per-folder handlers, the supervisor.
//! - `engine`: context object tying config, store, sink and watchers together.

pub mod category;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs_ops;
pub mod output;
pub mod placement;
pub mod platform;
pub mod shutdown;
pub mod sink;
pub mod watch;

pub use category::{default_categories, resolve, CategoryTable, Resolution, FALLBACK_CATEGORY, TRANSIENT_EXTENSIONS};
pub use config::{
    default_config_path, default_log_path, ConfigStore, EngineConfig, FolderConfig, JsonFileStore, LogLevel,
    MemoryStore, WatchTuning,
};
pub use engine::{Engine, EngineStatus};
pub use errors::OrganizeError;
pub use fs_ops::{move_file, organize_file, resolve_destination, MoveOutcome};
pub use placement::{is_already_organized, plan, plan_with_date, Placement, Plan, SkipReason};
pub use sink::{tracing_sink, LogSink, MemorySink};
pub use watch::{ChannelSource, EventSource, FsEvent, NotifySource, WatchHandle};
