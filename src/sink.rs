//! Log sink: where the engine reports one human-readable line per notable event.
//! The sink is a plain callback so front ends can route lines wherever they like.

use std::sync::{Arc, Mutex};
use tracing::info;

/// Callback receiving one line per notable event. Called from worker threads.
pub type LogSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Sink forwarding every line to `tracing` at info level.
pub fn tracing_sink() -> LogSink {
    Arc::new(|line: &str| info!(target: "tidy_watch::activity", "{line}"))
}

/// Sink collecting lines in memory, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A [`LogSink`] appending to this collector.
    pub fn sink(&self) -> LogSink {
        let lines = Arc::clone(&self.lines);
        Arc::new(move |line: &str| {
            if let Ok(mut v) = lines.lock() {
                v.push(line.to_string());
            }
        })
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// True if any collected line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.lines().iter().filter(|l| l.contains(needle)).count()
    }
}
