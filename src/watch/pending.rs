//! Recently deleted paths, kept briefly so a create in the same directory can be
//! reported as a rename. Entries expire lazily when the map is consulted.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct PendingDeletions {
    window: Duration,
    entries: HashMap<PathBuf, Instant>,
}

impl PendingDeletions {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: HashMap::new(),
        }
    }

    pub fn record(&mut self, path: PathBuf, at: Instant) {
        self.entries.insert(path, at);
    }

    /// Consume the freshest deletion in `created`'s directory younger than the window.
    /// Stale entries met along the way are evicted.
    pub fn take_rename_source(&mut self, created: &Path, now: Instant) -> Option<PathBuf> {
        let window = self.window;
        self.entries
            .retain(|_, at| now.saturating_duration_since(*at) < window);

        let dir = created.parent()?;
        let source = self
            .entries
            .iter()
            .filter(|(p, _)| p.parent() == Some(dir) && p.as_path() != created)
            .max_by_key(|(_, at)| **at)
            .map(|(p, _)| p.clone())?;
        self.entries.remove(&source);
        Some(source)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(5);

    #[test]
    fn create_in_same_dir_consumes_deletion() {
        let mut p = PendingDeletions::new(WINDOW);
        let t0 = Instant::now();
        p.record(PathBuf::from("/w/old.txt"), t0);
        let src = p.take_rename_source(Path::new("/w/new.txt"), t0 + Duration::from_secs(2));
        assert_eq!(src, Some(PathBuf::from("/w/old.txt")));
        assert!(p.is_empty());
    }

    #[test]
    fn other_directory_does_not_match() {
        let mut p = PendingDeletions::new(WINDOW);
        let t0 = Instant::now();
        p.record(PathBuf::from("/w/sub/old.txt"), t0);
        assert_eq!(p.take_rename_source(Path::new("/w/new.txt"), t0), None);
        assert!(p.contains(Path::new("/w/sub/old.txt")));
    }

    #[test]
    fn stale_entries_expire_on_lookup() {
        let mut p = PendingDeletions::new(WINDOW);
        let t0 = Instant::now();
        p.record(PathBuf::from("/w/old.txt"), t0);
        p.record(PathBuf::from("/x/other.txt"), t0);
        let later = t0 + Duration::from_secs(6);
        assert_eq!(p.take_rename_source(Path::new("/w/new.txt"), later), None);
        assert_eq!(p.len(), 0);
    }

    #[test]
    fn freshest_deletion_wins() {
        let mut p = PendingDeletions::new(WINDOW);
        let t0 = Instant::now();
        p.record(PathBuf::from("/w/first.txt"), t0);
        p.record(PathBuf::from("/w/second.txt"), t0 + Duration::from_secs(1));
        let src = p.take_rename_source(Path::new("/w/new.txt"), t0 + Duration::from_secs(2));
        assert_eq!(src, Some(PathBuf::from("/w/second.txt")));
        assert!(p.contains(Path::new("/w/first.txt")));
    }
}
