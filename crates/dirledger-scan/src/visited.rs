//! Directory tracking for symlink cycle detection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashSet;

/// Canonical paths of directories already entered during a scan.
///
/// Clones share one set.
#[derive(Debug, Clone, Default)]
pub struct VisitedDirs {
    seen: Arc<DashSet<PathBuf>>,
}

impl VisitedDirs {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a canonical directory path. Returns `true` the first time.
    pub fn track(&self, dir: PathBuf) -> bool {
        self.seen.insert(dir)
    }

    /// Check if a directory has been tracked.
    pub fn has_seen(&self, dir: &Path) -> bool {
        self.seen.contains(dir)
    }

    /// Number of distinct directories tracked.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Check if nothing has been tracked.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
