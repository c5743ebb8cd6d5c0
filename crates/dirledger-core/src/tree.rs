//! Scanned tree container and report statistics.

use std::path::PathBuf;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ScanWarning;
use crate::natural::{self, Collation};
use crate::node::TreeNode;
use crate::path;

/// Sentinel key for files without an extension.
pub const NO_EXTENSION: &str = "no_extension";

/// Statistics accumulated while flattening a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStats {
    /// Number of folder-header rows emitted.
    pub folder_count: u64,
    /// Deepest level seen.
    pub max_level: u32,
    /// File counts keyed by lower-cased extension with the leading dot.
    pub files_by_extension: IndexMap<String, u64>,
}

impl LedgerStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a folder header at `level`.
    pub fn record_folder(&mut self, level: u32) {
        self.folder_count += 1;
        self.max_level = self.max_level.max(level);
    }

    /// Record a file by name.
    pub fn record_file(&mut self, name: &str) {
        *self.files_by_extension.entry(extension_key(name)).or_default() += 1;
    }

    /// Raise the maximum level.
    pub fn record_level(&mut self, level: u32) {
        self.max_level = self.max_level.max(level);
    }

    /// Total number of files recorded.
    pub fn total_files(&self) -> u64 {
        self.files_by_extension.values().sum()
    }
}

/// Stats key for a file name: `.ext`, a bare `.` for names ending in a
/// dot, or [`NO_EXTENSION`].
pub fn extension_key(name: &str) -> String {
    match path::extension(name) {
        Some(ext) => format!(".{ext}"),
        None if name.trim_start_matches('.').contains('.') => ".".to_string(),
        None => NO_EXTENSION.to_string(),
    }
}

/// A file reached while walking the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Slash-joined path relative to the root, not yet normalized.
    pub relative: String,
    /// File name.
    pub name: String,
}

/// Complete scanned tree with scan metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannedTree {
    /// Root folder node; its name is the root folder's name.
    pub root: TreeNode,

    /// Root path that was scanned.
    pub root_path: PathBuf,

    /// Duration of the scan.
    pub scan_duration: Duration,

    /// Warnings encountered during scan.
    pub warnings: Vec<ScanWarning>,
}

impl ScannedTree {
    /// Create a new scanned tree.
    pub fn new(
        root: TreeNode,
        root_path: PathBuf,
        scan_duration: Duration,
        warnings: Vec<ScanWarning>,
    ) -> Self {
        Self {
            root,
            root_path,
            scan_duration,
            warnings,
        }
    }

    /// Name of the root folder.
    pub fn root_name(&self) -> &str {
        self.root.name()
    }

    /// Check if there were any warnings during scanning.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Every file in the tree, in natural order of their relative paths.
    pub fn files(&self, collation: Collation) -> Vec<FileEntry> {
        let mut out = Vec::new();
        let mut stack: Vec<(&TreeNode, String)> = vec![(&self.root, String::new())];

        while let Some((folder, prefix)) = stack.pop() {
            for child in folder.children() {
                let relative = path::join(&prefix, child.name());
                if child.is_folder() {
                    stack.push((child, relative));
                } else {
                    out.push(FileEntry {
                        relative,
                        name: child.name().to_string(),
                    });
                }
            }
        }

        out.sort_by(|a, b| natural::compare_with(&a.relative, &b.relative, collation));
        out
    }
}
