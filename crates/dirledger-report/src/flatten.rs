//! Hierarchy flattening.
//!
//! Turns the ordered tree into the flat row sequence rendered by the sinks.
//! Traversal is pre-order with an explicit work stack:
//!
//! 1. a folder emits its header row at its level,
//! 2. then every sub-folder subtree one level deeper,
//! 3. then a separator row when it has both sub-folders and files,
//! 4. then its own files one level deeper.
//!
//! The root itself has no header. Its sub-folders start at level 1 and its
//! files follow the whole traversal at level 1, after one separator when
//! the root has sub-folders as well.

use serde::{Deserialize, Serialize};

use dirledger_core::{
    LedgerConfig, LedgerStats, MetadataIndex, PathNormalizer, TreeNode, path,
};

/// One emitted report row.
///
/// The label is the bare entry name; indentation is added by the sinks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRow {
    pub label: String,
    pub level: u32,
    pub pages: String,
    pub page_size: String,
    pub text_orientation: String,
    pub char_count: String,
    pub is_separator: bool,
    pub is_folder_header: bool,
    pub is_archive: bool,
}

impl FlatRow {
    /// Header row for a folder.
    pub fn folder_header(label: impl Into<String>, level: u32) -> Self {
        Self {
            label: label.into(),
            level,
            is_folder_header: true,
            ..Self::default()
        }
    }

    /// Header row for a folder that could not be listed; the listing error
    /// takes the page orientation cell, as inspection errors do for files.
    pub fn unreadable_folder(label: impl Into<String>, level: u32, error: &str) -> Self {
        Self {
            page_size: format!("Error: {error}"),
            ..Self::folder_header(label, level)
        }
    }

    /// Blank separator row.
    pub fn separator(level: u32) -> Self {
        Self {
            level,
            is_separator: true,
            ..Self::default()
        }
    }

    /// Whether this is a plain file row.
    pub fn is_file(&self) -> bool {
        !self.is_separator && !self.is_folder_header
    }
}

/// Flattened rows with the statistics gathered on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatReport {
    pub rows: Vec<FlatRow>,
    pub stats: LedgerStats,
}

impl FlatReport {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows were emitted.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Pending traversal step.
enum Step<'t> {
    Folder {
        node: &'t TreeNode,
        level: u32,
        path: String,
    },
    Separator(u32),
    Files {
        node: &'t TreeNode,
        level: u32,
        path: String,
    },
}

/// Flattens a tree against a metadata index.
#[derive(Debug, Clone)]
pub struct Flattener<'c> {
    config: &'c LedgerConfig,
    normalizer: PathNormalizer,
}

impl<'c> Flattener<'c> {
    /// Create a flattener; lookups use the same normalizer as indexing.
    pub fn new(config: &'c LedgerConfig) -> Self {
        Self {
            normalizer: config.normalizer(),
            config,
        }
    }

    /// Flatten `root` into rows and stats.
    pub fn flatten(&self, root: &TreeNode, index: &MetadataIndex) -> FlatReport {
        let mut report = FlatReport::default();
        let mut stack = Vec::new();

        // Root files last, so they are pushed first.
        stack.push(Step::Files {
            node: root,
            level: 1,
            path: String::new(),
        });
        self.push_children(&mut stack, root, 1, "");

        while let Some(step) = stack.pop() {
            match step {
                Step::Folder { node, level, path } => {
                    let header = match node.error() {
                        Some(error) => FlatRow::unreadable_folder(node.name(), level, error),
                        None => FlatRow::folder_header(node.name(), level),
                    };
                    report.rows.push(header);
                    report.stats.record_folder(level);

                    stack.push(Step::Files {
                        node,
                        level: level + 1,
                        path: path.clone(),
                    });
                    self.push_children(&mut stack, node, level, &path);
                }
                Step::Separator(level) => report.rows.push(FlatRow::separator(level)),
                Step::Files { node, level, path } => {
                    self.emit_files(&mut report, node, level, &path, index);
                }
            }
        }

        tracing::debug!(
            rows = report.rows.len(),
            folders = report.stats.folder_count,
            max_level = report.stats.max_level,
            "hierarchy flattened"
        );
        report
    }

    /// Push the separator and sub-folder steps of `node`, whose own level
    /// is `level` (its sub-folders go one level deeper, except under the
    /// root where both are 1).
    fn push_children<'t>(
        &self,
        stack: &mut Vec<Step<'t>>,
        node: &'t TreeNode,
        level: u32,
        path: &str,
    ) {
        let is_root = path.is_empty();
        let has_files = node.files().next().is_some();
        let mut subfolders = node.subfolders().peekable();
        let has_subfolders = subfolders.peek().is_some();

        if has_subfolders && has_files {
            stack.push(Step::Separator(level));
        }

        let child_level = if is_root { level } else { level + 1 };
        let children: Vec<&TreeNode> = subfolders.collect();
        for child in children.into_iter().rev() {
            stack.push(Step::Folder {
                node: child,
                level: child_level,
                path: path::join(path, child.name()),
            });
        }
    }

    fn emit_files(
        &self,
        report: &mut FlatReport,
        folder: &TreeNode,
        level: u32,
        folder_path: &str,
        index: &MetadataIndex,
    ) {
        for file in folder.files() {
            let name = file.name();
            let key = self.normalizer.normalize(&path::join(folder_path, name));
            let record = index.lookup(&key);

            let pages = if self.config.is_paged(name) {
                record.pages_cell()
            } else {
                String::new()
            };

            report.rows.push(FlatRow {
                label: name.to_string(),
                level,
                pages,
                page_size: record.page_orientation_cell(),
                text_orientation: record.text_orientation_cell(),
                char_count: record.char_count_cell(),
                is_separator: false,
                is_folder_header: false,
                is_archive: self.config.is_archive(name),
            });

            report.stats.record_file(name);
            if folder_path.is_empty() {
                report.stats.record_level(level);
            }
        }
    }
}
