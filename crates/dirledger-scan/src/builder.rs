//! Iterative tree builder.

use std::path::{Path, PathBuf};
use std::time::Instant;

use compact_str::CompactString;

use dirledger_core::{
    IgnoreSet, LedgerConfig, ScanError, ScanWarning, ScannedTree, TreeNode, natural,
};

use crate::source::{FsSource, SourceEntry, TreeSource, ZipSource};

/// Builds an ordered [`TreeNode`] from a [`TreeSource`].
///
/// Traversal uses an explicit work stack, so deep trees do not grow the
/// call stack. Folders that cannot be listed are kept with an error marker
/// and the walk carries on with their siblings.
pub struct TreeBuilder {
    config: LedgerConfig,
    ignore: IgnoreSet,
}

/// A folder whose children are still being collected.
struct PendingFolder {
    name: CompactString,
    relative: PathBuf,
    subfolders: Vec<usize>,
    files: Vec<CompactString>,
    error: Option<CompactString>,
}

impl TreeBuilder {
    /// Create a builder; fails if the ignore patterns do not compile.
    pub fn new(config: LedgerConfig) -> Result<Self, ScanError> {
        let ignore = config.ignore_set()?;
        Ok(Self { config, ignore })
    }

    /// Configuration in use.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Scan the configured root, opening a zip archive when the root is one.
    pub fn scan(&self) -> Result<ScannedTree, ScanError> {
        let root = &self.config.root;
        if root.is_file() && is_zip(root) {
            let source = ZipSource::open(root, &self.ignore)?;
            self.build(&source)
        } else {
            let source = FsSource::open(root)?.follow_symlinks(self.config.follow_symlinks);
            self.build(&source)
        }
    }

    /// Build the tree from any source.
    pub fn build(&self, source: &dyn TreeSource) -> Result<ScannedTree, ScanError> {
        let start = Instant::now();
        let mut warnings = Vec::new();

        let mut arena = vec![PendingFolder {
            name: source.root_name().into(),
            relative: PathBuf::new(),
            subfolders: Vec::new(),
            files: Vec::new(),
            error: None,
        }];
        let mut stack = vec![0usize];

        while let Some(index) = stack.pop() {
            let relative = arena[index].relative.clone();
            let entries = match source.list(&relative) {
                Ok(entries) => entries,
                Err(err) => {
                    let warning = ScanWarning::from_scan_error(&err);
                    tracing::warn!(path = %warning.path.display(), "{}", warning.message);
                    arena[index].error = Some(warning.marker().into());
                    warnings.push(warning);
                    continue;
                }
            };

            let (mut dirs, mut files) = self.partition(entries);
            dirs.sort_by(|a, b| natural::compare_with(a, b, self.config.collation));
            files.sort_by(|a, b| natural::compare_with(a, b, self.config.collation));

            for name in dirs {
                let child = arena.len();
                arena.push(PendingFolder {
                    relative: relative.join(name.as_str()),
                    name,
                    subfolders: Vec::new(),
                    files: Vec::new(),
                    error: None,
                });
                arena[index].subfolders.push(child);
                stack.push(child);
            }
            arena[index].files = files;
        }

        let root = assemble(arena);
        tracing::debug!(
            folders = root.folder_count(),
            files = root.file_count(),
            "tree built"
        );

        Ok(ScannedTree::new(
            root,
            source.root_path().to_path_buf(),
            start.elapsed(),
            warnings,
        ))
    }

    /// Split a listing into folder names and kept file names.
    fn partition(&self, entries: Vec<SourceEntry>) -> (Vec<CompactString>, Vec<CompactString>) {
        let mut dirs = Vec::new();
        let mut files = Vec::new();
        for entry in entries {
            if entry.is_dir {
                dirs.push(entry.name);
            } else if !self.ignore.is_ignored(&entry.name) {
                files.push(entry.name);
            }
        }
        (dirs, files)
    }
}

/// Turn the arena into nested nodes without recursion.
///
/// Children always have larger indices than their parent, so walking the
/// arena backwards finishes every child before its parent.
fn assemble(arena: Vec<PendingFolder>) -> TreeNode {
    let mut built: Vec<Option<TreeNode>> = Vec::with_capacity(arena.len());
    built.resize_with(arena.len(), || None);

    for (index, pending) in arena.into_iter().enumerate().rev() {
        let node = match pending.error {
            Some(error) => TreeNode::unreadable(pending.name, error),
            None => {
                let mut children: Vec<TreeNode> = pending
                    .subfolders
                    .iter()
                    .filter_map(|&i| built[i].take())
                    .collect();
                children.extend(pending.files.into_iter().map(TreeNode::file));
                TreeNode::folder(pending.name, children)
            }
        };
        built[index] = Some(node);
    }

    built
        .into_iter()
        .next()
        .flatten()
        .unwrap_or_else(|| TreeNode::folder("", Vec::new()))
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// In-memory source for exercising the builder.
    struct MapSource {
        root: PathBuf,
        dirs: HashMap<String, Vec<SourceEntry>>,
        denied: Vec<String>,
    }

    impl TreeSource for MapSource {
        fn root_name(&self) -> String {
            "root".to_string()
        }

        fn root_path(&self) -> &Path {
            &self.root
        }

        fn list(&self, dir: &Path) -> Result<Vec<SourceEntry>, ScanError> {
            let key = dir.to_string_lossy().replace('\\', "/");
            if self.denied.contains(&key) {
                return Err(ScanError::PermissionDenied {
                    path: self.root.join(dir),
                });
            }
            self.dirs.get(&key).cloned().ok_or(ScanError::NotFound {
                path: self.root.join(dir),
            })
        }
    }

    fn source() -> MapSource {
        let mut dirs = HashMap::new();
        dirs.insert(
            String::new(),
            vec![
                SourceEntry::file("r.docx"),
                SourceEntry::dir("Z"),
                SourceEntry::dir("A"),
                SourceEntry::file("lock.db"),
            ],
        );
        dirs.insert(
            "A".to_string(),
            vec![SourceEntry::file("b.pdf"), SourceEntry::file("a.txt")],
        );
        dirs.insert("Z".to_string(), vec![SourceEntry::dir("locked")]);
        MapSource {
            root: PathBuf::from("/virtual"),
            dirs,
            denied: vec!["Z/locked".to_string()],
        }
    }

    #[test]
    fn test_build_orders_and_ignores() {
        let builder = TreeBuilder::new(LedgerConfig::new("/virtual")).unwrap();
        let tree = builder.build(&source()).unwrap();

        let names: Vec<&str> = tree.root.children().iter().map(TreeNode::name).collect();
        assert_eq!(names, vec!["A", "Z", "r.docx"]);

        let a: Vec<&str> = tree.root.children()[0]
            .children()
            .iter()
            .map(TreeNode::name)
            .collect();
        assert_eq!(a, vec!["a.txt", "b.pdf"]);
    }

    #[test]
    fn test_permission_denied_is_local() {
        let builder = TreeBuilder::new(LedgerConfig::new("/virtual")).unwrap();
        let tree = builder.build(&source()).unwrap();

        let locked = &tree.root.children()[1].children()[0];
        assert_eq!(locked.name(), "locked");
        assert_eq!(locked.error(), Some("Permission denied"));
        assert_eq!(tree.warnings.len(), 1);
        // Siblings were still listed.
        assert_eq!(tree.root.children()[0].children().len(), 2);
    }

    #[test]
    fn test_deep_tree_does_not_recurse() {
        let mut dirs = HashMap::new();
        let mut path = String::new();
        for depth in 0..2000 {
            let name = format!("d{depth}");
            dirs.insert(path.clone(), vec![SourceEntry::dir(name.as_str())]);
            path = dirledger_core::path::join(&path, &name);
        }
        dirs.insert(path, vec![SourceEntry::file("leaf.pdf")]);
        let source = MapSource {
            root: PathBuf::from("/deep"),
            dirs,
            denied: Vec::new(),
        };

        let builder = TreeBuilder::new(LedgerConfig::new("/deep")).unwrap();
        let tree = builder.build(&source).unwrap();
        assert_eq!(tree.root.folder_count(), 2001);
        assert_eq!(tree.root.file_count(), 1);
    }
}
