//! Tree building for dirledger.
//!
//! This crate turns a directory, or the entry listing of a zip archive,
//! into the ordered folder/file tree consumed by the report engine:
//!
//! - **Iterative traversal** with an explicit work stack
//! - **Natural ordering** of sibling names, folders before files
//! - **Ignore globs** for files such as `*.db` lock files
//! - **Localized failures**: unreadable folders keep an error marker
//! - **Symlink safety**: links are leaves unless following is enabled, and
//!   followed links are entered once per target directory
//!
//! # Example
//!
//! ```rust,no_run
//! use dirledger_scan::{LedgerConfig, TreeBuilder};
//!
//! let builder = TreeBuilder::new(LedgerConfig::new("/path/to/scan")).unwrap();
//! let tree = builder.scan().unwrap();
//!
//! println!("Folders: {}", tree.root.folder_count());
//! println!("Files: {}", tree.root.file_count());
//! ```

mod builder;
mod source;
mod visited;

pub use builder::TreeBuilder;
pub use source::{FsSource, SourceEntry, TreeSource, ZipSource};
pub use visited::VisitedDirs;

// Re-export core types for convenience
pub use dirledger_core::{LedgerConfig, ScanError, ScanWarning, ScannedTree, TreeNode, WarningKind};
