//! Core types and rules for dirledger.
//!
//! This crate provides the data structures shared by the scanner, the
//! document inspector and the report engine: the ordered folder/file tree,
//! the per-file metadata index, the natural name ordering, path
//! normalization and the run configuration.

mod config;
mod error;
mod metadata;
pub mod natural;
mod node;
pub mod path;
mod tree;

pub use config::{IgnoreSet, LedgerConfig, LedgerConfigBuilder};
pub use error::{ScanError, ScanWarning, WarningKind};
pub use metadata::{MetadataIndex, MetadataRecord, PageOrientation};
pub use natural::Collation;
pub use node::{TreeNode, order_children};
pub use path::PathNormalizer;
pub use tree::{FileEntry, LedgerStats, NO_EXTENSION, ScannedTree, extension_key};
