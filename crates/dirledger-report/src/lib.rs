//! Report engine for dirledger.
//!
//! Flattens an ordered folder/file tree and its metadata index into the
//! row sequence of the inventory report, styles each row and hands the
//! result to a sink:
//!
//! - [`Flattener`] produces [`FlatRow`]s and [`dirledger_core::LedgerStats`]
//! - [`style::classify`] assigns presentation classes and level colors
//! - [`sink`] writes text, JSON, spreadsheet grid or HTML output
//! - [`ScratchStore`] persists the interchange file between stages
//!
//! # Example
//!
//! ```rust
//! use dirledger_core::{LedgerConfig, MetadataIndex, TreeNode};
//! use dirledger_report::Flattener;
//!
//! let root = TreeNode::folder(
//!     "root",
//!     vec![TreeNode::folder("A", vec![TreeNode::file("a.txt")])],
//! );
//! let config = LedgerConfig::new("/data");
//! let report = Flattener::new(&config).flatten(&root, &MetadataIndex::new());
//!
//! assert_eq!(report.rows.len(), 2);
//! assert_eq!(report.stats.folder_count, 1);
//! ```

mod error;
mod flatten;
mod scratch;
pub mod sink;
pub mod style;

pub use error::{RenderFailure, ScratchError, SinkError};
pub use flatten::{FlatReport, FlatRow, Flattener};
pub use scratch::{ScratchDocument, ScratchItem, ScratchStore, write_document};
pub use sink::{ReportSink, Rendered, SinkFormat, Summary, render};
pub use style::{PresentationClass, RowStyle, classify};

// Re-export core types for convenience
pub use dirledger_core::LedgerStats;
