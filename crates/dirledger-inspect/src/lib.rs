//! Document inspection and metadata indexing for dirledger.
//!
//! This crate reads page counts and layout facts from documents and
//! collects them into the [`MetadataIndex`] used by the report engine:
//!
//! - **PDF**: page count and first-page orientation
//! - **DOCX**: page and character counts, section orientation
//! - **XLSX**: worksheet count
//!
//! Inspection runs on a bounded worker pool. A document that cannot be
//! read never aborts the run; it is recorded with zero pages and the
//! failure reason.

mod error;
mod index;
mod inspector;
mod office;
mod pdf;

pub use error::{IndexError, InspectError};
pub use index::{CancelToken, IndexOutcome, MetadataIndexBuilder};
pub use inspector::{DocumentFacts, DocumentInspector, FileInspector, InspectionOutcome};

// Re-export core types for convenience
pub use dirledger_core::{MetadataIndex, MetadataRecord, PageOrientation};
