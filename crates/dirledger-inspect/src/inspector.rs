//! Document inspector boundary.

use std::path::Path;

use dirledger_core::{MetadataRecord, PageOrientation, path};

use crate::error::InspectError;
use crate::{office, pdf};

/// Facts read from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFacts {
    /// Page count (sheet count for workbooks).
    pub pages: u64,
    /// First-page orientation, only reported for PDFs.
    pub orientation: Option<PageOrientation>,
    /// Orientation of the text layout, when the format records one.
    pub text_orientation: Option<String>,
    /// Character count, when the format records one.
    pub char_count: Option<u64>,
}

/// Result of inspecting one file. Failures are values, never panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectionOutcome {
    /// The document was read.
    Inspected(DocumentFacts),
    /// The document could not be read.
    Failed(String),
}

impl InspectionOutcome {
    /// Whether inspection failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Page count, zero on failure.
    pub fn pages(&self) -> u64 {
        match self {
            Self::Inspected(facts) => facts.pages,
            Self::Failed(_) => 0,
        }
    }

    /// Convert into an index record.
    ///
    /// A failure records zero pages and the reason as the orientation.
    pub fn into_record(self) -> MetadataRecord {
        match self {
            Self::Inspected(facts) => MetadataRecord {
                pages: Some(facts.pages),
                page_orientation: facts.orientation,
                text_orientation: facts.text_orientation,
                char_count: facts.char_count,
            },
            Self::Failed(reason) => MetadataRecord {
                pages: Some(0),
                page_orientation: Some(PageOrientation::Unreadable(reason)),
                text_orientation: None,
                char_count: None,
            },
        }
    }
}

impl From<Result<DocumentFacts, InspectError>> for InspectionOutcome {
    fn from(result: Result<DocumentFacts, InspectError>) -> Self {
        match result {
            Ok(facts) => Self::Inspected(facts),
            Err(err) => Self::Failed(err.to_string()),
        }
    }
}

/// Reads page counts and layout facts from documents.
///
/// Implementations must be callable from several worker threads at once.
pub trait DocumentInspector: Send + Sync {
    /// Inspect one file.
    fn inspect(&self, path: &Path) -> InspectionOutcome;
}

/// Inspector backed by the document files on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileInspector;

impl FileInspector {
    /// Create a new inspector.
    pub fn new() -> Self {
        Self
    }

    /// Inspect a file, surfacing the error.
    pub fn try_inspect(&self, file: &Path) -> Result<DocumentFacts, InspectError> {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        match path::extension(&name).as_deref() {
            Some("pdf") => pdf::inspect(file),
            Some("docx") => office::inspect_docx(file),
            Some("xlsx") => office::inspect_xlsx(file),
            _ => Err(InspectError::UnsupportedType {
                path: file.to_path_buf(),
            }),
        }
    }
}

impl DocumentInspector for FileInspector {
    fn inspect(&self, path: &Path) -> InspectionOutcome {
        self.try_inspect(path).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_outcome_record() {
        let record = InspectionOutcome::Failed("broken xref".into()).into_record();
        assert_eq!(record.pages, Some(0));
        assert_eq!(record.page_orientation_cell(), "Error: broken xref");
    }

    #[test]
    fn test_unsupported_type() {
        let outcome = FileInspector::new().inspect(Path::new("/tmp/notes.txt"));
        assert!(outcome.is_failure());
        assert_eq!(outcome.pages(), 0);
    }

    #[test]
    fn test_missing_file_is_failure() {
        let outcome = FileInspector::new().inspect(Path::new("/definitely/not/here.pdf"));
        assert!(outcome.is_failure());
    }
}
