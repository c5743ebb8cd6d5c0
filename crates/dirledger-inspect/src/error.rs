//! Error types for document inspection and indexing.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading a single document.
#[derive(Debug, Error)]
pub enum InspectError {
    /// The file could not be opened or read.
    #[error("Cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The PDF could not be parsed.
    #[error("Malformed PDF {path}: {message}")]
    Pdf { path: PathBuf, message: String },

    /// The office package is not a readable zip container.
    #[error("Malformed package {path}: {message}")]
    Package { path: PathBuf, message: String },

    /// A required part is absent from the package.
    #[error("Missing part {part} in {path}")]
    MissingPart { path: PathBuf, part: String },

    /// No reader exists for the file type.
    #[error("Unsupported document type: {path}")]
    UnsupportedType { path: PathBuf },
}

impl InspectError {
    /// Create an open error.
    pub fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }

    /// Create a package error.
    pub fn package(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Package {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Errors that abort building the whole index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The run was cancelled; partial results were discarded.
    #[error("Indexing cancelled")]
    Cancelled,

    /// The worker pool could not be started.
    #[error("Worker pool error: {0}")]
    Pool(String),
}
