//! Error types for rendering and the scratch store.

use std::path::PathBuf;

use thiserror::Error;

use crate::flatten::FlatReport;
use crate::sink::Summary;

/// Errors raised by a report sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Writing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding the output failed.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The destination could not be opened.
    #[error("Cannot open destination {path}: {message}")]
    Destination { path: PathBuf, message: String },
}

/// A sink failure together with the report that was already computed.
#[derive(Debug, Error)]
#[error("Report sink '{sink}' failed: {error}")]
pub struct RenderFailure {
    /// Sink that failed.
    pub sink: &'static str,
    /// Underlying error.
    #[source]
    pub error: SinkError,
    /// The flattened report, still valid.
    pub report: FlatReport,
    /// Summary of the report.
    pub summary: Summary,
}

/// Errors raised by the scratch store.
#[derive(Debug, Error)]
pub enum ScratchError {
    /// Reading or writing the scratch file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The scratch file is not valid interchange JSON.
    #[error("Invalid scratch file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ScratchError {
    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
