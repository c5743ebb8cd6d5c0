//! Error types for scanning operations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while building the tree.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Scan root is missing or not a directory.
    #[error("Invalid scan root {path}: {reason}")]
    InvalidRoot { path: PathBuf, reason: String },

    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Archive could not be opened or read.
    #[error("Archive error at {path}: {message}")]
    Archive { path: PathBuf, message: String },

    /// Operation was interrupted.
    #[error("Operation interrupted")]
    Interrupted,

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create an invalid-root error.
    pub fn invalid_root(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidRoot {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// Error listing a directory.
    ReadError,
    /// Document inspection failed.
    InspectionFailed,
}

/// Non-fatal warning encountered during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a warning from a failed directory listing.
    pub fn from_scan_error(error: &ScanError) -> Self {
        match error {
            ScanError::PermissionDenied { path } => Self {
                message: format!("Permission denied: {}", path.display()),
                path: path.clone(),
                kind: WarningKind::PermissionDenied,
            },
            ScanError::NotFound { path }
            | ScanError::Io { path, .. }
            | ScanError::Archive { path, .. }
            | ScanError::InvalidRoot { path, .. } => Self {
                message: format!("Read error: {error}"),
                path: path.clone(),
                kind: WarningKind::ReadError,
            },
            other => Self {
                message: other.to_string(),
                path: PathBuf::new(),
                kind: WarningKind::ReadError,
            },
        }
    }

    /// Short marker text stored on the affected tree node.
    pub fn marker(&self) -> &str {
        match self.kind {
            WarningKind::PermissionDenied => "Permission denied",
            _ => &self.message,
        }
    }
}
