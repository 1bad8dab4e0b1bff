//! Error types for the extraction pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for extraction operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure classification carried by error events.
///
/// Every [`Error`] maps onto exactly one kind; hosts use the kind to decide how to
/// present the failure and the message for the text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The source document could not be opened or parsed at all
    OpenFailure,
    /// Extracting the text or tables of one page failed
    PageFailure,
    /// A batch folder holds no matching documents
    EmptyInputFailure,
    /// An output file could not be created or written
    WriteFailure,
    /// Anything else surfaced while processing
    UnclassifiedFailure,
    /// The job observed its cancellation flag
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::OpenFailure => "open_failure",
            ErrorKind::PageFailure => "page_failure",
            ErrorKind::EmptyInputFailure => "empty_input_failure",
            ErrorKind::WriteFailure => "write_failure",
            ErrorKind::UnclassifiedFailure => "unclassified_failure",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extraction errors
#[derive(Debug, Error)]
pub enum Error {
    /// Document could not be opened
    #[error("Failed to open '{}': {message}", path.display())]
    Open { path: PathBuf, message: String },

    /// A page could not be extracted (page is 1-based)
    #[error("Failed to extract page {page}: {message}")]
    Page { page: usize, message: String },

    /// Batch folder contains nothing to process
    #[error("No matching files found in '{}' (expected *.{extension})", folder.display())]
    EmptyInput { folder: PathBuf, extension: String },

    /// Output could not be written
    #[error("Failed to write '{}': {message}", path.display())]
    Write { path: PathBuf, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Job was cancelled before completing
    #[error("Job cancelled")]
    Cancelled,

    /// A workflow slot already holds an unfinished job
    #[error("A {0} job is already running")]
    SlotBusy(&'static str),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reported by a job through its event stream
    #[error("{message}")]
    Job { kind: ErrorKind, message: String },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an open error
    pub fn open(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Open {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create a page error for a 0-based page index
    pub fn page(index: usize, message: impl Into<String>) -> Self {
        Self::Page {
            page: index + 1,
            message: message.into(),
        }
    }

    /// Create an empty input error
    pub fn empty_input(folder: impl AsRef<Path>, extension: impl Into<String>) -> Self {
        Self::EmptyInput {
            folder: folder.as_ref().to_path_buf(),
            extension: extension.into(),
        }
    }

    /// Create a write error
    pub fn write(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Write {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Classify this error for event reporting
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Open { .. } => ErrorKind::OpenFailure,
            Error::Page { .. } => ErrorKind::PageFailure,
            Error::EmptyInput { .. } => ErrorKind::EmptyInputFailure,
            Error::Write { .. } => ErrorKind::WriteFailure,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::Job { kind, .. } => *kind,
            Error::Config(_) | Error::SlotBusy(_) | Error::Io(_) | Error::Internal(_) => {
                ErrorKind::UnclassifiedFailure
            }
        }
    }
}
