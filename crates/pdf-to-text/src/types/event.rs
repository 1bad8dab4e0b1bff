//! Events emitted by running jobs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ErrorKind;

/// Event emitted by a job.
///
/// A job emits zero or more `Progress` events followed by exactly one terminal
/// event, either `Finished` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent<T> {
    /// Percent complete in `0..=100`
    Progress(u8),
    /// Job completed with its payload
    Finished(T),
    /// Job failed; no `Finished` follows
    Failed(ErrorKind, String),
}

impl<T> JobEvent<T> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobEvent::Progress(_))
    }
}

/// A document that failed inside a batch running with `FailurePolicy::Continue`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub source: PathBuf,
    pub kind: ErrorKind,
    pub message: String,
}

/// Outcome of a completed batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Output files in the order they were written
    pub written: Vec<PathBuf>,
    /// Documents that failed, empty unless the batch continues on error
    pub failed: Vec<FileFailure>,
}

impl BatchReport {
    pub fn total_files(&self) -> usize {
        self.written.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
