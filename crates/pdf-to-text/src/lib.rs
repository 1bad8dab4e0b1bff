//! pdf-to-text: background PDF text and table extraction
//!
//! This crate turns paginated documents into plain-text output. A document is read
//! page by page through a [`source::PageSource`], each page is reduced to a
//! [`PageResult`] and the results are rendered into one string. Jobs run on their own
//! blocking task and report progress, completion and failure as [`JobEvent`]s.
//!
//! Two workflows are supported: a single document whose rendered content is handed
//! back to the caller, and a folder batch that writes one `.txt` file per document.

pub mod config;
pub mod engine;
pub mod error;
pub mod processing;
pub mod source;
pub mod types;

pub use config::ExtractConfig;
pub use error::{Error, ErrorKind, Result};
pub use processing::{
    BatchJobWorker, CancellationFlag, EventGuard, JobController, JobEventSink, JobHandle,
    JobSlot, ReplacePolicy, SingleJobWorker,
};
pub use source::{DocumentOpener, PageSource, PdfOpener};
pub use types::{
    BatchJob, BatchReport, ExtractionMode, FailurePolicy, FileFailure, JobEvent, PageResult,
    SingleJob, Table,
};
