//! Core types for the extraction pipeline

pub mod event;
pub mod job;
pub mod page;

pub use event::{BatchReport, FileFailure, JobEvent};
pub use job::{BatchJob, ExtractionMode, FailurePolicy, SingleJob};
pub use page::{Cell, PageResult, Row, Table};
