//! Single-document worker

use std::path::Path;
use std::sync::Arc;

use super::cancel::CancellationFlag;
use super::handle::{spawn_job, JobHandle};
use super::sink::{EventGuard, JobEventSink};
use crate::engine::{extract_document, progress_percent, render};
use crate::error::{Error, Result};
use crate::source::DocumentOpener;
use crate::types::SingleJob;

/// Extracts one document and hands the rendered content back.
///
/// Emits one progress event per page and finishes with the full content. The
/// document is opened inside the job and released before the terminal event.
pub struct SingleJobWorker<O> {
    opener: Arc<O>,
    cancel: CancellationFlag,
}

impl<O: DocumentOpener> SingleJobWorker<O> {
    pub fn new(opener: Arc<O>) -> Self {
        Self {
            opener,
            cancel: CancellationFlag::new(),
        }
    }

    /// Use an externally owned cancellation flag
    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// Run on a blocking task; events arrive through the returned handle
    pub fn spawn(self, job: SingleJob) -> JobHandle<String> {
        let cancel = self.cancel.clone();
        spawn_job("single", cancel, move |sink| self.run(&job, sink))
    }

    /// Run on the current thread, reporting to `sink`
    pub fn run<S: JobEventSink<String>>(&self, job: &SingleJob, sink: S) {
        let mut sink = EventGuard::new(sink);
        tracing::info!("Extracting {} ({})", job.source.display(), job.mode);

        match self.extract(job, &mut sink) {
            Ok(content) => {
                tracing::info!(
                    "Extracted {}: {} chars",
                    job.source.display(),
                    content.len()
                );
                sink.finished(content);
            }
            Err(e) => {
                tracing::error!("Extraction of {} failed: {}", job.source.display(), e);
                sink.fail(&e);
            }
        }
    }

    fn extract<S: JobEventSink<String>>(&self, job: &SingleJob, sink: &mut S) -> Result<String> {
        let pages = {
            let source = open_document(self.opener.as_ref(), &job.source)?;
            let pages = extract_document(&source, job.mode, &self.cancel, |done, total| {
                sink.progress(progress_percent(done, total))
            })?;
            if pages.is_empty() {
                sink.progress(100);
            }
            pages
        };
        Ok(render(&pages, job.mode))
    }
}

/// Open a document; anything that goes wrong is an open failure
pub(crate) fn open_document<O: DocumentOpener>(opener: &O, path: &Path) -> Result<O::Source> {
    opener.open(path).map_err(|e| match e {
        Error::Open { .. } => e,
        other => Error::open(path, other.to_string()),
    })
}
