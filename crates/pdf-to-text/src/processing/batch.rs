//! Folder batch worker

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;
use walkdir::WalkDir;

use super::cancel::CancellationFlag;
use super::handle::{spawn_job, JobHandle};
use super::single::open_document;
use super::sink::{EventGuard, JobEventSink};
use crate::config::ExtractConfig;
use crate::engine::{extract_document, progress_percent, render};
use crate::error::{Error, Result};
use crate::source::DocumentOpener;
use crate::types::{BatchJob, BatchReport, FailurePolicy, FileFailure};

/// Extracts every matching document directly inside a folder.
///
/// Documents are processed one at a time in file-name order. Each produces
/// `<output_dir>/<stem>.<output_extension>`; progress is reported once per document.
pub struct BatchJobWorker<O> {
    opener: Arc<O>,
    cancel: CancellationFlag,
    input_extension: String,
    output_extension: String,
    create_output_dir: bool,
}

impl<O: DocumentOpener> BatchJobWorker<O> {
    pub fn new(opener: Arc<O>) -> Self {
        Self::from_config(opener, &ExtractConfig::default())
    }

    pub fn from_config(opener: Arc<O>, config: &ExtractConfig) -> Self {
        Self {
            opener,
            cancel: CancellationFlag::new(),
            input_extension: config.extraction.input_extension.trim_start_matches('.').to_string(),
            output_extension: config.extraction.output_extension.trim_start_matches('.').to_string(),
            create_output_dir: config.batch.create_output_dir,
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
    pub fn spawn(self, job: BatchJob) -> JobHandle<BatchReport> {
        let cancel = self.cancel.clone();
        spawn_job("batch", cancel, move |sink| self.run(&job, sink))
    }

    /// Run on the current thread, reporting to `sink`
    pub fn run<S: JobEventSink<BatchReport>>(&self, job: &BatchJob, sink: S) {
        let mut sink = EventGuard::new(sink);
        tracing::info!(
            "Batch {} -> {} ({}, {:?})",
            job.source_dir.display(),
            job.output_dir.display(),
            job.mode,
            job.failure_policy
        );

        match self.process(job, &mut sink) {
            Ok(report) => {
                tracing::info!(
                    "Batch complete: {} written, {} failed",
                    report.written.len(),
                    report.failed.len()
                );
                sink.finished(report);
            }
            Err(e) => {
                tracing::error!("Batch failed: {}", e);
                sink.fail(&e);
            }
        }
    }

    /// Regular files directly inside `dir` with the input extension, sorted by name.
    ///
    /// Only an unreadable `dir` is an error. Entries that cannot be inspected are
    /// skipped, and symlinks count when they resolve to a regular file.
    pub fn list_documents(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut documents = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(std::io::Error::from(e).into()),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };
            if !self.has_input_extension(entry.path()) {
                continue;
            }
            if entry.path().is_file() {
                documents.push(entry.into_path());
            } else {
                tracing::debug!("Skipping {}: not a regular file", entry.path().display());
            }
        }

        Ok(documents)
    }

    fn has_input_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.input_extension))
    }

    fn process<S: JobEventSink<BatchReport>>(
        &self,
        job: &BatchJob,
        sink: &mut S,
    ) -> Result<BatchReport> {
        let documents = self.list_documents(&job.source_dir)?;
        if documents.is_empty() {
            return Err(Error::empty_input(&job.source_dir, &self.input_extension));
        }
        self.prepare_output_dir(&job.output_dir)?;

        let total = documents.len();
        let mut report = BatchReport::default();

        for (index, document) in documents.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::info!("Batch cancelled after {} of {} documents", index, total);
                return Err(Error::Cancelled);
            }

            match self.process_document(job, document) {
                Ok(target) => {
                    if report.written.contains(&target) {
                        tracing::warn!(
                            "{} overwrote {} written earlier in this batch",
                            document.display(),
                            target.display()
                        );
                    } else {
                        tracing::debug!("Wrote {}", target.display());
                        report.written.push(target);
                    }
                }
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => {
                    let e = attribute(document, e);
                    match job.failure_policy {
                        FailurePolicy::Abort => return Err(e),
                        FailurePolicy::Continue => {
                            tracing::warn!("Skipping {}: {}", document.display(), e);
                            report.failed.push(FileFailure {
                                source: document.clone(),
                                kind: e.kind(),
                                message: e.to_string(),
                            });
                        }
                    }
                }
            }

            sink.progress(progress_percent(index + 1, total));
        }

        Ok(report)
    }

    fn process_document(&self, job: &BatchJob, document: &Path) -> Result<PathBuf> {
        let pages = {
            let source = open_document(self.opener.as_ref(), document)?;
            extract_document(&source, job.mode, &self.cancel, |_, _| {})?
        };
        let content = render(&pages, job.mode);

        let target = job.output_path_for(document, &self.output_extension);
        write_output(&target, &content)?;
        Ok(target)
    }

    fn prepare_output_dir(&self, dir: &Path) -> Result<()> {
        if dir.is_dir() {
            return Ok(());
        }
        if dir.exists() {
            return Err(Error::write(dir, "destination is not a folder"));
        }
        if !self.create_output_dir {
            return Err(Error::write(dir, "destination folder does not exist"));
        }
        tracing::debug!("Creating {}", dir.display());
        fs::create_dir_all(dir).map_err(|e| Error::write(dir, e.to_string()))
    }
}

/// Write to a temporary file next to `target`, then rename it into place
fn write_output(target: &Path, content: &str) -> Result<()> {
    let dir = target
        .parent()
        .ok_or_else(|| Error::write(target, "output path has no parent folder"))?;

    let mut file = NamedTempFile::new_in(dir).map_err(|e| Error::write(target, e.to_string()))?;
    file.write_all(content.as_bytes())
        .map_err(|e| Error::write(target, e.to_string()))?;
    file.persist(target)
        .map_err(|e| Error::write(target, e.error.to_string()))?;
    Ok(())
}

/// Prefix errors that do not already name their document
fn attribute(document: &Path, err: Error) -> Error {
    match err {
        Error::Open { .. } | Error::Write { .. } => err,
        other => Error::Job {
            kind: other.kind(),
            message: format!("{}: {}", document.display(), other),
        },
    }
}
