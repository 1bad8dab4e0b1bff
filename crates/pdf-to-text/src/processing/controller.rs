//! Submission front-end owning one slot per workflow

use std::sync::Arc;

use super::batch::BatchJobWorker;
use super::handle::JobHandle;
use super::single::SingleJobWorker;
use super::slot::{JobSlot, ReplacePolicy};
use crate::config::ExtractConfig;
use crate::error::Result;
use crate::source::{DocumentOpener, PdfOpener};
use crate::types::{BatchJob, BatchReport, SingleJob};

/// Owns the single-document and batch slots.
///
/// The two workflows are independent: a running batch never blocks a single job and
/// the other way round. Submitting must happen inside a Tokio runtime.
pub struct JobController<O> {
    opener: Arc<O>,
    config: ExtractConfig,
    replace_policy: ReplacePolicy,
    single: JobSlot<String>,
    batch: JobSlot<BatchReport>,
}

impl JobController<PdfOpener> {
    /// Controller reading PDFs with the configured table tolerances
    pub fn from_config(config: ExtractConfig) -> Self {
        let opener = PdfOpener::new(config.tables.clone());
        Self::new(opener, config)
    }
}

impl<O: DocumentOpener> JobController<O> {
    pub fn new(opener: O, config: ExtractConfig) -> Self {
        Self {
            opener: Arc::new(opener),
            config,
            replace_policy: ReplacePolicy::default(),
            single: JobSlot::new("single"),
            batch: JobSlot::new("batch"),
        }
    }

    pub fn with_replace_policy(mut self, policy: ReplacePolicy) -> Self {
        self.replace_policy = policy;
        self
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Start extracting one document
    pub fn submit_single(&mut self, job: SingleJob) -> Result<&mut JobHandle<String>> {
        let opener = self.opener.clone();
        let handle = self.single.submit(self.replace_policy, move || {
            SingleJobWorker::new(opener).spawn(job)
        })?;
        tracing::info!("Submitted single job {}", handle.id());
        Ok(handle)
    }

    /// Start a folder batch
    pub fn submit_batch(&mut self, job: BatchJob) -> Result<&mut JobHandle<BatchReport>> {
        let opener = self.opener.clone();
        let config = &self.config;
        let handle = self.batch.submit(self.replace_policy, move || {
            BatchJobWorker::from_config(opener, config).spawn(job)
        })?;
        tracing::info!("Submitted batch job {}", handle.id());
        Ok(handle)
    }

    pub fn single(&mut self) -> Option<&mut JobHandle<String>> {
        self.single.current_mut()
    }

    pub fn batch(&mut self) -> Option<&mut JobHandle<BatchReport>> {
        self.batch.current_mut()
    }

    pub fn take_single(&mut self) -> Option<JobHandle<String>> {
        self.single.take()
    }

    pub fn take_batch(&mut self) -> Option<JobHandle<BatchReport>> {
        self.batch.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::processing::testing::{write_document, ScriptedOpener};
    use crate::types::{ExtractionMode, JobEvent};
    use tempfile::TempDir;

    fn controller() -> JobController<ScriptedOpener> {
        JobController::new(ScriptedOpener, ExtractConfig::default())
    }

    #[tokio::test]
    async fn test_workflows_run_side_by_side() {
        let dir = TempDir::new().unwrap();
        let single_path = dir.path().join("one.pdf");
        write_document(&single_path, &["solo"]);
        let batch_src = dir.path().join("in");
        std::fs::create_dir(&batch_src).unwrap();
        write_document(&batch_src.join("a.pdf"), &["batched"]);
        let batch_out = dir.path().join("out");

        let mut controller = controller();
        controller
            .submit_single(SingleJob::new(&single_path, ExtractionMode::TextOnly))
            .unwrap();
        controller
            .submit_batch(BatchJob::new(&batch_src, ExtractionMode::TextOnly, &batch_out))
            .unwrap();

        let content = controller.take_single().unwrap().wait(|_| {}).await.unwrap();
        assert_eq!(content, "--- Page 1 Text ---\nsolo\n");

        let report = controller.take_batch().unwrap().wait(|_| {}).await.unwrap();
        assert_eq!(report.written, vec![batch_out.join("a.txt")]);
    }

    #[tokio::test]
    async fn test_resubmit_after_finish() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.pdf");
        write_document(&path, &["page"]);

        let mut controller = controller();
        let job = SingleJob::new(&path, ExtractionMode::TextOnly);

        let handle = controller.submit_single(job.clone()).unwrap();
        while let Some(event) = handle.next_event().await {
            if let JobEvent::Finished(_) = event {
                break;
            }
        }

        assert!(controller.submit_single(job).is_ok());
        assert!(controller.single().is_some());
    }

    #[tokio::test]
    async fn test_failed_job_error_reaches_caller() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller();

        let handle = controller
            .submit_batch(BatchJob::new(dir.path(), ExtractionMode::Both, dir.path()))
            .unwrap();
        let mut events = Vec::new();
        while let Some(event) = handle.next_event().await {
            events.push(event);
        }

        assert!(matches!(
            &events[..],
            [JobEvent::Failed(ErrorKind::EmptyInputFailure, _)]
        ));
    }
}
