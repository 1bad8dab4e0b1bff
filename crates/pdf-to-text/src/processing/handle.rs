//! Handles to running jobs

use std::panic::{catch_unwind, AssertUnwindSafe};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::cancel::CancellationFlag;
use super::sink::{EventGuard, JobEventSink};
use crate::error::{Error, ErrorKind, Result};
use crate::types::JobEvent;

/// Sink a spawned job reports through
pub type ChannelSink<T> = EventGuard<mpsc::UnboundedSender<JobEvent<T>>>;

/// The submitting side of a running job.
///
/// Events arrive in the order the job emitted them. Dropping the handle (or calling
/// [`JobHandle::abandon`]) stops delivery; the job itself only stops when cancelled.
#[derive(Debug)]
pub struct JobHandle<T> {
    id: Uuid,
    kind: &'static str,
    events: mpsc::UnboundedReceiver<JobEvent<T>>,
    cancel: CancellationFlag,
    task: JoinHandle<()>,
    terminal_seen: bool,
}

impl<T> JobHandle<T> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Workflow name, `"single"` or `"batch"`
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Ask the job to stop at its next page or file boundary
    pub fn cancel(&self) {
        tracing::info!("Cancelling {} job {}", self.kind, self.id);
        self.cancel.cancel();
    }

    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// True once the terminal event was received or the job task has exited
    pub fn is_finished(&self) -> bool {
        self.terminal_seen || self.task.is_finished()
    }

    /// Next event, `None` after the terminal event
    pub async fn next_event(&mut self) -> Option<JobEvent<T>> {
        if self.terminal_seen {
            return None;
        }
        let event = self.events.recv().await?;
        self.terminal_seen = event.is_terminal();
        Some(event)
    }

    /// Non-blocking variant of [`JobHandle::next_event`] for polling loops
    pub fn try_next_event(&mut self) -> Option<JobEvent<T>> {
        if self.terminal_seen {
            return None;
        }
        let event = self.events.try_recv().ok()?;
        self.terminal_seen = event.is_terminal();
        Some(event)
    }

    /// Drive the job to completion, forwarding progress to `on_progress`
    pub async fn wait<F>(mut self, mut on_progress: F) -> Result<T>
    where
        F: FnMut(u8),
    {
        while let Some(event) = self.next_event().await {
            match event {
                JobEvent::Progress(percent) => on_progress(percent),
                JobEvent::Finished(payload) => return Ok(payload),
                JobEvent::Failed(kind, message) => return Err(Error::Job { kind, message }),
            }
        }
        Err(Error::internal(format!(
            "{} job {} ended without a result",
            self.kind, self.id
        )))
    }

    /// Stop listening to the job without cancelling it
    pub fn abandon(self) {
        tracing::debug!("Abandoning {} job {}", self.kind, self.id);
    }
}

/// Run `body` on a blocking task and return the handle that receives its events.
///
/// A panic inside `body` and a body that returns without a terminal event both
/// surface as an unclassified failure. Must be called from within a Tokio runtime.
pub(crate) fn spawn_job<T, F>(kind: &'static str, cancel: CancellationFlag, body: F) -> JobHandle<T>
where
    T: Send + 'static,
    F: FnOnce(&mut ChannelSink<T>) + Send + 'static,
{
    let id = Uuid::new_v4();
    let (tx, rx) = mpsc::unbounded_channel();

    let task = tokio::task::spawn_blocking(move || {
        let span = tracing::info_span!("job", %id, kind);
        let _entered = span.enter();

        let mut sink = EventGuard::new(tx);
        if catch_unwind(AssertUnwindSafe(|| body(&mut sink))).is_err() {
            tracing::error!("{} job {} panicked", kind, id);
            sink.error(ErrorKind::UnclassifiedFailure, "Job panicked".to_string());
        }
        if !sink.is_terminated() {
            sink.error(
                ErrorKind::UnclassifiedFailure,
                "Job stopped without reporting a result".to_string(),
            );
        }
    });

    tracing::debug!("Spawned {} job {}", kind, id);

    JobHandle {
        id,
        kind,
        events: rx,
        cancel,
        task,
        terminal_seen: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_collects_progress() {
        let handle = spawn_job::<String, _>("single", CancellationFlag::new(), |sink| {
            sink.progress(50);
            sink.progress(100);
            sink.finished("content".to_string());
        });

        let mut seen = Vec::new();
        let content = handle.wait(|p| seen.push(p)).await.unwrap();
        assert_eq!(content, "content");
        assert_eq!(seen, vec![50, 100]);
    }

    #[tokio::test]
    async fn test_failure_becomes_job_error() {
        let handle = spawn_job::<String, _>("single", CancellationFlag::new(), |sink| {
            sink.fail(&Error::page(1, "bad operator"));
        });

        match handle.wait(|_| {}).await {
            Err(Error::Job { kind, message }) => {
                assert_eq!(kind, ErrorKind::PageFailure);
                assert!(message.contains("page 2"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_panic_is_unclassified() {
        let mut handle = spawn_job::<String, _>("batch", CancellationFlag::new(), |sink| {
            sink.progress(10);
            panic!("boom");
        });

        assert_eq!(handle.next_event().await, Some(JobEvent::Progress(10)));
        assert!(matches!(
            handle.next_event().await,
            Some(JobEvent::Failed(ErrorKind::UnclassifiedFailure, _))
        ));
        assert_eq!(handle.next_event().await, None);
        assert!(handle.is_finished());
    }

    #[tokio::test]
    async fn test_silent_body_still_terminates() {
        let handle = spawn_job::<u32, _>("single", CancellationFlag::new(), |_| {});
        let result = handle.wait(|_| {}).await;
        assert!(matches!(
            result,
            Err(Error::Job { kind: ErrorKind::UnclassifiedFailure, .. })
        ));
    }

    #[tokio::test]
    async fn test_cancel_reaches_job() {
        let cancel = CancellationFlag::new();
        let handle = spawn_job::<(), _>("single", cancel.clone(), |_| {});
        handle.cancel();
        assert!(cancel.is_cancelled());
        handle.abandon();
    }
}
