//! Event sinks: where a running job reports progress and its outcome

use tokio::sync::mpsc;

use crate::error::{Error, ErrorKind};
use crate::types::JobEvent;

/// Consumer of one job's events.
///
/// A job calls `progress` zero or more times and then exactly one of `finished` or
/// `error`. Sinks are driven from the job's own task; a sink that hands events to
/// another thread is responsible for the hand-off.
pub trait JobEventSink<T> {
    fn progress(&mut self, percent: u8);

    fn finished(&mut self, payload: T);

    fn error(&mut self, kind: ErrorKind, message: String);

    /// Report `err` as the terminal event
    fn fail(&mut self, err: &Error) {
        self.error(err.kind(), err.to_string());
    }

    fn emit(&mut self, event: JobEvent<T>) {
        match event {
            JobEvent::Progress(percent) => self.progress(percent),
            JobEvent::Finished(payload) => self.finished(payload),
            JobEvent::Failed(kind, message) => self.error(kind, message),
        }
    }
}

impl<T, S> JobEventSink<T> for &mut S
where
    S: JobEventSink<T> + ?Sized,
{
    fn progress(&mut self, percent: u8) {
        (**self).progress(percent)
    }

    fn finished(&mut self, payload: T) {
        (**self).finished(payload)
    }

    fn error(&mut self, kind: ErrorKind, message: String) {
        (**self).error(kind, message)
    }
}

/// Collects events in memory
impl<T> JobEventSink<T> for Vec<JobEvent<T>> {
    fn progress(&mut self, percent: u8) {
        self.push(JobEvent::Progress(percent));
    }

    fn finished(&mut self, payload: T) {
        self.push(JobEvent::Finished(payload));
    }

    fn error(&mut self, kind: ErrorKind, message: String) {
        self.push(JobEvent::Failed(kind, message));
    }
}

/// Forwards events to the submitting context.
///
/// A closed receiver means the caller abandoned the job; events are then dropped
/// and the job runs on.
impl<T> JobEventSink<T> for mpsc::UnboundedSender<JobEvent<T>> {
    fn progress(&mut self, percent: u8) {
        let _ = self.send(JobEvent::Progress(percent));
    }

    fn finished(&mut self, payload: T) {
        if self.send(JobEvent::Finished(payload)).is_err() {
            tracing::debug!("Job finished after its handle was dropped");
        }
    }

    fn error(&mut self, kind: ErrorKind, message: String) {
        if self.send(JobEvent::Failed(kind, message)).is_err() {
            tracing::debug!("Job failed after its handle was dropped");
        }
    }
}

/// Enforces the event contract on top of another sink.
///
/// Progress is capped at 100 and never goes backwards; after the first terminal
/// event everything else is dropped.
#[derive(Debug)]
pub struct EventGuard<S> {
    inner: S,
    last_progress: Option<u8>,
    terminated: bool,
}

impl<S> EventGuard<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            last_progress: None,
            terminated: false,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn last_progress(&self) -> Option<u8> {
        self.last_progress
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<T, S> JobEventSink<T> for EventGuard<S>
where
    S: JobEventSink<T>,
{
    fn progress(&mut self, percent: u8) {
        if self.terminated {
            return;
        }
        let percent = percent.min(100);
        if self.last_progress.is_some_and(|last| percent < last) {
            tracing::warn!("Dropping progress {} after {:?}", percent, self.last_progress);
            return;
        }
        self.last_progress = Some(percent);
        self.inner.progress(percent);
    }

    fn finished(&mut self, payload: T) {
        if self.terminated {
            tracing::warn!("Dropping duplicate terminal event");
            return;
        }
        self.terminated = true;
        self.inner.finished(payload);
    }

    fn error(&mut self, kind: ErrorKind, message: String) {
        if self.terminated {
            tracing::warn!("Dropping error after terminal event: {}", message);
            return;
        }
        self.terminated = true;
        self.inner.error(kind, message);
    }
}
