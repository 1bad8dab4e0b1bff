//! Per-workflow job slots

use serde::{Deserialize, Serialize};

use super::handle::JobHandle;
use crate::error::{Error, Result};

/// What submitting into an occupied slot does
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReplacePolicy {
    /// Refuse the new job while the current one is unfinished
    #[default]
    Reject,
    /// Stop listening to the current job and let it run to completion unobserved
    Abandon,
    /// Cancel the current job, then stop listening to it
    AbandonAndCancel,
}

/// Holds at most one job of a workflow.
///
/// The slot owns the handle; once replaced or taken, nothing in the slot refers to
/// the old job any more.
#[derive(Debug)]
pub struct JobSlot<T> {
    name: &'static str,
    current: Option<JobHandle<T>>,
}

impl<T> JobSlot<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            current: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// True while the slot holds a job that has not finished
    pub fn is_busy(&self) -> bool {
        self.current.as_ref().is_some_and(|job| !job.is_finished())
    }

    /// Apply `policy` to the current job, then install the job `spawn` creates.
    ///
    /// `spawn` only runs when the slot accepts the submission.
    pub fn submit<F>(&mut self, policy: ReplacePolicy, spawn: F) -> Result<&mut JobHandle<T>>
    where
        F: FnOnce() -> JobHandle<T>,
    {
        if self.is_busy() {
            match policy {
                ReplacePolicy::Reject => return Err(Error::SlotBusy(self.name)),
                ReplacePolicy::Abandon => {}
                ReplacePolicy::AbandonAndCancel => {
                    if let Some(job) = &self.current {
                        job.cancel();
                    }
                }
            }
        }
        if let Some(previous) = self.current.take() {
            previous.abandon();
        }

        Ok(self.current.insert(spawn()))
    }

    pub fn current(&self) -> Option<&JobHandle<T>> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut JobHandle<T>> {
        self.current.as_mut()
    }

    /// Remove the job, leaving the slot empty
    pub fn take(&mut self) -> Option<JobHandle<T>> {
        self.current.take()
    }
}
