//! Background job execution
//!
//! Each job runs on its own blocking task and reports through a [`JobEventSink`].
//! Spawned jobs forward their events over a channel to a [`JobHandle`], and a
//! [`JobController`] keeps at most one handle per workflow.

mod batch;
mod cancel;
mod controller;
mod handle;
mod single;
mod sink;
mod slot;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::BatchJobWorker;
pub use cancel::CancellationFlag;
pub use controller::JobController;
pub use handle::{ChannelSink, JobHandle};
pub use single::SingleJobWorker;
pub use sink::{EventGuard, JobEventSink};
pub use slot::{JobSlot, ReplacePolicy};
