#![forbid(unsafe_code)]

//! Off-thread execution for long-running work (package indexing, source index rebuilds, matching
//! rounds).
//!
//! A task either completes and hands its value to the awaiting caller, or yields an error. A
//! cancelled task never publishes a partial result.

mod scheduler;
mod task;

use thiserror::Error;

pub use scheduler::{Scheduler, SchedulerConfig};
pub use task::BlockingTask;
pub use tokio_util::sync::CancellationToken;

/// Returned by task bodies that observed cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cancelled")]
pub struct Cancelled;

impl Cancelled {
    /// `Err(Cancelled)` once `token` has been cancelled.
    pub fn check(token: &CancellationToken) -> Result<(), Cancelled> {
        if token.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("task was cancelled")]
    Cancelled,
    #[error("task panicked")]
    Panicked,
}

impl From<Cancelled> for TaskError {
    fn from(_: Cancelled) -> Self {
        TaskError::Cancelled
    }
}

pub(crate) fn panic_payload_to_str(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "<non-string panic payload>"
    }
}
