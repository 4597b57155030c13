use tokio::sync::oneshot;

use crate::{CancellationToken, TaskError};

/// Handle to work running on a scheduler pool.
///
/// Dropping the handle does not stop the work; its result is discarded.
pub struct BlockingTask<T> {
    token: CancellationToken,
    rx: oneshot::Receiver<Result<T, TaskError>>,
}

impl<T> BlockingTask<T> {
    pub(crate) fn new(
        token: CancellationToken,
        rx: oneshot::Receiver<Result<T, TaskError>>,
    ) -> Self {
        Self { token, rx }
    }

    /// Asks the body to stop. It observes this through its token.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Waits for the body to return. A task cancelled before then yields
    /// [`TaskError::Cancelled`]; a sender dropped by a panic yields [`TaskError::Panicked`].
    pub async fn join(self) -> Result<T, TaskError> {
        self.rx.await.unwrap_or(Err(TaskError::Panicked))
    }
}
