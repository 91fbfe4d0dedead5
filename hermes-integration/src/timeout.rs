use std::time::Duration;

use tokio::task::AbortHandle;

/// A one-shot timer running a callback on the current tokio runtime.
///
/// Cancelling is idempotent, and it is safe to cancel after the callback has run.
#[derive(Debug, Default)]
pub struct TimeoutHandle {
    handle: Option<AbortHandle>,
}

impl TimeoutHandle {
    /// Runs `callback` once `duration` has elapsed.
    ///
    /// Outside of a tokio runtime the timer is not armed and the callback never runs.
    pub fn spawn<F>(duration: Duration, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            hermes_log::warn!("no async runtime available, not arming profile timeout");
            return Self::default();
        };

        let task = runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            callback();
        });

        Self {
            handle: Some(task.abort_handle()),
        }
    }

    /// Returns `true` if a timer was started and has not been cancelled.
    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    /// Stops the timer if it has not fired yet.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
