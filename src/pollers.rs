//! Fixed-cadence background tasks.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A spawned loop that runs `tick` every `period` until cancelled.
///
/// Dropping the handle cancels the loop.
pub struct PollerHandle {
    name: &'static str,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl PollerHandle {
    /// Spawn a poller. The first tick runs one `period` after spawning.
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            debug!(poller = name, period_ms = period.as_millis() as u64, "poller started");
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        debug!(poller = name, "poller cancelled");
                        break;
                    }
                    _ = tokio::time::sleep(period) => {
                        tokio::select! {
                            _ = token.cancelled() => break,
                            _ = tick() => {}
                        }
                    }
                }
            }
        });
        Self {
            name,
            cancel,
            handle,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
