use super::PluginError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation token plus absolute deadline handed to every `fetch`
#[derive(Debug, Clone)]
pub struct FetchContext {
    cancel: CancellationToken,
    deadline: Instant,
    timeout: Duration,
}

impl FetchContext {
    pub fn new(cancel: CancellationToken, timeout: Duration) -> Self {
        Self {
            cancel,
            deadline: Instant::now() + timeout,
            timeout,
        }
    }

    /// Fresh token, deadline `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(CancellationToken::new(), timeout)
    }

    /// Child token, deadline `margin` before this one (never before now)
    pub fn child_before(&self, margin: Duration) -> Self {
        let timeout = self.remaining().saturating_sub(margin);
        Self {
            cancel: self.cancel.child_token(),
            deadline: Instant::now() + timeout,
            timeout,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Time left before the deadline, zero once it has passed
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Resolves when the context is cancelled
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Drive `fut` until it finishes, the token fires, or the deadline passes.
    ///
    /// Dropping `fut` on the losing branches is what stops the I/O, so it
    /// must own its request or child process.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, PluginError>
    where
        F: Future<Output = Result<T, PluginError>>,
    {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(PluginError::Cancelled),
            res = tokio::time::timeout_at(self.deadline, fut) => match res {
                Ok(inner) => inner,
                Err(_) => Err(PluginError::Timeout { after: self.timeout }),
            },
        }
    }
}
