//! Cooperative cancellation for in-flight node calls.

use std::future::Future;

use tokio_util::sync::CancellationToken;

/// Error produced when a token fires before the raced future completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Owner side: triggers cancellation for every token it handed out.
#[derive(Debug, Default)]
pub struct Cancellation {
    token: CancellationToken,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> CancelToken {
        CancelToken {
            inner: self.token.clone(),
        }
    }

    /// Trigger the cancellation signal. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Observer side, cloned into every call that awaits the network.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: CancellationToken,
}

impl CancelToken {
    /// A token with no owner; it never fires.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Resolves once cancelled.
    pub async fn cancelled(&self) {
        self.inner.cancelled().await
    }

    /// Races `fut` against this token.
    pub async fn run<F, T, E>(&self, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<Cancelled>,
    {
        self.check::<E>()?;
        tokio::select! {
            biased;
            _ = self.inner.cancelled() => Err(Cancelled.into()),
            result = fut => result,
        }
    }

    /// Fails fast if already cancelled.
    pub fn check<E: From<Cancelled>>(&self) -> Result<(), E> {
        if self.is_cancelled() {
            Err(Cancelled.into())
        } else {
            Ok(())
        }
    }
}
