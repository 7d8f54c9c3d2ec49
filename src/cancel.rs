use std::future::Future;

use tokio::sync::watch;

use crate::error::ApiError;

/// Owned by a screen for as long as it is on display. Cancelling it, or
/// dropping it, resolves every request started under one of its handles to
/// [`ApiError::Cancelled`].
#[derive(Debug)]
pub struct CancelScope {
    tx: watch::Sender<bool>,
}

#[derive(Debug, Clone)]
pub struct CancelHandle {
    rx: watch::Receiver<bool>,
}

impl CancelScope {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn handle(&self) -> CancelHandle {
        CancelHandle { rx: self.tx.subscribe() }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for CancelScope {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelHandle {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Completes once the scope is cancelled or gone.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Races `fut` against the scope behind `handle`.
pub async fn cancellable<F, T>(handle: &CancelHandle, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    if handle.is_cancelled() {
        return Err(ApiError::Cancelled);
    }
    let mut handle = handle.clone();
    tokio::select! {
        biased;
        _ = handle.cancelled() => Err(ApiError::Cancelled),
        result = fut => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn completes_when_not_cancelled() {
        let scope = CancelScope::new();
        let result = cancellable(&scope.handle(), async { Ok::<_, ApiError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn cancel_interrupts_pending_request() {
        let scope = CancelScope::new();
        let handle = scope.handle();
        let pending = tokio::spawn(async move {
            cancellable(&handle, async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, ApiError>(())
            })
            .await
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        scope.cancel();
        let result = pending.await.unwrap();
        assert!(matches!(result, Err(ApiError::Cancelled)));
    }

    #[tokio::test]
    async fn dropping_the_scope_cancels() {
        let scope = CancelScope::new();
        let handle = scope.handle();
        drop(scope);
        assert!(handle.is_cancelled());
        let result = cancellable(&handle, async { Ok::<_, ApiError>(1) }).await;
        assert!(matches!(result, Err(ApiError::Cancelled)));
    }
}
