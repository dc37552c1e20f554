use crate::ShutdownTimeout;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::future::IntoFuture;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A one-shot handle on the outcome of a [`Switch`](crate::Switch).
///
/// The outcome is published exactly once, after the switch has been triggered
/// and its tasks have either all finished or run out of time. Any number of
/// clones may [receive](Completion::recv) from the same handle:
///
/// - every receive blocks until the outcome is published,
/// - a [`ShutdownTimeout`], if any, is handed to exactly **one** receiver,
/// - every other receive (concurrent or later) yields `Ok(())`.
///
/// In other words, the handle behaves like a channel that carries at most one
/// value and is closed right after: receiving from a closed channel yields the
/// empty value immediately.
#[derive(Debug, Clone)]
pub struct Completion {
    inner: Arc<CompletionInner>,
}

#[derive(Debug)]
struct CompletionInner {
    published: CancellationToken,
    report: Mutex<Option<ShutdownTimeout>>,
}

impl Completion {
    /// Internal constructor.
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(CompletionInner {
                published: CancellationToken::new(),
                report: Mutex::new(None),
            }),
        }
    }

    /// Publishes the outcome. Only the first call has an effect.
    pub(crate) fn publish(&self, outcome: Result<(), ShutdownTimeout>) {
        let mut report = self.inner.report.lock();

        if self.inner.published.is_cancelled() {
            return;
        }

        *report = outcome.err();
        self.inner.published.cancel();
    }

    /// Waits until the outcome is published, then receives it.
    pub async fn recv(&self) -> Result<(), ShutdownTimeout> {
        self.inner.published.cancelled().await;

        self.take()
    }

    /// Receives the outcome if it is already published, without waiting.
    /// Returns `None` while the switch is still idle or running its tasks.
    pub fn try_recv(&self) -> Option<Result<(), ShutdownTimeout>> {
        if !self.inner.published.is_cancelled() {
            return None;
        }

        Some(self.take())
    }

    /// Reports whether the outcome has been published.
    pub fn is_completed(&self) -> bool {
        self.inner.published.is_cancelled()
    }

    fn take(&self) -> Result<(), ShutdownTimeout> {
        match self.inner.report.lock().take() {
            Some(timeout) => Err(timeout),
            None => Ok(()),
        }
    }
}

impl IntoFuture for Completion {
    type Output = Result<(), ShutdownTimeout>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.recv().await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn timeout() -> ShutdownTimeout {
        ShutdownTimeout::new(["slow".to_string()])
    }

    #[tokio::test]
    async fn pending_until_published() {
        // Given
        let completion = Completion::new();

        // Then
        assert!(!completion.is_completed());
        assert_eq!(completion.try_recv(), None);

        // When
        completion.publish(Ok(()));

        // Then
        assert!(completion.is_completed());
        assert_eq!(completion.recv().await, Ok(()));
    }

    #[tokio::test]
    async fn timeout_is_delivered_once() {
        // Given
        let completion = Completion::new();
        let other = completion.clone();

        // When
        completion.publish(Err(timeout()));

        // Then
        assert_eq!(completion.recv().await, Err(timeout()));
        assert_eq!(other.recv().await, Ok(()));
        assert_eq!(completion.try_recv(), Some(Ok(())));
    }

    #[tokio::test]
    async fn first_publication_wins() {
        // Given
        let completion = Completion::new();

        // When
        completion.publish(Ok(()));
        completion.publish(Err(timeout()));

        // Then
        assert_eq!(completion.recv().await, Ok(()));
    }

    #[tokio::test]
    async fn awaitable_directly() {
        // Given
        let completion = Completion::new();
        let waiter = tokio::spawn(completion.clone().into_future());

        // When
        completion.publish(Err(timeout()));

        // Then
        assert_eq!(waiter.await.unwrap(), Err(timeout()));
    }
}
