use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle to a running location watch.
///
/// Dropping the handle leaves the watch running; call
/// [`Subscription::unsubscribe`] to stop it.
pub struct Subscription {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Subscription {
    pub(crate) fn new(token: CancellationToken, handle: JoinHandle<()>) -> Self {
        Self { token, handle }
    }

    pub fn unsubscribe(&self) {
        self.token.cancel();
    }

    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Waits for the watch loop to exit, either because the event stream
    /// ended or because it was unsubscribed.
    pub async fn closed(self) {
        if let Err(e) = self.handle.await {
            tracing::error!("Location watch task failed: {}", e);
        }
    }
}
