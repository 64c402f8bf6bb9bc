use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::ClientError;

/// Cancellation handle for one logical request (a month load, an open form).
///
/// Clones share the same flag. Cancelling only abandons the caller's wait:
/// an HTTP call already handed to the blocking pool still runs to
/// completion, but its result is dropped.
#[derive(Debug, Clone)]
pub struct RequestScope {
    id: Uuid,
    flag: Arc<watch::Sender<bool>>,
}

impl Default for RequestScope {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestScope {
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self {
            id: Uuid::new_v4(),
            flag: Arc::new(flag),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn cancel(&self) {
        self.flag.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.flag.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called on any clone.
    pub async fn cancelled(&self) {
        let mut rx = self.flag.subscribe();
        // The sender lives as long as `self`, so this only errors if it was
        // dropped, which cannot happen while we hold it.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Run `fut` inside this scope. Returns [`ClientError::Cancelled`] as
    /// soon as the scope is cancelled, whichever finishes first.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        if self.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        let span = tracing::debug_span!("request_scope", scope = %self.id);
        async {
            tokio::select! {
                biased;
                _ = self.cancelled() => Err(ClientError::Cancelled),
                result = fut => result,
            }
        }
        .instrument(span)
        .await
    }
}
