use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::Error;

/// Lifetime of a view. Requests issued through [`ViewScope::guard`] are
/// abandoned once the scope is closed or dropped, so a dismissed view never
/// receives a late response.
#[derive(Debug, Default)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope that is also closed when `parent` is cancelled.
    pub fn child_of(parent: &CancellationToken) -> Self {
        Self {
            token: parent.child_token(),
        }
    }

    /// Token that can close this scope from another task.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Run `fut` unless the scope closes first.
    pub async fn guard<F, T>(&self, fut: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        if self.token.is_cancelled() {
            return Err(Error::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                tracing::debug!("Request dropped, view scope closed");
                Err(Error::Cancelled)
            }
            result = fut => result,
        }
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
