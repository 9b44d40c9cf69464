//! Warm application registry: once-per-process construction of the embedded
//! application.

use crate::error::BridgeError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

/// Holds the single long-lived application instance for this warm process.
///
/// Construction is serialized on the cell: concurrent first invocations run
/// the factory at most once, and every caller observes the same
/// fully-constructed instance. A failed construction leaves the cell empty,
/// so a transient failure is retried by the next invocation; a deterministic
/// failure fails every invocation identically until the platform recycles
/// the process.
pub struct WarmRegistry<A> {
    slot: OnceCell<Arc<A>>,
}

impl<A> WarmRegistry<A> {
    /// Create an empty (cold) registry.
    pub fn new() -> Self {
        Self {
            slot: OnceCell::new(),
        }
    }

    /// Return the warm application, constructing it on first use.
    pub async fn get_or_init<F, Fut>(&self, factory: F) -> Result<Arc<A>, BridgeError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<A, BridgeError>>,
    {
        let app = self
            .slot
            .get_or_try_init(|| async {
                info!("cold start: constructing warm application");
                factory().await.map(Arc::new)
            })
            .await?;
        Ok(app.clone())
    }

    /// Whether the application has been constructed in this process.
    pub fn is_warm(&self) -> bool {
        self.slot.initialized()
    }
}

impl<A> Default for WarmRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}
