//! Entry points the embedded application exposes to the bridge.

use crate::envelope::InvocationContext;
use crate::error::BridgeError;
use crate::http::{CanonicalRequest, CanonicalResponse};
use crate::relay::ConnectionInfo;
use async_trait::async_trait;
use bytes::Bytes;

/// The embedded server application, consumed through its request/response
/// contract only.
///
/// One instance lives for the whole warm process and is shared read-only
/// across invocations, so implementations must be internally thread-safe.
/// The WebSocket hooks have accept-and-ignore defaults; an application that
/// only serves request/response triggers implements `handle` alone.
#[async_trait]
pub trait BridgeApp: Send + Sync {
    /// Handle one canonical request. The main request/response entry point.
    async fn handle(
        &self,
        request: CanonicalRequest,
        ctx: &InvocationContext,
    ) -> Result<CanonicalResponse, BridgeError>;

    /// Called when a WebSocket connection opens. An error rejects the
    /// connection.
    async fn on_connect(&self, connection: &ConnectionInfo) -> Result<(), BridgeError> {
        let _ = connection;
        Ok(())
    }

    /// Handle one inbound WebSocket message. An `Ok(Some(..))` reply is
    /// relayed back over the same connection.
    async fn on_message(
        &self,
        connection_id: &str,
        message: Bytes,
    ) -> Result<Option<Bytes>, BridgeError> {
        let _ = (connection_id, message);
        Ok(None)
    }

    /// Called when a WebSocket connection closes, before its resources are
    /// released.
    async fn on_disconnect(&self, connection_id: &str) {
        let _ = connection_id;
    }
}
