//! WebSocket trigger relay.
//!
//! Long-lived duplex connections are driven through the same adapter
//! discipline as one-shot requests: the platform delivers connect, message,
//! and close events as invocations, and outbound data travels through a
//! platform-provided send primitive keyed by connection id.

mod connection;

pub use connection::{Connection, ConnectionInfo, ConnectionState};

use crate::app::BridgeApp;
use crate::error::BridgeError;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Platform-provided outbound channel for WebSocket connections.
#[async_trait]
pub trait ConnectionSender: Send + Sync {
    /// Deliver one message to the remote peer of `connection_id`.
    async fn send(&self, connection_id: &str, message: Bytes) -> Result<(), BridgeError>;
}

/// Tracks open connections and relays messages between the platform and the
/// application's WebSocket hooks.
///
/// The table lock is held only for map access; each connection carries its
/// own mutex, held across dispatch, so messages on one connection reach the
/// handler in arrival order while distinct connections proceed
/// independently.
pub struct ConnectionRelay {
    connections: RwLock<HashMap<String, Arc<Mutex<Connection>>>>,
    sender: Arc<dyn ConnectionSender>,
}

impl ConnectionRelay {
    /// Create a relay that sends outbound messages through `sender`.
    pub fn new(sender: Arc<dyn ConnectionSender>) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            sender,
        }
    }

    /// Register a new connection and run the application's connect hook.
    /// A hook error rejects and deregisters the connection.
    pub async fn on_connect<A: BridgeApp + ?Sized>(
        &self,
        app: &A,
        info: ConnectionInfo,
    ) -> Result<(), BridgeError> {
        let id = info.id.clone();
        let entry = Arc::new(Mutex::new(Connection::open(info.clone())));
        {
            let mut connections = self.connections.write().await;
            if connections.insert(id.clone(), entry).is_some() {
                warn!("connection '{}' re-registered, dropping stale entry", id);
            }
        }

        if let Err(err) = app.on_connect(&info).await {
            let mut connections = self.connections.write().await;
            connections.remove(&id);
            return Err(err);
        }

        info!("connection '{}' open", id);
        Ok(())
    }

    /// Dispatch one inbound message to the application and relay any reply.
    ///
    /// Messages for unknown or closed connections are dropped with a
    /// recoverable connection-closed error.
    pub async fn on_message<A: BridgeApp + ?Sized>(
        &self,
        app: &A,
        connection_id: &str,
        message: Bytes,
    ) -> Result<(), BridgeError> {
        let Some(entry) = self.lookup(connection_id).await else {
            warn!("dropping message for unknown connection '{}'", connection_id);
            return Err(BridgeError::connection_closed(connection_id));
        };

        // Holding the connection lock across dispatch preserves per-
        // connection FIFO ordering.
        let connection = entry.lock().await;
        if !connection.is_open() {
            warn!("dropping message for closed connection '{}'", connection_id);
            return Err(BridgeError::connection_closed(connection_id));
        }

        let reply = app.on_message(connection_id, message).await?;
        if let Some(outbound) = reply {
            if let Err(err) = self.sender.send(connection_id, outbound).await {
                // A frame that cannot be flushed must not be silently
                // dropped: tear the connection down instead.
                drop(connection);
                self.discard(connection_id).await;
                warn!("send failed on connection '{}', closing: {}", connection_id, err);
                return Err(err);
            }
        }

        Ok(())
    }

    /// Close a connection: run the application's disconnect hook and release
    /// the entry. Closing an unknown connection is a no-op.
    pub async fn on_close<A: BridgeApp + ?Sized>(
        &self,
        app: &A,
        connection_id: &str,
    ) -> Result<(), BridgeError> {
        let entry = {
            let mut connections = self.connections.write().await;
            connections.remove(connection_id)
        };
        let Some(entry) = entry else {
            debug!("close for unknown connection '{}'", connection_id);
            return Ok(());
        };

        {
            // Waits for any in-flight message dispatch to finish first.
            let mut connection = entry.lock().await;
            connection.state = ConnectionState::Closing;
        }

        app.on_disconnect(connection_id).await;

        let mut connection = entry.lock().await;
        connection.state = ConnectionState::Closed;
        info!("connection '{}' closed", connection_id);
        Ok(())
    }

    /// Send a server-initiated message on an open connection.
    ///
    /// Sending on a closed or unknown connection is reported as a
    /// recoverable connection-closed error, since the remote peer may have
    /// already disconnected.
    pub async fn send(&self, connection_id: &str, message: Bytes) -> Result<(), BridgeError> {
        let open = match self.lookup(connection_id).await {
            Some(entry) => entry.lock().await.is_open(),
            None => false,
        };
        if !open {
            warn!("send on closed connection '{}' dropped", connection_id);
            return Err(BridgeError::connection_closed(connection_id));
        }
        self.sender.send(connection_id, message).await
    }

    /// Current state of a connection, if it is still tracked.
    pub async fn state(&self, connection_id: &str) -> Option<ConnectionState> {
        let entry = self.lookup(connection_id).await?;
        let connection = entry.lock().await;
        Some(connection.state)
    }

    /// Number of tracked connections.
    pub async fn open_connections(&self) -> usize {
        let connections = self.connections.read().await;
        connections.len()
    }

    async fn lookup(&self, connection_id: &str) -> Option<Arc<Mutex<Connection>>> {
        let connections = self.connections.read().await;
        connections.get(connection_id).cloned()
    }

    async fn discard(&self, connection_id: &str) {
        let entry = {
            let mut connections = self.connections.write().await;
            connections.remove(connection_id)
        };
        if let Some(entry) = entry {
            let mut connection = entry.lock().await;
            connection.state = ConnectionState::Closed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::InvocationContext;
    use crate::http::{CanonicalRequest, CanonicalResponse};

    /// Records inbound messages; replies to any message starting with "ping".
    struct RecordingApp {
        received: Mutex<Vec<Vec<u8>>>,
    }

    impl RecordingApp {
        fn new() -> Self {
            Self {
                received: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl BridgeApp for RecordingApp {
        async fn handle(
            &self,
            _request: CanonicalRequest,
            _ctx: &InvocationContext,
        ) -> Result<CanonicalResponse, BridgeError> {
            Ok(CanonicalResponse::ok())
        }

        async fn on_message(
            &self,
            _connection_id: &str,
            message: Bytes,
        ) -> Result<Option<Bytes>, BridgeError> {
            self.received.lock().await.push(message.to_vec());
            if message.starts_with(b"ping") {
                Ok(Some(Bytes::from_static(b"pong")))
            } else {
                Ok(None)
            }
        }
    }

    /// Collects everything sent through the platform primitive.
    struct RecordingSender {
        sent: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl RecordingSender {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ConnectionSender for RecordingSender {
        async fn send(&self, connection_id: &str, message: Bytes) -> Result<(), BridgeError> {
            self.sent
                .lock()
                .await
                .push((connection_id.to_string(), message.to_vec()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn connect_message_close_lifecycle() {
        let sender = Arc::new(RecordingSender::new());
        let relay = ConnectionRelay::new(sender.clone());
        let app = RecordingApp::new();

        relay
            .on_connect(&app, ConnectionInfo::new("c1"))
            .await
            .unwrap();
        assert_eq!(relay.state("c1").await, Some(ConnectionState::Open));

        relay
            .on_message(&app, "c1", Bytes::from_static(b"ping 1"))
            .await
            .unwrap();
        assert_eq!(sender.sent.lock().await.len(), 1);

        relay.on_close(&app, "c1").await.unwrap();
        assert_eq!(relay.state("c1").await, None);
        assert_eq!(relay.open_connections().await, 0);
    }

    #[tokio::test]
    async fn messages_preserve_arrival_order() {
        let relay = ConnectionRelay::new(Arc::new(RecordingSender::new()));
        let app = RecordingApp::new();

        relay
            .on_connect(&app, ConnectionInfo::new("c1"))
            .await
            .unwrap();
        for text in ["m1", "m2", "m3"] {
            relay
                .on_message(&app, "c1", Bytes::copy_from_slice(text.as_bytes()))
                .await
                .unwrap();
        }

        let received = app.received.lock().await;
        assert_eq!(
            *received,
            vec![b"m1".to_vec(), b"m2".to_vec(), b"m3".to_vec()]
        );
    }

    #[tokio::test]
    async fn message_after_close_is_suppressed() {
        let relay = ConnectionRelay::new(Arc::new(RecordingSender::new()));
        let app = RecordingApp::new();

        relay
            .on_connect(&app, ConnectionInfo::new("c1"))
            .await
            .unwrap();
        relay
            .on_message(&app, "c1", Bytes::from_static(b"m1"))
            .await
            .unwrap();
        relay.on_close(&app, "c1").await.unwrap();

        let result = relay.on_message(&app, "c1", Bytes::from_static(b"m2")).await;
        assert!(matches!(result, Err(BridgeError::ConnectionClosed(_))));
        assert_eq!(app.received.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn send_after_close_is_recoverable() {
        let relay = ConnectionRelay::new(Arc::new(RecordingSender::new()));
        let app = RecordingApp::new();

        relay
            .on_connect(&app, ConnectionInfo::new("c1"))
            .await
            .unwrap();
        relay.on_close(&app, "c1").await.unwrap();

        let result = relay.send("c1", Bytes::from_static(b"late")).await;
        assert!(matches!(result, Err(BridgeError::ConnectionClosed(_))));
    }

    #[tokio::test]
    async fn rejected_connect_is_deregistered() {
        struct RejectingApp;

        #[async_trait]
        impl BridgeApp for RejectingApp {
            async fn handle(
                &self,
                _request: CanonicalRequest,
                _ctx: &InvocationContext,
            ) -> Result<CanonicalResponse, BridgeError> {
                Ok(CanonicalResponse::ok())
            }

            async fn on_connect(&self, _connection: &ConnectionInfo) -> Result<(), BridgeError> {
                Err(BridgeError::application("not welcome"))
            }
        }

        let relay = ConnectionRelay::new(Arc::new(RecordingSender::new()));
        let result = relay
            .on_connect(&RejectingApp, ConnectionInfo::new("c1"))
            .await;

        assert!(result.is_err());
        assert_eq!(relay.open_connections().await, 0);
    }

    #[tokio::test]
    async fn distinct_connections_are_independent() {
        let relay = ConnectionRelay::new(Arc::new(RecordingSender::new()));
        let app = RecordingApp::new();

        relay
            .on_connect(&app, ConnectionInfo::new("c1"))
            .await
            .unwrap();
        relay
            .on_connect(&app, ConnectionInfo::new("c2"))
            .await
            .unwrap();
        relay.on_close(&app, "c1").await.unwrap();

        assert_eq!(relay.state("c1").await, None);
        assert_eq!(relay.state("c2").await, Some(ConnectionState::Open));
        relay
            .on_message(&app, "c2", Bytes::from_static(b"still here"))
            .await
            .unwrap();
    }
}
