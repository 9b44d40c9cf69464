//! Bridge error taxonomy.

/// Errors produced by the invocation bridge.
///
/// Only `MalformedEnvelope` and `Init` surface to the platform as invocation
/// failures; the remaining variants are absorbed at the bridge boundary and
/// mapped to well-formed envelope responses.
#[derive(Debug, Clone)]
pub enum BridgeError {
    /// The envelope could not be normalized into a canonical request.
    /// Fatal for the invocation and never retried.
    MalformedEnvelope(String),
    /// The embedded application failed while handling a dispatch.
    Application(String),
    /// The invocation exceeded its remaining-time budget.
    Timeout,
    /// A send or message delivery was attempted on a closed connection.
    /// Recoverable; the remote peer may simply have disconnected first.
    ConnectionClosed(String),
    /// The warm application factory failed. Fatal for this invocation,
    /// but the registry stays empty so the next invocation may retry.
    Init(String),
}

impl BridgeError {
    /// Create a malformed-envelope error.
    pub fn malformed(message: impl Into<String>) -> Self {
        BridgeError::MalformedEnvelope(message.into())
    }

    /// Create an application error.
    pub fn application(message: impl Into<String>) -> Self {
        BridgeError::Application(message.into())
    }

    /// Create a connection-closed error for the given connection id.
    pub fn connection_closed(connection_id: impl Into<String>) -> Self {
        BridgeError::ConnectionClosed(connection_id.into())
    }

    /// Create a warm-init error.
    pub fn init(message: impl Into<String>) -> Self {
        BridgeError::Init(message.into())
    }
}

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BridgeError::MalformedEnvelope(msg) => write!(f, "malformed envelope: {}", msg),
            BridgeError::Application(msg) => write!(f, "application error: {}", msg),
            BridgeError::Timeout => write!(f, "invocation time budget exhausted"),
            BridgeError::ConnectionClosed(id) => write!(f, "connection '{}' is closed", id),
            BridgeError::Init(msg) => write!(f, "warm application init failed: {}", msg),
        }
    }
}

impl std::error::Error for BridgeError {}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        BridgeError::application(err.to_string())
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::malformed(err.to_string())
    }
}
