//! Per-connection state for the WebSocket relay.

use std::collections::HashMap;

/// Lifecycle of one duplex channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// The connection is established and may carry messages both ways.
    Open,
    /// A close has been observed; no new messages are dispatched.
    Closing,
    /// Resources are released; any send is a no-op warning.
    Closed,
}

/// Facts about a connection captured at connect time.
#[derive(Debug, Clone, Default)]
pub struct ConnectionInfo {
    /// Platform-assigned connection id.
    pub id: String,
    /// Headers of the connect request, keys lowercased.
    pub headers: HashMap<String, String>,
    /// Query parameters of the connect request.
    pub query: HashMap<String, Vec<String>>,
}

impl ConnectionInfo {
    /// Create connection info with just an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            headers: HashMap::new(),
            query: HashMap::new(),
        }
    }

    /// Attach connect-request headers, lowercasing the keys.
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers
            .into_iter()
            .map(|(key, value)| (key.to_ascii_lowercase(), value))
            .collect();
        self
    }

    /// Attach connect-request query parameters.
    pub fn query(mut self, query: HashMap<String, Vec<String>>) -> Self {
        self.query = query;
        self
    }
}

/// One open duplex channel. Never shared across connection ids.
#[derive(Debug)]
pub struct Connection {
    /// Connect-time context.
    pub info: ConnectionInfo,
    /// Current lifecycle state.
    pub state: ConnectionState,
}

impl Connection {
    /// Register a freshly-opened connection.
    pub fn open(info: ConnectionInfo) -> Self {
        Self {
            info,
            state: ConnectionState::Open,
        }
    }

    /// Whether messages may still be dispatched on this connection.
    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }
}
