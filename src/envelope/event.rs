//! Wire shapes of the per-invocation envelope delivered by the platform.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Execution context supplied fresh with every invocation. Read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationContext {
    /// Platform-assigned request id, used for log correlation.
    #[serde(default)]
    pub request_id: String,
    /// Remaining time budget for this invocation, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_time_ms: Option<u64>,
    /// Memory limit of the warm process, in megabytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit_mb: Option<u64>,
}

impl InvocationContext {
    /// Create a context with the given request id.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            remaining_time_ms: None,
            memory_limit_mb: None,
        }
    }

    /// Set the remaining time budget.
    pub fn remaining_time_ms(mut self, ms: u64) -> Self {
        self.remaining_time_ms = Some(ms);
        self
    }

    /// Set the memory limit.
    pub fn memory_limit_mb(mut self, mb: u64) -> Self {
        self.memory_limit_mb = Some(mb);
        self
    }
}

/// Payload of an `HTTP` or `GATEWAY` trigger.
///
/// `method` and `path` are optional at the wire layer so their absence is
/// reported as a malformed envelope instead of a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpPayload {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub query: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

/// Payload of a `WS_CONNECT` trigger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsConnectPayload {
    pub connection_id: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub query: HashMap<String, Vec<String>>,
}

/// Payload of a `WS_MESSAGE` trigger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsMessagePayload {
    pub connection_id: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

/// Payload of a `WS_CLOSE` trigger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsClosePayload {
    pub connection_id: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// The event half of an envelope, discriminated by the `trigger` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "trigger")]
pub enum TriggerEvent {
    #[serde(rename = "HTTP")]
    Http(HttpPayload),
    #[serde(rename = "GATEWAY")]
    Gateway(HttpPayload),
    #[serde(rename = "WS_CONNECT")]
    WsConnect(WsConnectPayload),
    #[serde(rename = "WS_MESSAGE")]
    WsMessage(WsMessagePayload),
    #[serde(rename = "WS_CLOSE")]
    WsClose(WsClosePayload),
}

/// One platform-delivered invocation: a trigger event plus its execution
/// context. Immutable; discarded once the invocation completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationEnvelope {
    #[serde(flatten)]
    pub event: TriggerEvent,
    #[serde(default)]
    pub context: InvocationContext,
}

impl InvocationEnvelope {
    /// Wrap a trigger event with a default (empty) context.
    pub fn new(event: TriggerEvent) -> Self {
        Self {
            event,
            context: InvocationContext::default(),
        }
    }

    /// Attach an execution context.
    pub fn with_context(mut self, context: InvocationContext) -> Self {
        self.context = context;
        self
    }
}

/// The response half of the envelope contract, returned to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeResponse {
    pub status_code: u16,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl EnvelopeResponse {
    /// Plain acknowledgement, used for WebSocket trigger invocations where
    /// outbound data travels through the platform send primitive instead.
    pub fn ack() -> Self {
        Self {
            status_code: 200,
            headers: HashMap::new(),
            body: String::new(),
            is_base64_encoded: false,
        }
    }
}
