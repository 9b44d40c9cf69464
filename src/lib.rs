//! # Trestle - Function Invocation Bridge
//!
//! Trestle adapts a platform-defined "invocation envelope" (an event plus
//! execution context, delivered once per trigger firing) into the
//! request/response model of an embedded server application, and translates
//! the application's response back into the envelope shape the platform
//! expects.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Hosting Platform                             │
//! │          (HTTP trigger / gateway call / WebSocket event)            │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                   │  InvocationEnvelope
//!                                   ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                              Bridge                                 │
//! │   ┌────────────┐   ┌──────────────┐   ┌──────────┐   ┌─────────┐   │
//! │   │  Envelope  │──▶│     Warm     │──▶│   HTTP   │──▶│Response │   │
//! │   │ Normalizer │   │   Registry   │   │  Bridge  │   │ Encoder │   │
//! │   └────────────┘   └──────────────┘   └──────────┘   └─────────┘   │
//! │                            │          ┌────────────┐               │
//! │                            └─────────▶│ Connection │ (WS triggers) │
//! │                                       │   Relay    │               │
//! │                                       └────────────┘               │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                   │  EnvelopeResponse / send()
//!                                   ▼
//!                          embedded application
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trestle::prelude::*;
//!
//! // The embedded application, consumed through its request/response
//! // contract.
//! struct HelloApp;
//!
//! #[async_trait::async_trait]
//! impl BridgeApp for HelloApp {
//!     async fn handle(
//!         &self,
//!         request: CanonicalRequest,
//!         _ctx: &InvocationContext,
//!     ) -> Result<CanonicalResponse, BridgeError> {
//!         Ok(CanonicalResponse::text(format!("Hello from {}", request.path)))
//!     }
//! }
//!
//! // The platform's outbound WebSocket primitive.
//! struct NullSender;
//!
//! #[async_trait::async_trait]
//! impl ConnectionSender for NullSender {
//!     async fn send(&self, _connection_id: &str, _message: bytes::Bytes) -> Result<(), BridgeError> {
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let bridge = Bridge::new(|| async { Ok(HelloApp) }, Arc::new(NullSender));
//!     let server = LocalServer::new(BridgeConfig::default(), bridge);
//!     server.run().await
//! }
//! ```
//!
//! ## Warm lifecycle
//!
//! The application is constructed at most once per process, on the first
//! invocation; concurrent cold-start invocations serialize on the registry
//! so every caller observes the same instance. A transient construction
//! failure is retried by the next invocation.
//!
//! ## Triggers
//!
//! `HTTP` and `GATEWAY` envelopes flow through normalize → dispatch →
//! encode. `WS_CONNECT`/`WS_MESSAGE`/`WS_CLOSE` envelopes are routed to the
//! connection relay, which tracks per-connection state and delivers
//! outbound messages through the platform's `send(connectionId, bytes)`
//! primitive.

pub mod app;
pub mod bridge;
pub mod envelope;
pub mod error;
pub mod http;
pub mod relay;
pub mod runtime;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::app::{BridgeApp, WarmRegistry};
    pub use crate::bridge::Bridge;
    pub use crate::envelope::{
        EnvelopeResponse, HttpPayload, InvocationContext, InvocationEnvelope, TriggerEvent,
    };
    pub use crate::error::BridgeError;
    pub use crate::http::{CanonicalRequest, CanonicalResponse, Method, StatusCode};
    pub use crate::relay::{ConnectionInfo, ConnectionRelay, ConnectionSender, ConnectionState};
    pub use crate::runtime::{BridgeConfig, LocalServer};
    pub use async_trait::async_trait;
}

// Re-export for convenience
pub use app::{BridgeApp, WarmRegistry};
pub use bridge::Bridge;
pub use envelope::{EnvelopeResponse, InvocationContext, InvocationEnvelope, TriggerEvent};
pub use error::BridgeError;
pub use http::{CanonicalRequest, CanonicalResponse};
pub use relay::{ConnectionRelay, ConnectionSender};
pub use runtime::{BridgeConfig, LocalServer};
