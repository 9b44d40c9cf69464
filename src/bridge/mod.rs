//! The invocation bridge: envelope in, envelope response out.

mod dispatch;
mod encode;

pub use dispatch::dispatch;
pub use encode::{decode, encode};

pub(crate) use encode::is_safe_text;

use crate::app::{BridgeApp, WarmRegistry};
use crate::envelope::{
    decode_body, normalize, EnvelopeResponse, InvocationContext, InvocationEnvelope, TriggerEvent,
};
use crate::error::BridgeError;
use crate::http::{CanonicalResponse, StatusCode};
use crate::relay::{ConnectionInfo, ConnectionRelay, ConnectionSender};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

type AppFuture<A> = Pin<Box<dyn Future<Output = Result<A, BridgeError>> + Send>>;
type AppFactory<A> = Box<dyn Fn() -> AppFuture<A> + Send + Sync>;

/// Adapts platform invocation envelopes to the embedded application's
/// request/response contract.
///
/// One bridge lives for the whole warm process. The application is built
/// lazily by the factory on the first invocation and reused afterwards;
/// WebSocket triggers are routed through the connection relay instead of the
/// request/response path.
pub struct Bridge<A: BridgeApp + 'static> {
    registry: WarmRegistry<A>,
    factory: AppFactory<A>,
    relay: ConnectionRelay,
    default_budget: Duration,
}

impl<A: BridgeApp + 'static> Bridge<A> {
    /// Create a bridge from an application factory and the platform's
    /// outbound WebSocket primitive.
    pub fn new<F, Fut>(factory: F, sender: Arc<dyn ConnectionSender>) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<A, BridgeError>> + Send + 'static,
    {
        Self {
            registry: WarmRegistry::new(),
            factory: Box::new(move || -> AppFuture<A> { Box::pin(factory()) }),
            relay: ConnectionRelay::new(sender),
            default_budget: Duration::from_secs(30),
        }
    }

    /// Time budget used when the envelope context carries no remaining-time
    /// figure.
    pub fn with_default_budget(mut self, budget: Duration) -> Self {
        self.default_budget = budget;
        self
    }

    /// The WebSocket relay, for server-initiated sends.
    pub fn relay(&self) -> &ConnectionRelay {
        &self.relay
    }

    /// Whether the application has been constructed in this process.
    pub fn is_warm(&self) -> bool {
        self.registry.is_warm()
    }

    /// Handle one platform invocation end to end.
    ///
    /// Returns `Err` only when the envelope cannot be normalized or the
    /// application cannot be constructed; every other condition yields a
    /// well-formed envelope response.
    pub async fn handle(
        &self,
        envelope: InvocationEnvelope,
    ) -> Result<EnvelopeResponse, BridgeError> {
        let InvocationEnvelope { event, context } = envelope;
        let app = self.registry.get_or_init(|| (self.factory)()).await?;

        match event {
            TriggerEvent::Http(payload) | TriggerEvent::Gateway(payload) => {
                let request = normalize(&payload)?;
                debug!(
                    "dispatching {} {} [{}]",
                    request.method, request.path, context.request_id
                );
                let response =
                    dispatch(app.as_ref(), request, &context, self.default_budget).await;
                Ok(encode(response))
            }
            TriggerEvent::WsConnect(payload) => {
                let info = ConnectionInfo::new(payload.connection_id)
                    .headers(payload.headers)
                    .query(payload.query);
                let result = self.relay.on_connect(app.as_ref(), info).await;
                Ok(relay_ack(result, &context))
            }
            TriggerEvent::WsMessage(payload) => {
                let message = decode_body(payload.body.as_deref(), payload.is_base64_encoded)?;
                let result = self
                    .relay
                    .on_message(app.as_ref(), &payload.connection_id, message)
                    .await;
                Ok(relay_ack(result, &context))
            }
            TriggerEvent::WsClose(payload) => {
                if let Some(reason) = &payload.reason {
                    debug!(
                        "connection '{}' closing: {} [{}]",
                        payload.connection_id, reason, context.request_id
                    );
                }
                let result = self
                    .relay
                    .on_close(app.as_ref(), &payload.connection_id)
                    .await;
                Ok(relay_ack(result, &context))
            }
        }
    }
}

/// Map a relay outcome onto the envelope response contract. Closed
/// connections acknowledge with a warning; application failures map to a
/// 500-class response like the request/response path.
fn relay_ack(result: Result<(), BridgeError>, ctx: &InvocationContext) -> EnvelopeResponse {
    match result {
        Ok(()) => EnvelopeResponse::ack(),
        Err(BridgeError::ConnectionClosed(id)) => {
            warn!("connection '{}' already closed [{}]", id, ctx.request_id);
            EnvelopeResponse::ack()
        }
        Err(err) => {
            error!("relay error: {} [{}]", err, ctx.request_id);
            encode(CanonicalResponse::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error",
            ))
        }
    }
}
