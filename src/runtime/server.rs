//! Local invocation server.
//!
//! Wraps each incoming plain HTTP request into an HTTP-trigger envelope,
//! feeds it through the bridge, and maps the envelope response back onto the
//! wire. This stands in for the hosting platform during development; it
//! drives the request/response triggers only.

use crate::app::BridgeApp;
use crate::bridge::{decode, is_safe_text, Bridge};
use crate::envelope::{
    EnvelopeResponse, HttpPayload, InvocationContext, InvocationEnvelope, TriggerEvent,
};
use crate::error::BridgeError;
use crate::runtime::BridgeConfig;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// Development server that plays the platform's role in front of a bridge.
pub struct LocalServer<A: BridgeApp + 'static> {
    config: BridgeConfig,
    bridge: Arc<Bridge<A>>,
}

impl<A: BridgeApp + 'static> LocalServer<A> {
    /// Create a local server around a bridge.
    pub fn new(config: BridgeConfig, bridge: Bridge<A>) -> Self {
        let bridge = Arc::new(bridge.with_default_budget(config.default_budget()));
        Self { config, bridge }
    }

    /// The wrapped bridge.
    pub fn bridge(&self) -> Arc<Bridge<A>> {
        self.bridge.clone()
    }

    /// Start serving.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr: SocketAddr = self.config.bind_addr().parse()?;
        let listener = TcpListener::bind(addr).await?;

        info!("local invocation server listening on {}", addr);

        loop {
            let (stream, remote_addr) = listener.accept().await?;
            let io = TokioIo::new(stream);

            let bridge = self.bridge.clone();
            let config = self.config.clone();

            tokio::task::spawn(async move {
                let service = service_fn(move |req| {
                    let bridge = bridge.clone();
                    let config = config.clone();
                    async move { handle_request(req, bridge, config, remote_addr).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!("error serving connection: {:?}", err);
                }
            });
        }
    }
}

/// Handle one incoming HTTP request as an envelope invocation.
async fn handle_request<A: BridgeApp + 'static>(
    req: Request<Incoming>,
    bridge: Arc<Bridge<A>>,
    config: BridgeConfig,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let request_id = generate_request_id();

    debug!(
        "handling {} {} from {} [{}]",
        req.method(),
        req.uri().path(),
        remote_addr,
        request_id
    );

    let envelope = match wrap_request(req, &config, &request_id).await {
        Ok(envelope) => envelope,
        Err(err) => {
            warn!("failed to wrap request: {} [{}]", err, request_id);
            return Ok(plain_response(
                hyper::StatusCode::BAD_REQUEST,
                err.to_string(),
            ));
        }
    };

    match bridge.handle(envelope).await {
        Ok(response) => Ok(build_response(response)),
        Err(err @ BridgeError::MalformedEnvelope(_)) => {
            warn!("invocation rejected: {} [{}]", err, request_id);
            Ok(plain_response(
                hyper::StatusCode::BAD_REQUEST,
                err.to_string(),
            ))
        }
        Err(err) => {
            error!("invocation failed: {} [{}]", err, request_id);
            Ok(plain_response(
                hyper::StatusCode::INTERNAL_SERVER_ERROR,
                "internal error",
            ))
        }
    }
}

/// Wrap a hyper request into an HTTP-trigger invocation envelope.
async fn wrap_request(
    req: Request<Incoming>,
    config: &BridgeConfig,
    request_id: &str,
) -> Result<InvocationEnvelope, Box<dyn std::error::Error + Send + Sync>> {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let query = parse_query(req.uri().query());

    let mut headers = HashMap::new();
    for (name, value) in req.headers() {
        if let Ok(v) = value.to_str() {
            headers.insert(name.as_str().to_string(), v.to_string());
        }
    }

    let body_bytes = req.collect().await?.to_bytes();
    if body_bytes.len() > config.max_body_size {
        return Err("request body too large".into());
    }

    // Mirror the response encoder's decision on the inbound edge: payloads
    // outside the safe-text range cross the envelope as base64.
    let (body, is_base64_encoded) = if body_bytes.is_empty() {
        (None, false)
    } else if is_safe_text(&body_bytes) {
        (
            Some(String::from_utf8_lossy(&body_bytes).into_owned()),
            false,
        )
    } else {
        (Some(STANDARD.encode(&body_bytes)), true)
    };

    let payload = HttpPayload {
        method: Some(method),
        path: Some(path),
        headers,
        query,
        body,
        is_base64_encoded,
    };

    let context = InvocationContext::new(request_id)
        .remaining_time_ms(config.invocation_timeout * 1000);

    Ok(InvocationEnvelope::new(TriggerEvent::Http(payload)).with_context(context))
}

/// Parse a raw query string into a multi-value map. Values are kept as
/// delivered; percent-decoding is left to the application.
fn parse_query(raw: Option<&str>) -> HashMap<String, Vec<String>> {
    let mut query: HashMap<String, Vec<String>> = HashMap::new();
    let Some(raw) = raw else {
        return query;
    };
    for pair in raw.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        query
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }
    query
}

/// Map an envelope response back onto the wire, decoding base64 bodies.
fn build_response(envelope: EnvelopeResponse) -> Response<Full<Bytes>> {
    let status = hyper::StatusCode::from_u16(envelope.status_code).unwrap_or_else(|_| {
        warn!(
            "invalid status code {}, falling back to 500 Internal Server Error",
            envelope.status_code
        );
        hyper::StatusCode::INTERNAL_SERVER_ERROR
    });

    let body = match decode(&envelope) {
        Ok(body) => body,
        Err(err) => {
            error!("undecodable envelope response body: {}", err);
            return plain_response(hyper::StatusCode::BAD_GATEWAY, "bad envelope response");
        }
    };

    let mut builder = Response::builder().status(status);
    for (name, value) in &envelope.headers {
        builder = builder.header(name, value);
    }

    match builder.body(Full::new(body)) {
        Ok(response) => response,
        Err(err) => {
            error!("failed to assemble response: {}", err);
            plain_response(hyper::StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

fn plain_response(status: hyper::StatusCode, message: impl Into<String>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(message.into())));
    *response.status_mut() = status;
    response
}

/// Generate a unique request ID.
fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{:x}", timestamp)
}
