//! Trestle - Example bridge runtime
//!
//! This example runs the local invocation server in front of a small sample
//! application.

use bytes::Bytes;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use trestle::prelude::*;

/// Sample embedded application: greeting, echo, and a WebSocket echo hook.
struct DemoApp;

#[async_trait]
impl BridgeApp for DemoApp {
    async fn handle(
        &self,
        request: CanonicalRequest,
        ctx: &InvocationContext,
    ) -> Result<CanonicalResponse, BridgeError> {
        match (request.method, request.path.as_str()) {
            (Method::Get, "/hello") => {
                let name = request
                    .query_value("name")
                    .cloned()
                    .unwrap_or_else(|| "World".to_string());

                let body = serde_json::json!({
                    "message": format!("Hello, {}!", name),
                    "request_id": ctx.request_id,
                });
                CanonicalResponse::json(&body).map_err(|e| BridgeError::application(e.to_string()))
            }
            (Method::Post, "/echo") => {
                // Byte-exact echo; the encoder flips to base64 on its own
                // for binary payloads.
                Ok(CanonicalResponse::ok()
                    .header(
                        "Content-Type",
                        request
                            .header_value("content-type")
                            .cloned()
                            .unwrap_or_else(|| "application/octet-stream".to_string()),
                    )
                    .body(request.body))
            }
            _ => Ok(CanonicalResponse::error(StatusCode::NOT_FOUND, "no route")),
        }
    }

    async fn on_message(
        &self,
        connection_id: &str,
        message: Bytes,
    ) -> Result<Option<Bytes>, BridgeError> {
        tracing::info!(
            "echoing {} bytes on connection '{}'",
            message.len(),
            connection_id
        );
        Ok(Some(message))
    }
}

/// Outbound WebSocket primitive for local runs: logs instead of sending.
struct LogSender;

#[async_trait]
impl ConnectionSender for LogSender {
    async fn send(&self, connection_id: &str, message: Bytes) -> Result<(), BridgeError> {
        tracing::info!(
            "outbound message on '{}': {} bytes",
            connection_id,
            message.len()
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting Trestle invocation bridge...");

    let config = BridgeConfig::new()
        .host("0.0.0.0")
        .port(8080)
        .invocation_timeout(30);

    let bridge = Bridge::new(
        || async {
            // Blocking setup for the embedded application happens here,
            // exactly once per warm process.
            Ok(DemoApp)
        },
        Arc::new(LogSender),
    );

    let server = LocalServer::new(config, bridge);

    tracing::info!("Try: curl http://localhost:8080/hello?name=Trestle");
    tracing::info!("Try: curl -X POST --data-binary @file.bin http://localhost:8080/echo");

    server.run().await
}
