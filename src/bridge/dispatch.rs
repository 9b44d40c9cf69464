//! Driving one canonical request through the embedded application.

use crate::app::BridgeApp;
use crate::envelope::InvocationContext;
use crate::http::{CanonicalRequest, CanonicalResponse, StatusCode};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, warn};

/// Dispatch a canonical request to the application's entry point, bounded by
/// the invocation's remaining-time budget.
///
/// A handled response passes through byte-exact. An application error maps
/// to a 500-class response with a generic body and is reported, never
/// retried; budget exhaustion abandons the in-flight dispatch and maps to a
/// 504-class response.
pub async fn dispatch<A: BridgeApp + ?Sized>(
    app: &A,
    request: CanonicalRequest,
    ctx: &InvocationContext,
    default_budget: Duration,
) -> CanonicalResponse {
    let budget = ctx
        .remaining_time_ms
        .map(Duration::from_millis)
        .unwrap_or(default_budget);

    match timeout(budget, app.handle(request, ctx)).await {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => {
            error!("application error: {} [{}]", err, ctx.request_id);
            CanonicalResponse::error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
        Err(_) => {
            warn!(
                "time budget of {}ms exhausted [{}]",
                budget.as_millis(),
                ctx.request_id
            );
            CanonicalResponse::error(StatusCode::GATEWAY_TIMEOUT, "invocation timed out")
        }
    }
}
