use std::time::Instant;

use axum::{
    body::{Body, Bytes, HttpBody},
    extract::Request,
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::ServerError;

pub static X_TRACE_ID: &str = "x-trace-id";

/// Bodies at or above this size are not logged.
const MAX_LOGGED_BODY: usize = 1024;

/// Request bodies are buffered up to this size; larger ones get a 413.
pub const MAX_REQUEST_BODY: usize = 64 * 1024;

pub async fn trace_middleware(req: Request<Body>, next: Next) -> Response {
    let start_time = Instant::now();

    // Reuse the caller's trace id when it is a UUID.
    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);
    let trace_header = HeaderValue::from_str(&trace_id.to_string()).ok();

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        info!("→ request started");
        let (mut parts, body) = req.into_parts();
        let limited = Limited::new(body, MAX_REQUEST_BODY);
        let response = match buffer_and_log("request", &parts.headers, limited).await {
            Ok(req_bytes) => {
                if let Some(v) = &trace_header {
                    parts.headers.insert(X_TRACE_ID, v.clone());
                }
                next.run(Request::from_parts(parts, Body::from(req_bytes))).await
            }
            Err(e) if e.is::<LengthLimitError>() => {
                warn!(limit = MAX_REQUEST_BODY, "request body too large");
                ServerError::PayloadTooLarge(MAX_REQUEST_BODY).into_response()
            }
            Err(e) => {
                warn!(error = %e, "failed to buffer request body");
                ServerError::BadRequest(format!("could not read request body: {e}")).into_response()
            }
        };

        let (mut parts, body) = response.into_parts();
        let res_bytes = buffer_and_log("response", &parts.headers, body)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to buffer response body");
                Bytes::new()
            });
        if let Some(v) = trace_header {
            parts.headers.insert(X_TRACE_ID, v);
        }

        info!(
            status = parts.status.as_u16(),
            latency_ms = start_time.elapsed().as_millis() as u64,
            "← response finished"
        );

        Response::from_parts(parts, Body::from(res_bytes))
    }
    .instrument(span)
    .await
}

/// Collect `body`, logging it when it is small JSON.
async fn buffer_and_log<B>(direction: &str, headers: &HeaderMap, body: B) -> Result<Bytes, B::Error>
where
    B: HttpBody<Data = Bytes>,
{
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let bytes = body.collect().await?.to_bytes();

    if content_type.contains("application/json") && bytes.len() < MAX_LOGGED_BODY {
        if let Ok(text) = std::str::from_utf8(&bytes) {
            debug!(direction, body = %text, "body");
        }
    } else if !bytes.is_empty() {
        debug!(direction, content_type, size = bytes.len(), "body skipped");
    }

    Ok(bytes)
}
