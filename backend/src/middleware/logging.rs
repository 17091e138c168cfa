use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header::CONTENT_LENGTH, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use super::request_id::RequestId;

const MAX_BUFFERED_BODY_BYTES: usize = 256 * 1024;
const MAX_LOGGED_BODY_BYTES: usize = 2048;

/// Logs every 4xx/5xx the relay produces, including statuses passed through
/// from upstream. The body is buffered so it can still be forwarded.
pub async fn log_error_responses(req: Request<Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.as_str().to_string())
        .unwrap_or_default();
    let start = Instant::now();

    let response = next.run(req).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let event = ErrorEvent {
        status: status.as_u16(),
        method: &method,
        path: &path,
        request_id: &request_id,
        latency_ms: start.elapsed().as_millis() as u64,
    };

    let (mut parts, body) = response.into_parts();
    match to_bytes(body, MAX_BUFFERED_BODY_BYTES).await {
        Ok(bytes) => {
            event.log(&preview(&bytes));
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(err) => {
            parts.headers.remove(CONTENT_LENGTH);
            event.log(&format!("<unreadable body: {}>", err));
            Response::from_parts(parts, Body::empty())
        }
    }
}

fn preview(bytes: &Bytes) -> String {
    if bytes.len() > MAX_LOGGED_BODY_BYTES {
        format!(
            "{}... (truncated, {} bytes total)",
            String::from_utf8_lossy(&bytes[..MAX_LOGGED_BODY_BYTES]),
            bytes.len()
        )
    } else {
        String::from_utf8_lossy(bytes).to_string()
    }
}

struct ErrorEvent<'a> {
    status: u16,
    method: &'a str,
    path: &'a str,
    request_id: &'a str,
    latency_ms: u64,
}

impl ErrorEvent<'_> {
    fn log(&self, body: &str) {
        let ErrorEvent {
            status,
            method,
            path,
            request_id,
            latency_ms,
        } = *self;
        if status >= 500 {
            tracing::error!(
                status,
                method,
                path,
                request_id,
                latency_ms,
                body,
                "Relay request completed with error status"
            );
        } else {
            tracing::warn!(
                status,
                method,
                path,
                request_id,
                latency_ms,
                body,
                "Relay request completed with error status"
            );
        }
    }
}
