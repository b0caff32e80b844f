//! Request-scoped tracing for the HTTP layer. Every request gets its own id
//! so log lines from concurrent requests can be told apart.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use tracing::{Level, Span};
use uuid::Uuid;

pub fn make_span_with_request_id(request: &Request<Body>) -> Span {
    let request_id = Uuid::new_v4();
    tracing::span!(
        Level::INFO,
        "[REQUEST]",
        method = tracing::field::display(request.method()),
        uri = tracing::field::display(request.uri()),
        version = tracing::field::debug(request.version()),
        request_id = tracing::field::display(request_id),
        status_code = tracing::field::Empty,
    )
}

pub fn on_request(_request: &Request<Body>, _span: &Span) {
    tracing::event!(Level::INFO, "[REQUEST START]");
}

pub fn on_response(response: &Response<Body>, _latency: Duration, span: &Span) {
    span.record("status_code", tracing::field::display(response.status()));
    tracing::event!(Level::INFO, "[REQUEST END]");
}
