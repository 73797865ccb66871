//! Response relay back to the caller.
//!
//! # Responsibilities
//! - Carry the upstream status and every upstream header verbatim
//! - Add the CORS headers resolved for this request
//! - Stream the upstream body without buffering it
//!
//! # Design Decisions
//! - CORS headers go in first and upstream headers are appended, so nothing the
//!   upstream sent is dropped
//! - A body error after headers are sent ends the response early; it is logged,
//!   never retried
//! - Dropping the response (caller went away) drops the upstream stream, which
//!   closes the upstream connection

use axum::{
    body::Body,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use futures_util::TryStreamExt;

use crate::observability::metrics;

/// Build the caller response from an upstream response.
pub fn relay(upstream: reqwest::Response, cors_headers: HeaderMap) -> Response {
    let status = upstream.status();
    let mut headers = cors_headers;
    for (name, value) in upstream.headers() {
        headers.append(name.clone(), value.clone());
    }

    let target = upstream.url().clone();
    let stream = upstream.bytes_stream().inspect_err(move |e| {
        tracing::warn!(url = %target, error = %e, "Upstream body failed mid-relay");
        metrics::record_relay_error();
    });

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Answer a CORS preflight without contacting the upstream.
pub fn preflight(cors_headers: HeaderMap) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::OK;
    *response.headers_mut() = cors_headers;
    response
}
