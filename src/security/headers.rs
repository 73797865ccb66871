//! Request header sanitizing.
//!
//! The outbound request carries every inbound header except `Host`, which the
//! client recomputes for the new target, and any `Access-Control-*` header,
//! which only concerns the browser-to-relay hop.

use axum::http::HeaderMap;

const CORS_PREFIX: &str = "access-control-";

/// True for header names that must not reach the upstream.
pub fn is_excluded(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name == "host" || name.starts_with(CORS_PREFIX)
}

/// Copy forwardable headers, keeping every value of multi-valued headers in order.
pub fn sanitize_request_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut outbound = HeaderMap::with_capacity(inbound.len());
    for (name, value) in inbound {
        if is_excluded(name.as_str()) {
            continue;
        }
        outbound.append(name.clone(), value.clone());
    }
    outbound
}
