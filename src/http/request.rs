//! Inbound request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for tracing
//! - Extract the `url` query parameter
//! - Validate the target as an absolute URL with a host
//!
//! # Design Decisions
//! - Request ID added as early as possible, before any gate can reject
//! - Only a caller-sent request ID is forwarded upstream
//! - Only the first `url` parameter counts; later duplicates are ignored
//! - The hostname used for allowlisting excludes port and IPv6 brackets

use axum::{
    body::Body,
    http::{Extensions, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tower_http::request_id::{MakeRequestId, RequestId};
use url::{Host, Url};
use uuid::Uuid;

use crate::error::ProxyError;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Query parameter holding the target URL.
pub const TARGET_PARAM: &str = "url";

/// Issues a fresh UUID v4 for every request lacking an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = HeaderValue::from_str(&Uuid::new_v4().to_string()).ok()?;
        Some(RequestId::new(id))
    }
}

/// Marks a request whose caller supplied its own `x-request-id`.
#[derive(Debug, Clone, Copy)]
pub struct CallerRequestId;

/// Runs ahead of request ID generation to remember whether the caller sent one.
pub async fn tag_caller_request_id(mut request: Request<Body>, next: Next) -> Response {
    if request.headers().contains_key(X_REQUEST_ID) {
        request.extensions_mut().insert(CallerRequestId);
    }
    next.run(request).await
}

/// Remove a relay-generated `x-request-id` from outbound headers.
pub fn strip_generated_request_id(headers: &mut HeaderMap, extensions: &Extensions) {
    if extensions.get::<CallerRequestId>().is_none() {
        headers.remove(X_REQUEST_ID);
    }
}

/// The request ID assigned on arrival, for log correlation.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// First non-empty value of the `url` query parameter.
pub fn target_param(query: Option<&str>) -> Result<String, ProxyError> {
    let query = query.ok_or(ProxyError::MissingParameter)?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == TARGET_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .ok_or(ProxyError::MissingParameter)
}

/// A validated proxy target.
#[derive(Debug, Clone)]
pub struct Target {
    url: Url,
    hostname: String,
}

impl Target {
    /// Parse an absolute URL. Anything without both a scheme and a host is invalid.
    pub fn parse(raw: &str) -> Result<Self, ProxyError> {
        let url = Url::parse(raw).map_err(|_| ProxyError::InvalidUrl)?;
        let hostname = match url.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            _ => return Err(ProxyError::InvalidUrl),
        };
        Ok(Self { url, hostname })
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Host without port, as matched against the allowlist.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn into_url(self) -> Url {
        self.url
    }
}
