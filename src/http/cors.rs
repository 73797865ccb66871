//! CORS response policy.
//!
//! Origin resolution, in order:
//! 1. A pinned (non-`*`) default origin always wins.
//! 2. With auth enabled, the caller's `Origin` is reflected, else the origin
//!    derived from `Referer`, else the default.
//! 3. Without auth, the wildcard.
//!
//! Per-caller reflection is only done once a shared secret has admitted the
//! request; unauthenticated deployments stay on `*`.

use axum::http::{
    header::{
        InvalidHeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
        ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN, REFERER,
    },
    HeaderMap, HeaderValue,
};
use url::Url;

pub const WILDCARD: &str = "*";
pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, PATCH, OPTIONS, HEAD, TRACE, COPY, LINK";

#[derive(Debug, Clone)]
pub struct CorsPolicy {
    default_origin: HeaderValue,
    pinned: bool,
    reflect_caller: bool,
}

impl CorsPolicy {
    pub fn new(default_origin: &str, auth_enabled: bool) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            default_origin: HeaderValue::from_str(default_origin)?,
            pinned: default_origin != WILDCARD,
            reflect_caller: auth_enabled,
        })
    }

    /// The `Access-Control-Allow-Origin` value for a request.
    pub fn resolve_origin(&self, request_headers: &HeaderMap) -> HeaderValue {
        if self.pinned {
            return self.default_origin.clone();
        }

        if self.reflect_caller {
            if let Some(origin) = request_headers.get(ORIGIN).filter(|v| !v.is_empty()) {
                return origin.clone();
            }
            if let Some(origin) = request_headers.get(REFERER).and_then(origin_from_referer) {
                return origin;
            }
            return self.default_origin.clone();
        }

        HeaderValue::from_static(WILDCARD)
    }

    /// CORS headers for a response advertising `origin`.
    pub fn headers_for(&self, origin: HeaderValue) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(4);
        let credentials = origin != WILDCARD;

        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(WILDCARD));
        if credentials {
            headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        }
        headers
    }
}

/// `scheme://host[:port]` of a Referer, if it parses as an absolute URL.
fn origin_from_referer(referer: &HeaderValue) -> Option<HeaderValue> {
    let url = Url::parse(referer.to_str().ok()?).ok()?;
    let host = url.host_str().filter(|h| !h.is_empty())?;
    let origin = match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    };
    HeaderValue::from_str(&origin).ok()
}
