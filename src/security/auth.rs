//! Shared-secret authentication for proxy requests.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::InvalidHeaderName, HeaderMap, HeaderName, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ProxyError;

/// Compares the caller's token header against the configured secret.
#[derive(Debug, Clone)]
pub struct AuthGate {
    secret: Option<String>,
    header: HeaderName,
    /// Header name as configured, for rejection messages.
    label: String,
}

impl AuthGate {
    /// `None` or an empty secret disables the gate.
    pub fn new(secret: Option<&str>, header: &str) -> Result<Self, InvalidHeaderName> {
        Ok(Self {
            secret: secret.filter(|s| !s.is_empty()).map(str::to_string),
            header: HeaderName::from_bytes(header.as_bytes())?,
            label: header.to_string(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    /// Exact byte comparison against the first value of the token header.
    pub fn check(&self, headers: &HeaderMap) -> Result<(), ProxyError> {
        let Some(secret) = &self.secret else {
            return Ok(());
        };

        match headers.get(&self.header) {
            Some(provided) if provided.as_bytes() == secret.as_bytes() => Ok(()),
            _ => Err(ProxyError::Unauthorized {
                header: self.label.clone(),
            }),
        }
    }
}

pub async fn auth_middleware(
    State(gate): State<Arc<AuthGate>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match gate.check(request.headers()) {
        Ok(()) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}
