//! Configuration validation.
//!
//! Serde handles syntax; this module checks values that would only fail later,
//! at request time, if accepted. All problems are reported, not just the first.

use std::fmt;
use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};

use crate::config::schema::ProxyConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration snapshot before it is accepted.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::new("listener.port", "port cannot be 0"));
    }

    let origin = &config.cors.default_origin;
    if origin.is_empty() {
        errors.push(ValidationError::new("cors.default_origin", "cannot be empty"));
    } else if HeaderValue::from_str(origin).is_err() {
        errors.push(ValidationError::new(
            "cors.default_origin",
            format!("{:?} is not a valid header value", origin),
        ));
    }

    if HeaderName::from_bytes(config.security.auth_header.as_bytes()).is_err() {
        errors.push(ValidationError::new(
            "security.auth_header",
            format!("{:?} is not a valid header name", config.security.auth_header),
        ));
    }

    if config.upstream.follow_redirects && config.upstream.max_redirects == 0 {
        errors.push(ValidationError::new(
            "upstream.max_redirects",
            "must be at least 1 when following redirects",
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("{:?} is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
