//! Error taxonomy for the proxy pipeline.
//!
//! Every stage of `/proxy` handling terminates with one of these kinds; none of
//! them is retried and none propagates past the handler.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::observability::metrics;

/// A terminal failure of a single proxied request.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Unauthorized - Invalid or missing {header} header")]
    Unauthorized { header: String },

    #[error("Too many requests")]
    RateLimited,

    #[error("Missing url query parameter")]
    MissingParameter,

    #[error("Invalid URL provided")]
    InvalidUrl,

    #[error("Domain not allowed: {host}")]
    DomainForbidden { host: String },

    #[error("Failed to create request to target URL: {0}")]
    RequestConstructionFailed(#[source] reqwest::Error),

    #[error("Failed to fetch target URL: {0}")]
    UpstreamUnreachable(#[source] reqwest::Error),
}

impl ProxyError {
    /// Status code sent to the caller for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ProxyError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ProxyError::MissingParameter | ProxyError::InvalidUrl => StatusCode::BAD_REQUEST,
            ProxyError::DomainForbidden { .. } => StatusCode::FORBIDDEN,
            ProxyError::RequestConstructionFailed(_) | ProxyError::UpstreamUnreachable(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short label used for metrics and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            ProxyError::Unauthorized { .. } => "unauthorized",
            ProxyError::RateLimited => "rate_limited",
            ProxyError::MissingParameter => "missing_parameter",
            ProxyError::InvalidUrl => "invalid_url",
            ProxyError::DomainForbidden { .. } => "domain_forbidden",
            ProxyError::RequestConstructionFailed(_) => "request_construction_failed",
            ProxyError::UpstreamUnreachable(_) => "upstream_unreachable",
        }
    }

    /// Classify a failed outbound send.
    pub fn from_send(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ProxyError::RequestConstructionFailed(err)
        } else {
            ProxyError::UpstreamUnreachable(err)
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(reason = self.reason(), error = %self, "Proxy request failed");
        } else {
            tracing::warn!(reason = self.reason(), error = %self, "Proxy request rejected");
        }
        metrics::record_rejection(self.reason());

        (status, self.to_string()).into_response()
    }
}

/// Fatal errors raised while bringing the server up.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to install metrics exporter: {0}")]
    Metrics(String),

    #[error("invalid metrics address: {0}")]
    MetricsAddress(String),

    #[error("listener I/O: {0}")]
    Io(#[from] std::io::Error),
}
