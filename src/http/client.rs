//! Outbound forwarding client.
//!
//! One `reqwest::Client` is built at startup from the upstream config and
//! shared by every request. It carries the redirect and TLS-verification
//! policy; `https` targets always go over TLS regardless of the verification
//! setting.

use std::time::Duration;

use axum::{
    body::{Body, HttpBody},
    http::{HeaderMap, Method},
};
use reqwest::redirect::Policy;
use url::Url;

use crate::config::UpstreamConfig;
use crate::error::ProxyError;

#[derive(Debug, Clone)]
pub struct ForwardingClient {
    client: reqwest::Client,
}

impl ForwardingClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .redirect(redirect_policy(config))
            .danger_accept_invalid_certs(config.insecure_tls)
            .no_proxy();

        if config.connect_timeout_secs > 0 {
            builder = builder.connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        }
        if config.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.request_timeout_secs));
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Send a request upstream and return as soon as response headers arrive.
    ///
    /// The body is streamed, never buffered. A 3xx that is not followed comes
    /// back like any other response.
    pub async fn forward(
        &self,
        method: Method,
        target: Url,
        headers: HeaderMap,
        body: Body,
    ) -> Result<reqwest::Response, ProxyError> {
        let mut builder = self.client.request(method, target).headers(headers);
        if let Some(body) = outbound_body(body) {
            builder = builder.body(body);
        }

        let request = builder.build().map_err(ProxyError::RequestConstructionFailed)?;
        self.client
            .execute(request)
            .await
            .map_err(ProxyError::from_send)
    }
}

fn redirect_policy(config: &UpstreamConfig) -> Policy {
    if config.follow_redirects {
        Policy::limited(config.max_redirects)
    } else {
        Policy::none()
    }
}

/// Requests that arrived without a body are sent without one.
fn outbound_body(body: Body) -> Option<reqwest::Body> {
    if body.is_end_stream() {
        None
    } else {
        Some(reqwest::Body::wrap_stream(body.into_data_stream()))
    }
}
