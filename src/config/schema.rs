//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from settings files.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Header carrying the shared secret when auth is enabled.
pub const DEFAULT_AUTH_HEADER: &str = "X-Cors-Relay-Auth-Token";

/// Root configuration snapshot for the relay.
#[derive(Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listening socket.
    pub listener: ListenerConfig,

    /// Admission control: allowlist, rate limit, shared secret.
    pub security: SecurityConfig,

    /// CORS response policy.
    pub cors: CorsConfig,

    /// Outbound client behaviour.
    pub upstream: UpstreamConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

impl ProxyConfig {
    /// The configured secret, if auth is enabled. Empty secrets disable auth.
    pub fn auth_key(&self) -> Option<&str> {
        self.security.auth_key.as_deref().filter(|k| !k.is_empty())
    }

    /// Address the listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.listener.host, self.listener.port)
    }
}

// The auth key never reaches the logs.
impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let auth = if self.auth_key().is_some() { "<redacted>" } else { "<none>" };
        f.debug_struct("ProxyConfig")
            .field("listener", &self.listener)
            .field("allowed_domains", &self.security.allowed_domains)
            .field("rate_limit", &self.security.rate_limit)
            .field("auth_key", &auth)
            .field("auth_header", &self.security.auth_header)
            .field("cors", &self.cors)
            .field("upstream", &self.upstream)
            .field("observability", &self.observability)
            .finish()
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port.
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Admission control settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SecurityConfig {
    /// Hostname suffixes that may be proxied. Empty allows every host.
    pub allowed_domains: Vec<String>,

    /// Requests per minute across all callers. 0 disables rate limiting.
    pub rate_limit: u32,

    /// Shared secret callers must present.
    pub auth_key: Option<String>,

    /// Header the secret is read from.
    pub auth_header: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_domains: Vec::new(),
            rate_limit: 0,
            auth_key: None,
            auth_header: DEFAULT_AUTH_HEADER.to_string(),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CorsConfig {
    /// Origin advertised when no per-caller origin applies. "*" means wildcard.
    pub default_origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            default_origin: "*".to_string(),
        }
    }
}

/// Outbound client configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Skip certificate verification for upstream TLS.
    pub insecure_tls: bool,

    /// Follow 3xx responses instead of relaying them.
    pub follow_redirects: bool,

    /// Redirect hop limit when following.
    pub max_redirects: usize,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Total deadline per upstream exchange in seconds, body included. 0 = none.
    pub request_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            insecure_tls: false,
            follow_redirects: true,
            max_redirects: 10,
            connect_timeout_secs: 10,
            request_timeout_secs: 0,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Verbose request logging.
    pub debug: bool,

    /// Expose a Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            debug: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
