//! Structured logging.
//!
//! `RUST_LOG` wins when set; otherwise the `debug` setting picks between
//! request-level and startup-level verbosity.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

const DEBUG_FILTER: &str = "cors_relay=debug,tower_http=debug";
const DEFAULT_FILTER: &str = "cors_relay=info";

pub fn default_filter(config: &ObservabilityConfig) -> &'static str {
    if config.debug {
        DEBUG_FILTER
    } else {
        DEFAULT_FILTER
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init(config: &ObservabilityConfig) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(config).into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
