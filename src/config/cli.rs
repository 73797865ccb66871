//! Command-line flags.
//!
//! Every flag is optional so that an absent flag falls through to the
//! environment and then the settings file. Boolean flags are tri-state:
//! `--debug` sets true, `--debug=false` sets false, absence leaves it unset.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Default, Clone, Parser)]
#[command(name = "cors-relay")]
#[command(version, about = "CORS-injecting forwarding proxy", long_about = None)]
pub struct CliArgs {
    /// TOML settings file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Interface to listen on
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Comma-separated hostname suffixes that may be proxied
    #[arg(long)]
    pub allowed_domains: Option<String>,

    /// Requests per minute across all callers (0 to disable)
    #[arg(long)]
    pub rate_limit: Option<u32>,

    /// Shared secret required on proxy requests
    #[arg(long)]
    pub auth_key: Option<String>,

    /// Header the shared secret is read from
    #[arg(long)]
    pub auth_header: Option<String>,

    /// Default Access-Control-Allow-Origin value
    #[arg(long)]
    pub default_origin: Option<String>,

    /// Skip upstream TLS certificate verification
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub insecure_tls: Option<bool>,

    /// Follow upstream redirects instead of relaying them
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub follow_redirects: Option<bool>,

    /// Upstream connect timeout in seconds
    #[arg(long)]
    pub connect_timeout_secs: Option<u64>,

    /// Total upstream exchange deadline in seconds (0 for none)
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    /// Enable debug logging
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub debug: Option<bool>,

    /// Expose Prometheus metrics
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub metrics: Option<bool>,

    /// Metrics endpoint bind address
    #[arg(long)]
    pub metrics_address: Option<String>,
}
