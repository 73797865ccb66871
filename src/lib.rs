//! CORS relay library.
//!
//! A single-endpoint forwarding proxy: `/proxy?url=<target>` forwards the
//! caller's request to `target` and relays the response with permissive CORS
//! headers added, so browser code can reach APIs that do not speak CORS.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::ProxyConfig;
pub use error::{ProxyError, ServerError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
