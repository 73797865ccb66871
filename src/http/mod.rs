//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Caller request
//!     → server.rs (Axum setup, request ID, tracing, auth + rate middleware)
//!     → request.rs (extract and validate the target URL)
//!     → [security::access_control allowlist]
//!     → cors.rs (resolve Access-Control-Allow-Origin, preflight short-circuit)
//!     → client.rs (forward with redirect/TLS policy)
//!     → response.rs (relay status, headers, streamed body)
//!     → Send to caller
//! ```

pub mod client;
pub mod cors;
pub mod request;
pub mod response;
pub mod server;

pub use client::ForwardingClient;
pub use cors::CorsPolicy;
pub use request::{Target, UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
