//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming /proxy request:
//!     → auth.rs (shared-secret header)
//!     → rate_limit.rs (global token bucket)
//!     → [target URL parsed by the handler]
//!     → access_control.rs (hostname suffix allowlist)
//!     → headers.rs (strip Host and Access-Control-* before forwarding)
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any check failure, never retry
//! - Each gate is a plain value built once from the config snapshot
//! - Disabled gates are no-ops rather than absent layers

pub mod access_control;
pub mod auth;
pub mod headers;
pub mod rate_limit;

pub use access_control::DomainFilter;
pub use auth::{auth_middleware, AuthGate};
pub use headers::sanitize_request_headers;
pub use rate_limit::{rate_limit_middleware, RateGate};
