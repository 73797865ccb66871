//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env (dotenvy, loaded into the process environment)
//! optional settings file (TOML)
//!     → loader.rs (layer: flag > env > file > default)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc with every request
//! ```
//!
//! # Design Decisions
//! - Config is immutable once resolved; there is no reload path
//! - All fields have defaults to allow minimal configs
//! - Booleans are tri-state until resolved, so "unset" never reads as "false"

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::CliArgs;
pub use loader::{resolve, ConfigError};
pub use schema::{
    CorsConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, SecurityConfig, UpstreamConfig,
};
