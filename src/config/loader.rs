//! Configuration loading and layering.
//!
//! Each setting resolves as: explicit flag > environment variable > settings
//! file > built-in default. Environment lookups go through a closure so the
//! layering can be exercised without touching the process environment.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::config::cli::CliArgs;
use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming a TOML settings file.
pub const CONFIG_PATH_ENV: &str = "CORS_RELAY_CONFIG";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value {value:?} for environment variable {key}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn read_settings_file(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Resolve the process configuration from flags and the real environment.
pub fn from_process(cli: &CliArgs) -> Result<ProxyConfig, ConfigError> {
    resolve(cli, |key| std::env::var(key).ok())
}

/// Resolve a configuration snapshot from flags, environment and settings file.
pub fn resolve<F>(cli: &CliArgs, env: F) -> Result<ProxyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let env = Env(env);

    let settings_path = cli
        .config
        .clone()
        .or_else(|| env.string(CONFIG_PATH_ENV).map(PathBuf::from));
    let mut config = match settings_path {
        Some(path) => read_settings_file(&path)?,
        None => ProxyConfig::default(),
    };

    layer(&mut config.listener.host, non_empty(&cli.host), env.string("HOST"));
    layer(&mut config.listener.port, cli.port, env.parse("PORT")?);

    layer(
        &mut config.security.allowed_domains,
        non_empty(&cli.allowed_domains).map(|raw| split_domains(&raw)),
        env.string("ALLOWED_DOMAINS").map(|raw| split_domains(&raw)),
    );
    layer(&mut config.security.rate_limit, cli.rate_limit, env.parse("RATE_LIMIT")?);
    layer(
        &mut config.security.auth_key,
        non_empty(&cli.auth_key).map(Some),
        env.string("AUTH_KEY").map(Some),
    );
    layer(
        &mut config.security.auth_header,
        non_empty(&cli.auth_header),
        env.string("AUTH_HEADER"),
    );

    layer(
        &mut config.cors.default_origin,
        non_empty(&cli.default_origin),
        env.string("DEFAULT_ORIGIN"),
    );

    layer(&mut config.upstream.insecure_tls, cli.insecure_tls, env.flag("INSECURE_TLS")?);
    layer(
        &mut config.upstream.follow_redirects,
        cli.follow_redirects,
        env.flag("FOLLOW_REDIRECTS")?,
    );
    layer(
        &mut config.upstream.connect_timeout_secs,
        cli.connect_timeout_secs,
        env.parse("CONNECT_TIMEOUT_SECS")?,
    );
    layer(
        &mut config.upstream.request_timeout_secs,
        cli.request_timeout_secs,
        env.parse("REQUEST_TIMEOUT_SECS")?,
    );

    layer(&mut config.observability.debug, cli.debug, env.flag("DEBUG")?);
    layer(
        &mut config.observability.metrics_enabled,
        cli.metrics,
        env.flag("METRICS_ENABLED")?,
    );
    layer(
        &mut config.observability.metrics_address,
        non_empty(&cli.metrics_address),
        env.string("METRICS_ADDRESS"),
    );

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overwrite `slot` with the highest-precedence value that is set.
fn layer<T>(slot: &mut T, flag: Option<T>, env: Option<T>) {
    if let Some(value) = flag.or(env) {
        *slot = value;
    }
}

/// A string flag given as empty counts as unset, like an empty variable.
fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

fn split_domains(raw: &str) -> Vec<String> {
    raw.split(',').map(str::to_string).collect()
}

/// Parse a tri-state boolean. `None` means the text is not a recognised boolean.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Empty variables count as unset.
    fn string(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn parse<T: FromStr>(&self, key: &'static str) -> Result<Option<T>, ConfigError> {
        match self.string(key) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::InvalidEnv { key, value: raw }),
        }
    }

    fn flag(&self, key: &'static str) -> Result<Option<bool>, ConfigError> {
        match self.string(key) {
            None => Ok(None),
            Some(raw) => parse_bool(&raw)
                .map(Some)
                .ok_or(ConfigError::InvalidEnv { key, value: raw }),
        }
    }
}
