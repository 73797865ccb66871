//! Target domain allowlist.
//!
//! A hostname passes when it ends with one of the configured suffixes, so
//! `example.com` admits `api.example.com`. Matching is case-sensitive against
//! the hostname as normalised by the URL parser.

use crate::error::ProxyError;

#[derive(Debug, Clone, Default)]
pub struct DomainFilter {
    /// False when no allowlist was configured at all.
    enabled: bool,
    suffixes: Vec<String>,
}

impl DomainFilter {
    /// Build from raw patterns. Patterns are trimmed and blank ones dropped; a
    /// list made only of blank patterns still rejects every host.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut enabled = false;
        let mut suffixes = Vec::new();
        for pattern in patterns {
            enabled = true;
            let trimmed = pattern.as_ref().trim();
            if !trimmed.is_empty() {
                suffixes.push(trimmed.to_string());
            }
        }
        Self { enabled, suffixes }
    }

    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn is_allowed(&self, hostname: &str) -> bool {
        !self.enabled || self.suffixes.iter().any(|s| hostname.ends_with(s.as_str()))
    }

    pub fn check(&self, hostname: &str) -> Result<(), ProxyError> {
        if self.is_allowed(hostname) {
            Ok(())
        } else {
            Err(ProxyError::DomainForbidden {
                host: hostname.to_string(),
            })
        }
    }
}
