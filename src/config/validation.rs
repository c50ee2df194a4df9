//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that addresses and URLs parse
//! - Check mode requirements (proxy mode needs an upstream)
//! - Validate value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MockConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{MockConfig, ServerMode};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("upstream.base_url '{url}' is invalid: {reason}")]
    InvalidUpstreamUrl { url: String, reason: String },

    #[error("proxy mode requires upstream.base_url")]
    MissingUpstream,

    #[error("base_path '{0}' must start with '/'")]
    InvalidBasePath(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("auth.token must not be empty when auth is enabled")]
    EmptyAuthToken,

    #[error("spec.path must not be empty")]
    EmptySpecPath,

    #[error("API_DOUBLE_MODE '{0}' is not 'mock' or 'proxy'")]
    InvalidModeOverride(String),
}

/// Check a configuration, collecting every problem.
pub fn validate_config(config: &MockConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    match config.upstream.base_url.as_deref() {
        Some(raw) => match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ValidationError::InvalidUpstreamUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            }),
            Err(e) => errors.push(ValidationError::InvalidUpstreamUrl {
                url: raw.to_string(),
                reason: e.to_string(),
            }),
        },
        None if config.mode == ServerMode::Proxy => errors.push(ValidationError::MissingUpstream),
        None => {}
    }

    if let Some(base) = config.base_path.as_deref() {
        if !base.starts_with('/') {
            errors.push(ValidationError::InvalidBasePath(base.to_string()));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }
    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("upstream.timeout_secs"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroValue("security.max_body_size"));
    }

    if config.mode == ServerMode::Mock && config.auth.enabled && config.auth.token.trim().is_empty() {
        errors.push(ValidationError::EmptyAuthToken);
    }

    if config.mode == ServerMode::Mock && config.spec.path.trim().is_empty() {
        errors.push(ValidationError::EmptySpecPath);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(validate_config(&MockConfig::default()), Ok(()));
    }

    #[test]
    fn test_proxy_mode_needs_upstream() {
        let mut config = MockConfig::default();
        config.mode = ServerMode::Proxy;
        assert_eq!(validate_config(&config), Err(vec![ValidationError::MissingUpstream]));

        config.upstream.base_url = Some("https://crm.example.com".into());
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = MockConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.upstream.base_url = Some("ftp://files.example.com".into());
        config.base_path = Some("CRMApi".into());
        config.timeouts.request_secs = 0;
        config.auth.token = "  ".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::InvalidBindAddress("not-an-address".into())));
        assert!(errors.contains(&ValidationError::InvalidBasePath("CRMApi".into())));
        assert!(errors.contains(&ValidationError::ZeroValue("timeouts.request_secs")));
        assert!(errors.contains(&ValidationError::EmptyAuthToken));
        assert!(matches!(
            errors.iter().find(|e| matches!(e, ValidationError::InvalidUpstreamUrl { .. })),
            Some(ValidationError::InvalidUpstreamUrl { reason, .. }) if reason.contains("ftp")
        ));
    }

    #[test]
    fn test_unparseable_upstream_url() {
        let mut config = MockConfig::default();
        config.upstream.base_url = Some("::not a url::".into());
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidUpstreamUrl { .. }));
    }
}
