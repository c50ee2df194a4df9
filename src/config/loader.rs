//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::MockConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

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

/// Parse a configuration from TOML text without validating it.
pub fn parse_config(content: &str) -> Result<MockConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load a TOML file (or defaults when `path` is `None`), apply environment
/// overrides, then `overrides` (command-line flags), then validate.
pub fn load_config<F>(path: Option<&Path>, overrides: F) -> Result<MockConfig, ConfigError>
where
    F: FnOnce(&mut MockConfig),
{
    let content = path.map(fs::read_to_string).transpose()?;
    resolve_config(content.as_deref(), |key| std::env::var(key).ok(), overrides)
}

/// Build a configuration from optional TOML text, an environment lookup and
/// final overrides. Override and validation errors are reported together.
pub fn resolve_config<L, F>(
    content: Option<&str>,
    lookup: L,
    overrides: F,
) -> Result<MockConfig, ConfigError>
where
    L: Fn(&str) -> Option<String>,
    F: FnOnce(&mut MockConfig),
{
    let mut config = match content {
        Some(content) => parse_config(content)?,
        None => MockConfig::default(),
    };

    let mut errors = config.apply_overrides(lookup);
    overrides(&mut config);
    if let Err(invalid) = validate_config(&config) {
        errors.extend(invalid);
    }

    if errors.is_empty() {
        Ok(config)
    } else {
        Err(ConfigError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ServerMode;

    #[test]
    fn test_load_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api-double.toml");
        fs::write(
            &path,
            r#"
            [upstream]
            base_url = "http://127.0.0.1:3000"
            "#,
        )
        .unwrap();

        let config = load_config(Some(&path), |_| {}).unwrap();
        assert_eq!(config.upstream.base_url.as_deref(), Some("http://127.0.0.1:3000"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Some(Path::new("/definitely/not/here.toml")), |_| {}).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("mode = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = parse_config(r#"mode = "sideways""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_message_lists_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(
            &path,
            r#"
            base_path = "nope"
            [timeouts]
            request_secs = 0
            "#,
        )
        .unwrap();

        let err = load_config(Some(&path), |_| {}).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Validation failed: "));
        assert!(message.contains("base_path 'nope'"));
        assert!(message.contains("timeouts.request_secs"));
    }

    #[test]
    fn test_bad_mode_override_fails_validation() {
        let env = |key: &str| (key == "API_DOUBLE_MODE").then(|| "proxi".to_string());
        let err = resolve_config(None, env, |_| {}).unwrap_err();

        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors, vec![ValidationError::InvalidModeOverride("proxi".into())]);
            }
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_overrides_apply_after_env_and_before_validation() {
        let env = |key: &str| (key == "API_DOUBLE_MODE").then(|| "proxy".to_string());

        // Proxy mode without an upstream is invalid...
        let err = resolve_config(None, env, |_| {}).unwrap_err();
        assert!(err.to_string().contains("proxy mode requires upstream.base_url"));

        // ...until the final overrides supply one.
        let config = resolve_config(None, env, |config| {
            config.upstream.base_url = Some("http://127.0.0.1:3000".into());
        })
        .unwrap();
        assert_eq!(config.mode, ServerMode::Proxy);

        // Final overrides win over the environment.
        let config = resolve_config(Some("mode = \"proxy\""), env, |config| {
            config.mode = ServerMode::Mock;
        })
        .unwrap();
        assert_eq!(config.mode, ServerMode::Mock);
    }

    #[test]
    fn test_defaults_without_file() {
        let config = resolve_config(None, |_: &str| None, |_| {}).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_parse_mode() {
        let config = parse_config(r#"mode = "mock""#).unwrap();
        assert_eq!(config.mode, ServerMode::Mock);
    }
}
