//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the API
//! double. All types derive Serde traits for deserialization from config
//! files, and every section has defaults so an empty file is valid.

use serde::{Deserialize, Serialize};

use crate::config::validation::ValidationError;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MockConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Serve synthesized responses, or forward everything upstream.
    pub mode: ServerMode,

    /// Prefix stripped from request paths before routing (e.g. "/CRMApi").
    pub base_path: Option<String>,

    /// Specification document settings.
    pub spec: SpecConfig,

    /// Mock-mode behavior.
    pub mock: MockModeConfig,

    /// Bearer token gate in mock mode.
    pub auth: AuthConfig,

    /// Live upstream used by proxy mode and the mock fallback.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Service identity for the system endpoints.
    pub service: ServiceConfig,
}

/// Operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServerMode {
    #[default]
    Mock,
    Proxy,
}

impl ServerMode {
    /// Display name used in system endpoint payloads.
    pub fn label(self) -> &'static str {
        match self {
            ServerMode::Mock => "Mock",
            ServerMode::Proxy => "Proxy",
        }
    }
}

impl std::str::FromStr for ServerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(ServerMode::Mock),
            "proxy" => Ok(ServerMode::Proxy),
            other => Err(format!("unknown mode '{other}' (expected 'mock' or 'proxy')")),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Specification document settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SpecConfig {
    /// Path to the OpenAPI document (.json, .yaml, .yml).
    pub path: String,

    /// Abort startup when the document cannot be loaded. When false the
    /// server runs with every request going to the fallback.
    pub required: bool,
}

impl Default for SpecConfig {
    fn default() -> Self {
        Self {
            path: "swagger.json".to_string(),
            required: true,
        }
    }
}

/// Mock-mode behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MockModeConfig {
    /// Forward requests the engine cannot answer to the upstream (if one is
    /// configured) instead of returning 404.
    pub fallback_to_upstream: bool,
}

impl Default for MockModeConfig {
    fn default() -> Self {
        Self {
            fallback_to_upstream: true,
        }
    }
}

/// Bearer token gate applied in mock mode.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub enabled: bool,

    /// Token clients must send as `Authorization: Bearer <token>` or bare.
    pub token: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            token: "123".to_string(),
        }
    }
}

/// Live upstream service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL requests are forwarded to (e.g. "https://api.example.com").
    pub base_url: Option<String>,

    /// Bearer token sent upstream. `UPSTREAM_BEARER_TOKEN` takes precedence.
    pub bearer_token: Option<String>,

    /// Upstream request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            bearer_token: None,
            timeout_secs: 30,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Identity reported by the system endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Display name. The specification title is used when empty.
    pub name: String,

    /// Environment name reported by `/api/version`.
    pub environment: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            environment: "Development".to_string(),
        }
    }
}

impl MockConfig {
    /// Apply overrides from the process environment.
    ///
    /// - `API_DOUBLE_MODE`: `mock` or `proxy`
    /// - `API_DOUBLE_SPEC`: specification path
    /// - `UPSTREAM_BEARER_TOKEN`: upstream token
    /// - `API_DOUBLE_ENVIRONMENT`: environment name
    ///
    /// Values that cannot be applied are returned, not dropped.
    pub fn apply_env_overrides(&mut self) -> Vec<ValidationError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Vec<ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut errors = Vec::new();
        if let Some(mode) = lookup("API_DOUBLE_MODE") {
            match mode.parse() {
                Ok(mode) => self.mode = mode,
                Err(_) => errors.push(ValidationError::InvalidModeOverride(mode)),
            }
        }
        if let Some(path) = lookup("API_DOUBLE_SPEC").filter(|p| !p.is_empty()) {
            self.spec.path = path;
        }
        if let Some(token) = lookup("UPSTREAM_BEARER_TOKEN").filter(|t| !t.is_empty()) {
            self.upstream.bearer_token = Some(token);
        }
        if let Some(env) = lookup("API_DOUBLE_ENVIRONMENT").filter(|e| !e.is_empty()) {
            self.service.environment = env;
        }
        errors
    }
}
