//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → schema.rs (env overrides: mode, spec path, upstream token)
//!     → command-line flags (closure passed to load_config)
//!     → validation.rs (semantic checks, plus any rejected override)
//!     → MockConfig (validated, immutable)
//!     → shared with the HTTP server at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, resolve_config, ConfigError};
pub use schema::{
    AuthConfig, ListenerConfig, LogFormat, MockConfig, MockModeConfig, ObservabilityConfig,
    SecurityConfig, ServerMode, ServiceConfig, SpecConfig, TimeoutConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
