//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the specification named by the configuration
//! - Decide whether a load failure is fatal
//!
//! # Design Decisions
//! - Fail fast when the specification is required in mock mode
//! - Otherwise degrade to fallback-only with a warning

use std::path::Path;

use openapiv3::OpenAPI;

use crate::config::{MockConfig, ServerMode};
use crate::spec::{load_specification, SpecError, Specification};

/// A parsed document and the model built from it.
#[derive(Debug)]
pub struct LoadedSpec {
    pub document: OpenAPI,
    pub specification: Specification,
}

/// Load the configured specification.
///
/// Returns `Ok(None)` when loading failed but the server may run without it.
pub fn load_spec(config: &MockConfig) -> Result<Option<LoadedSpec>, SpecError> {
    let path = Path::new(&config.spec.path);
    match load_specification(path) {
        Ok((document, specification)) => {
            tracing::info!(
                path = %path.display(),
                title = %specification.title,
                version = %specification.version,
                paths = specification.paths.len(),
                operations = specification.operation_count(),
                schemas = specification.registry.len(),
                "Specification loaded"
            );
            Ok(Some(LoadedSpec {
                document,
                specification,
            }))
        }
        Err(e) if config.spec.required && config.mode == ServerMode::Mock => {
            tracing::error!(path = %path.display(), error = %e, "Specification unavailable");
            Err(e)
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Specification unavailable; every request goes to the fallback"
            );
            Ok(None)
        }
    }
}
