//! Route lookup.
//!
//! # Responsibilities
//! - Compile every path template of a specification at startup
//! - Resolve (method, path) to the declared operation plus path parameters
//! - Return an explicit no-match instead of a default
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) template scan in document order; first match wins
//! - Method lookup happens on the first matching template only

use std::sync::Arc;

use crate::routing::matcher::{PathParams, PathTemplate};
use crate::spec::model::{HttpMethod, Operation, Specification};

/// A successful lookup.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    /// The template that matched, as declared in the document.
    pub template: &'a str,
    pub method: HttpMethod,
    pub operation: &'a Operation,
    pub params: PathParams,
}

/// Compiled route table over a shared specification.
#[derive(Debug, Clone)]
pub struct Router {
    spec: Arc<Specification>,
    templates: Vec<PathTemplate>,
}

impl Router {
    /// Compile all path templates of `spec`.
    pub fn new(spec: Arc<Specification>) -> Self {
        let templates = spec
            .paths
            .iter()
            .map(|entry| PathTemplate::new(entry.template.as_str()))
            .collect();
        Self { spec, templates }
    }

    pub fn specification(&self) -> &Arc<Specification> {
        &self.spec
    }

    /// Resolve a request to an operation.
    ///
    /// Unknown methods and methods the matching template does not declare
    /// are a plain `None`.
    pub fn match_route(&self, method: &str, path: &str) -> Option<RouteMatch<'_>> {
        let (index, params) = self
            .templates
            .iter()
            .enumerate()
            .find_map(|(i, template)| template.capture(path).map(|params| (i, params)))?;

        let entry = &self.spec.paths[index];
        let method: HttpMethod = match method.parse() {
            Ok(m) => m,
            Err(_) => {
                tracing::debug!(method = %method, path = %path, "Unsupported method");
                return None;
            }
        };
        let operation = entry.operations.get(&method)?;

        Some(RouteMatch {
            template: entry.template.as_str(),
            method,
            operation,
            params,
        })
    }

    /// Every declared (method, template) pair, in document order.
    pub fn routes(&self) -> impl Iterator<Item = (HttpMethod, &str)> {
        self.spec.paths.iter().flat_map(|entry| {
            entry
                .operations
                .keys()
                .map(move |method| (*method, entry.template.as_str()))
        })
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
