//! Request handler core: match, select, synthesize.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;

use crate::mock::selection::{ResponseSelector, SuccessSelector};
use crate::routing::Router;
use crate::spec::model::Specification;
use crate::synth::{HeuristicTable, Synthesizer};

/// What the engine made of a request.
///
/// Only `Synthesized` produces a response; the other two tell the caller
/// to hand the request to its fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum MockOutcome {
    Synthesized {
        template: String,
        content_type: String,
        body: Value,
    },
    NoRouteMatch,
    NoRepresentableResponse {
        template: String,
    },
}

impl MockOutcome {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            MockOutcome::Synthesized { .. } => "mock",
            MockOutcome::NoRouteMatch => "no_route",
            MockOutcome::NoRepresentableResponse { .. } => "no_response",
        }
    }
}

/// Immutable engine shared by all requests.
#[derive(Debug)]
pub struct MockEngine {
    router: Router,
    heuristics: HeuristicTable,
    selector: Box<dyn ResponseSelector>,
}

impl MockEngine {
    /// Engine with the default heuristics and `200` selection.
    pub fn new(spec: Arc<Specification>) -> Self {
        Self {
            router: Router::new(spec),
            heuristics: HeuristicTable::default(),
            selector: Box::new(SuccessSelector),
        }
    }

    /// Replace the field-name heuristic table.
    pub fn with_heuristics(mut self, heuristics: HeuristicTable) -> Self {
        self.heuristics = heuristics;
        self
    }

    /// Replace the response selection strategy.
    pub fn with_selector(mut self, selector: impl ResponseSelector + 'static) -> Self {
        self.selector = Box::new(selector);
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn specification(&self) -> &Arc<Specification> {
        self.router.specification()
    }

    /// Handle a request with a freshly seeded random source.
    pub fn respond(&self, method: &str, path: &str) -> MockOutcome {
        self.respond_with_rng(method, path, StdRng::from_entropy())
    }

    /// Handle a request with the given random source.
    pub fn respond_with_rng<R: Rng>(&self, method: &str, path: &str, rng: R) -> MockOutcome {
        let Some(route) = self.router.match_route(method, path) else {
            return MockOutcome::NoRouteMatch;
        };

        let Some(selected) = self.selector.select(route.operation) else {
            tracing::debug!(
                method = %route.method,
                template = %route.template,
                "Route has no representable success response"
            );
            return MockOutcome::NoRepresentableResponse {
                template: route.template.to_string(),
            };
        };

        let spec = self.router.specification();
        let mut synthesizer = Synthesizer::new(&spec.registry, &self.heuristics, rng);
        let body = synthesizer.generate(selected.schema, Some(&route.params));

        tracing::debug!(
            method = %route.method,
            template = %route.template,
            content_type = %selected.content_type,
            params = route.params.len(),
            "Synthesized mock response"
        );

        MockOutcome::Synthesized {
            template: route.template.to_string(),
            content_type: selected.content_type.to_string(),
            body,
        }
    }
}
