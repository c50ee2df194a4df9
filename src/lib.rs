//! Schema-driven API double.
//!
//! Serves plausible JSON for the operations of an OpenAPI document and
//! forwards everything else to a live upstream.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod mock;
pub mod observability;
pub mod proxy;
pub mod routing;
pub mod spec;
pub mod synth;

pub use config::schema::MockConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use mock::{MockEngine, MockOutcome};
