//! Mock response subsystem.
//!
//! # Data Flow
//! ```text
//! (method, path)
//!     → routing::Router (operation + path params)
//!     → selection.rs (200 + content type priority)
//!     → synth::Synthesizer (schema, overrides = path params)
//!     → MockOutcome::Synthesized | NoRouteMatch | NoRepresentableResponse
//! ```
//!
//! # Design Decisions
//! - Negative outcomes are values, not errors; the HTTP layer routes them
//!   to its fallback
//! - Engine is immutable and shared via Arc; each call owns its RNG

pub mod engine;
pub mod selection;

pub use engine::{MockEngine, MockOutcome};
pub use selection::{ResponseSelector, SelectedResponse, SuccessSelector};
