//! API specification subsystem.
//!
//! # Data Flow
//! ```text
//! swagger.json / openapi.yaml
//!     → loader.rs (openapiv3 parse, convert)
//!     → model.rs (Specification: paths → operations → responses → schemas)
//!     → registry.rs (named component schemas, flat, keyed by id)
//!     → shared via Arc with the router and synthesizer
//! ```
//!
//! # Design Decisions
//! - Loaded once at startup, immutable afterwards (no locking on reads)
//! - Schema kinds are a closed enum, not strings
//! - Cyclic schemas stay cyclic only through registry ids, never through pointers
//! - A load failure is the only fatal error of the engine

pub mod loader;
pub mod model;
pub mod registry;

pub use loader::{build_specification, load_document, load_specification, SpecError};
pub use model::{
    HttpMethod, Operation, PathEntry, ResponseDefinition, SchemaKind, SchemaNode, Specification,
};
pub use registry::SchemaRegistry;
