//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (method, path)
//!     → router.rs (template scan in document order)
//!     → matcher.rs (segment comparison, parameter capture)
//!     → Return: RouteMatch { operation, params } or None
//!
//! Route Compilation (at startup):
//!     Specification.paths
//!     → Compile PathTemplates
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same input always matches same route
//! - First match wins (document order)

pub mod matcher;
pub mod router;

pub use matcher::{PathParams, PathTemplate};
pub use router::{RouteMatch, Router};
