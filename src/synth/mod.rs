//! Response synthesis subsystem.
//!
//! # Data Flow
//! ```text
//! SchemaNode (+ path parameter overrides)
//!     → synthesizer.rs (recursive traversal, depth ceiling, cycle guard)
//!     → heuristics.rs (field-name sample values for plain strings)
//!     → serde_json::Value (declared key order preserved)
//! ```
//!
//! # Design Decisions
//! - Never fails: unknown shapes degrade to `null` or empty containers
//! - Random source is injected per synthesizer (seedable for tests)
//! - Heuristic table is data, swappable without touching traversal

pub mod heuristics;
pub mod synthesizer;

pub use heuristics::{HeuristicRule, HeuristicTable};
pub use synthesizer::{Synthesizer, MAX_DEPTH};
