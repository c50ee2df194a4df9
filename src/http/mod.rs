//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout, body limit)
//!     → middleware/auth.rs (bearer gate, mock mode only)
//!     → request.rs (base path strip)
//!     → mock::MockEngine (match, select, synthesize; mock mode only)
//!     → system.rs (/, /health, /api/version, /swagger/v1/swagger.json)
//!     → proxy::Fallback (upstream or 404)
//!     → response.rs (pretty JSON, error envelope)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;
pub mod system;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
