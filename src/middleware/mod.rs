//! HTTP middleware stack.
//!
//! Re-exports the CORS layer builder and the per-request trace middleware.

pub mod cors;
pub mod trace;

pub use cors::cors_layer;
