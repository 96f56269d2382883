//! Shared plumbing for Vitrine services.
//!
//! Request-id middleware, tracing setup, and serde helpers. Domain logic
//! lives in the individual services.

pub mod middleware;
pub mod serde;
pub mod tracing;
