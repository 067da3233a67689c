//! Cross-cutting request pipeline.
//!
//! # Modules
//!
//! - [`context`] - Correlation id and per-request state machine
//! - [`cors`] - Cross-origin policy
//! - [`identity`] - Client identity for rate limiting
//! - [`rate_limiter`] - Fixed-window limiter with fail-open degradation
//! - [`fingerprint`] - Cache keys
//! - [`response_cache`] - Cache lookup, store and invalidation
//! - [`authentication`] - Bearer credentials and role checks
//! - [`version_router`] - Versioned route registry
//! - [`orchestrator`] - Composition of all stages

pub mod authentication;
pub mod context;
pub mod cors;
pub mod fingerprint;
pub mod identity;
pub mod orchestrator;
pub mod rate_limiter;
pub mod response_cache;
pub mod version_router;

pub use orchestrator::{Pipeline, PipelineComponents, handle};
pub use version_router::{Access, ApiVersion, CacheRule, HandlerGroup, RouteSpec};
