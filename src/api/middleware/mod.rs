//! Tower layers applied around the whole application.
//!
//! Pipeline stages (CORS, rate limiting, caching, authentication) are not
//! middleware; they run in fixed order inside [`crate::pipeline`].

pub mod tracing;
