//! # Hotel Listing API
//!
//! A hotel and country catalog served over REST, with every request passing
//! through an explicit, ordered pipeline.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Entities and repository traits
//! - **Application Layer** ([`application`]) - Catalog service and bearer token validation
//! - **Infrastructure Layer** ([`infrastructure`]) - Counter stores, response cache stores, repositories
//! - **Pipeline** ([`pipeline`]) - CORS, rate limiting, caching, authentication, versioned routing
//! - **API Layer** ([`api`]) - Handlers, DTOs and the versioned route table
//!
//! ## Request Flow
//!
//! ```text
//! request → CORS → rate limiter → response cache → token validator → version router → handler → cache store → response
//! ```
//!
//! Protected routes authenticate before the cache is consulted.
//!
//! ## Quick Start
//!
//! ```bash
//! export JWT_SECRET="change-me"
//! export REDIS_URL="redis://localhost:6379"  # Optional
//!
//! cargo run
//! cargo run --bin admin -- token issue --subject alice --role Administrator
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod pipeline;
pub mod state;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{CatalogService, Principal, TokenValidator};
    pub use crate::config::Config;
    pub use crate::domain::entities::{Country, Hotel, NewCountry, NewHotel};
    pub use crate::error::AppError;
    pub use crate::pipeline::{ApiVersion, Pipeline, PipelineComponents};
    pub use crate::state::AppState;
}
