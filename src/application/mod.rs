//! Application layer services.
//!
//! Services consume repository traits and provide a clean API for HTTP
//! handlers and the request pipeline.
//!
//! # Available Services
//!
//! - [`services::catalog_service::CatalogService`] - Countries and hotels
//! - [`services::token_validator::TokenValidator`] - Bearer token validation

pub mod services;
