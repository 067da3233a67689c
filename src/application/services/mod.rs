//! Business logic services for the application layer.

pub mod catalog_service;
pub mod token_validator;

pub use catalog_service::{CatalogService, CountryDetails, CountryOverview};
pub use token_validator::{AuthError, Claims, Principal, TokenValidator};
