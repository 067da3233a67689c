//! Repository trait definitions for the domain layer.
//!
//! The persistence layer is an external collaborator: the rest of the service
//! only knows these contracts and that every call may fail or time out.
//!
//! # Available Repositories
//!
//! - [`CountryRepository`] - Country CRUD
//! - [`HotelRepository`] - Hotel CRUD and per-country lookup
//!
//! Mock implementations are generated via `mockall` for unit tests.

pub mod country_repository;
pub mod hotel_repository;

pub use country_repository::CountryRepository;
pub use hotel_repository::HotelRepository;

#[cfg(test)]
pub use country_repository::MockCountryRepository;
#[cfg(test)]
pub use hotel_repository::MockHotelRepository;

/// Failure reported by a repository implementation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RepositoryError {
    #[error("persistence store unavailable: {0}")]
    Unavailable(String),

    #[error("persistence call timed out after {0}ms")]
    Timeout(u64),

    #[error("persistence store rejected the operation: {0}")]
    Rejected(String),
}
