//! Repository implementations.
//!
//! The relational store is an external collaborator; the service ships with an
//! in-process implementation of the repository contracts, seeded with sample
//! data, so the pipeline can run end to end.
//!
//! # Repositories
//!
//! - [`InMemoryCatalog`] - Implements both [`crate::domain::repositories::CountryRepository`]
//!   and [`crate::domain::repositories::HotelRepository`]

mod in_memory;

pub use in_memory::InMemoryCatalog;
