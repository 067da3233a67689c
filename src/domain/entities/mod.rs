//! Core domain entities of the hotel catalog.
//!
//! Entities are plain data structures. Each has a `New*` counterpart used for
//! creation and full replacement (`PUT`) so identifiers are only ever assigned
//! by the persistence layer.
//!
//! # Entity Types
//!
//! - [`Country`] - A country that hotels belong to
//! - [`Hotel`] - A listed hotel

pub mod country;
pub mod hotel;

pub use country::{Country, NewCountry};
pub use hotel::{Hotel, NewHotel};

/// Offset/limit window requested from a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

/// One page of results plus the total number of matching records.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}
