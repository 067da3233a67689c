//! Domain layer: catalog entities and the persistence contracts.
//!
//! The domain layer has no dependencies on infrastructure or HTTP concerns.
//! Repository traits are implemented in [`crate::infrastructure::persistence`].
//!
//! - [`entities`] - Country and hotel data structures
//! - [`repositories`] - Data access trait definitions

pub mod entities;
pub mod repositories;
