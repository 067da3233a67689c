//! Repository trait for hotel data access.

use crate::domain::entities::{Hotel, NewHotel, Page, PageRequest};
use crate::domain::repositories::RepositoryError;
use async_trait::async_trait;

/// Persistence contract for hotels.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HotelRepository: Send + Sync {
    async fn save(&self, new_hotel: NewHotel) -> Result<Hotel, RepositoryError>;

    async fn find(&self, id: i64) -> Result<Option<Hotel>, RepositoryError>;

    async fn find_all(&self, page: PageRequest) -> Result<Page<Hotel>, RepositoryError>;

    /// All hotels of one country, ordered by id.
    async fn find_by_country(&self, country_id: i64) -> Result<Vec<Hotel>, RepositoryError>;

    async fn update(&self, id: i64, changes: NewHotel) -> Result<Option<Hotel>, RepositoryError>;

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError>;
}
