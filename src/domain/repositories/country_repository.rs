//! Repository trait for country data access.

use crate::domain::entities::{Country, NewCountry, Page, PageRequest};
use crate::domain::repositories::RepositoryError;
use async_trait::async_trait;

/// Persistence contract for countries.
///
/// "Not found" is signalled through `Option`/`bool` results; errors are
/// reserved for store failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CountryRepository: Send + Sync {
    /// Persists a new country and returns it with its assigned id.
    async fn save(&self, new_country: NewCountry) -> Result<Country, RepositoryError>;

    /// Finds a country by id.
    async fn find(&self, id: i64) -> Result<Option<Country>, RepositoryError>;

    /// Lists countries ordered by id.
    async fn find_all(&self, page: PageRequest) -> Result<Page<Country>, RepositoryError>;

    /// Replaces a country. Returns `Ok(None)` if it does not exist.
    async fn update(
        &self,
        id: i64,
        changes: NewCountry,
    ) -> Result<Option<Country>, RepositoryError>;

    /// Deletes a country together with its hotels.
    ///
    /// Returns `Ok(false)` if the country does not exist.
    async fn delete(&self, id: i64) -> Result<bool, RepositoryError>;
}
