//! Country and hotel catalog service.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::domain::entities::{Country, Hotel, NewCountry, NewHotel, Page, PageRequest};
use crate::domain::repositories::{CountryRepository, HotelRepository, RepositoryError};
use crate::error::AppError;

/// A country together with its hotels.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryDetails {
    pub country: Country,
    pub hotels: Vec<Hotel>,
}

/// A country with the number of hotels listed under it.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryOverview {
    pub country: Country,
    pub hotel_count: usize,
}

/// Business operations over the catalog.
///
/// Every repository call is bounded by `timeout`; a timeout takes the same
/// failure path as a store error and surfaces as [`AppError::Dependency`].
pub struct CatalogService {
    countries: Arc<dyn CountryRepository>,
    hotels: Arc<dyn HotelRepository>,
    timeout: Duration,
}

impl CatalogService {
    pub fn new(
        countries: Arc<dyn CountryRepository>,
        hotels: Arc<dyn HotelRepository>,
        timeout: Duration,
    ) -> Self {
        Self {
            countries,
            hotels,
            timeout,
        }
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, RepositoryError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(AppError::from),
            Err(_) => Err(RepositoryError::Timeout(self.timeout.as_millis() as u64).into()),
        }
    }

    pub async fn list_countries(&self, page: PageRequest) -> Result<Page<Country>, AppError> {
        self.bounded(self.countries.find_all(page)).await
    }

    /// Returns every country with its hotel count.
    pub async fn country_overview(&self) -> Result<Vec<CountryOverview>, AppError> {
        let all = PageRequest {
            offset: 0,
            limit: usize::MAX,
        };
        let countries = self.bounded(self.countries.find_all(all)).await?.items;

        let mut overview = Vec::with_capacity(countries.len());
        for country in countries {
            let hotel_count = self
                .bounded(self.hotels.find_by_country(country.id))
                .await?
                .len();
            overview.push(CountryOverview {
                country,
                hotel_count,
            });
        }

        Ok(overview)
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the country does not exist.
    pub async fn get_country(&self, id: i64) -> Result<CountryDetails, AppError> {
        let country = self
            .bounded(self.countries.find(id))
            .await?
            .ok_or_else(|| country_not_found(id))?;
        let hotels = self.bounded(self.hotels.find_by_country(id)).await?;

        Ok(CountryDetails { country, hotels })
    }

    pub async fn create_country(&self, new_country: NewCountry) -> Result<Country, AppError> {
        self.bounded(self.countries.save(new_country)).await
    }

    pub async fn update_country(&self, id: i64, changes: NewCountry) -> Result<Country, AppError> {
        self.bounded(self.countries.update(id, changes))
            .await?
            .ok_or_else(|| country_not_found(id))
    }

    pub async fn delete_country(&self, id: i64) -> Result<(), AppError> {
        if self.bounded(self.countries.delete(id)).await? {
            Ok(())
        } else {
            Err(country_not_found(id))
        }
    }

    pub async fn list_hotels(&self, page: PageRequest) -> Result<Page<Hotel>, AppError> {
        self.bounded(self.hotels.find_all(page)).await
    }

    pub async fn get_hotel(&self, id: i64) -> Result<Hotel, AppError> {
        self.bounded(self.hotels.find(id))
            .await?
            .ok_or_else(|| hotel_not_found(id))
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the referenced country does not exist.
    pub async fn create_hotel(&self, new_hotel: NewHotel) -> Result<Hotel, AppError> {
        self.ensure_country_exists(new_hotel.country_id).await?;
        self.bounded(self.hotels.save(new_hotel)).await
    }

    pub async fn update_hotel(&self, id: i64, changes: NewHotel) -> Result<Hotel, AppError> {
        self.ensure_country_exists(changes.country_id).await?;
        self.bounded(self.hotels.update(id, changes))
            .await?
            .ok_or_else(|| hotel_not_found(id))
    }

    pub async fn delete_hotel(&self, id: i64) -> Result<(), AppError> {
        if self.bounded(self.hotels.delete(id)).await? {
            Ok(())
        } else {
            Err(hotel_not_found(id))
        }
    }

    async fn ensure_country_exists(&self, country_id: i64) -> Result<(), AppError> {
        match self.bounded(self.countries.find(country_id)).await? {
            Some(_) => Ok(()),
            None => Err(country_not_found(country_id)),
        }
    }
}

fn country_not_found(id: i64) -> AppError {
    AppError::not_found("Country not found", json!({ "country_id": id }))
}

fn hotel_not_found(id: i64) -> AppError {
    AppError::not_found("Hotel not found", json!({ "hotel_id": id }))
}
