//! In-process catalog store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::entities::{Country, Hotel, NewCountry, NewHotel, Page, PageRequest};
use crate::domain::repositories::{CountryRepository, HotelRepository, RepositoryError};

#[derive(Debug, Default)]
struct CatalogData {
    countries: BTreeMap<i64, Country>,
    hotels: BTreeMap<i64, Hotel>,
    next_country_id: i64,
    next_hotel_id: i64,
}

impl CatalogData {
    fn allocate_country_id(&mut self) -> i64 {
        self.next_country_id += 1;
        self.next_country_id
    }

    fn allocate_hotel_id(&mut self) -> i64 {
        self.next_hotel_id += 1;
        self.next_hotel_id
    }
}

/// Countries and hotels held behind a single async read/write lock.
///
/// Deleting a country cascades to its hotels, mirroring a foreign key with
/// `ON DELETE CASCADE`.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    data: RwLock<CatalogData>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog pre-populated with three Caribbean countries and their hotels.
    pub fn seeded() -> Self {
        let mut data = CatalogData::default();

        for (name, short_name) in [
            ("Jamaica", "JM"),
            ("Bahamas", "BS"),
            ("Cayman Island", "CI"),
        ] {
            let id = data.allocate_country_id();
            data.countries.insert(
                id,
                NewCountry {
                    name: name.to_string(),
                    short_name: short_name.to_string(),
                }
                .into_country(id),
            );
        }

        for (name, address, rating, country_id) in [
            ("Sandals Resort and Spa", "Negril", 4.5, 1),
            ("Comfort Suites", "George Town", 4.3, 3),
            ("Grand Palldium", "Nassua", 4.0, 2),
        ] {
            let id = data.allocate_hotel_id();
            data.hotels.insert(
                id,
                NewHotel {
                    name: name.to_string(),
                    address: address.to_string(),
                    rating,
                    country_id,
                }
                .into_hotel(id),
            );
        }

        Self {
            data: RwLock::new(data),
        }
    }
}

fn paginate<T: Clone>(items: &BTreeMap<i64, T>, page: PageRequest) -> Page<T> {
    Page {
        items: items
            .values()
            .skip(page.offset)
            .take(page.limit)
            .cloned()
            .collect(),
        total: items.len(),
    }
}

#[async_trait]
impl CountryRepository for InMemoryCatalog {
    async fn save(&self, new_country: NewCountry) -> Result<Country, RepositoryError> {
        let mut data = self.data.write().await;
        let id = data.allocate_country_id();
        let country = new_country.into_country(id);
        data.countries.insert(id, country.clone());
        Ok(country)
    }

    async fn find(&self, id: i64) -> Result<Option<Country>, RepositoryError> {
        Ok(self.data.read().await.countries.get(&id).cloned())
    }

    async fn find_all(&self, page: PageRequest) -> Result<Page<Country>, RepositoryError> {
        Ok(paginate(&self.data.read().await.countries, page))
    }

    async fn update(
        &self,
        id: i64,
        changes: NewCountry,
    ) -> Result<Option<Country>, RepositoryError> {
        let mut data = self.data.write().await;
        match data.countries.get_mut(&id) {
            Some(existing) => {
                *existing = changes.into_country(id);
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        let mut data = self.data.write().await;
        if data.countries.remove(&id).is_none() {
            return Ok(false);
        }
        data.hotels.retain(|_, hotel| hotel.country_id != id);
        Ok(true)
    }
}

#[async_trait]
impl HotelRepository for InMemoryCatalog {
    async fn save(&self, new_hotel: NewHotel) -> Result<Hotel, RepositoryError> {
        let mut data = self.data.write().await;
        if !data.countries.contains_key(&new_hotel.country_id) {
            return Err(RepositoryError::Rejected(format!(
                "country {} does not exist",
                new_hotel.country_id
            )));
        }
        let id = data.allocate_hotel_id();
        let hotel = new_hotel.into_hotel(id);
        data.hotels.insert(id, hotel.clone());
        Ok(hotel)
    }

    async fn find(&self, id: i64) -> Result<Option<Hotel>, RepositoryError> {
        Ok(self.data.read().await.hotels.get(&id).cloned())
    }

    async fn find_all(&self, page: PageRequest) -> Result<Page<Hotel>, RepositoryError> {
        Ok(paginate(&self.data.read().await.hotels, page))
    }

    async fn find_by_country(&self, country_id: i64) -> Result<Vec<Hotel>, RepositoryError> {
        Ok(self
            .data
            .read()
            .await
            .hotels
            .values()
            .filter(|hotel| hotel.country_id == country_id)
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, changes: NewHotel) -> Result<Option<Hotel>, RepositoryError> {
        let mut data = self.data.write().await;
        match data.hotels.get_mut(&id) {
            Some(existing) => {
                *existing = changes.into_hotel(id);
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        Ok(self.data.write().await.hotels.remove(&id).is_some())
    }
}
