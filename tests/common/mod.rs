#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use hotel_listing::api::routes::version_groups;
use hotel_listing::application::services::{CatalogService, TokenValidator};
use hotel_listing::config::Config;
use hotel_listing::domain::entities::{Country, Hotel, NewCountry, NewHotel, Page, PageRequest};
use hotel_listing::domain::repositories::{CountryRepository, HotelRepository, RepositoryError};
use hotel_listing::infrastructure::cache::MemoryCacheStore;
use hotel_listing::infrastructure::counters::{CounterStore, MemoryCounterStore, WindowCount};
use hotel_listing::infrastructure::persistence::InMemoryCatalog;
use hotel_listing::infrastructure::{StoreError, StoreResult};
use hotel_listing::pipeline::{Pipeline, PipelineComponents};
use hotel_listing::routes::api_router;
use hotel_listing::state::AppState;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const SECRET: &str = "integration-signing-secret";

/// Seeded catalog that counts hotel reads, so tests can tell a cache hit
/// from a handler call.
#[derive(Default)]
pub struct CountingCatalog {
    inner: InMemoryCatalog,
    hotel_reads: AtomicUsize,
}

impl CountingCatalog {
    pub fn seeded() -> Self {
        Self {
            inner: InMemoryCatalog::seeded(),
            hotel_reads: AtomicUsize::new(0),
        }
    }

    pub fn hotel_reads(&self) -> usize {
        self.hotel_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CountryRepository for CountingCatalog {
    async fn save(&self, new_country: NewCountry) -> Result<Country, RepositoryError> {
        CountryRepository::save(&self.inner, new_country).await
    }

    async fn find(&self, id: i64) -> Result<Option<Country>, RepositoryError> {
        CountryRepository::find(&self.inner, id).await
    }

    async fn find_all(&self, page: PageRequest) -> Result<Page<Country>, RepositoryError> {
        CountryRepository::find_all(&self.inner, page).await
    }

    async fn update(
        &self,
        id: i64,
        changes: NewCountry,
    ) -> Result<Option<Country>, RepositoryError> {
        CountryRepository::update(&self.inner, id, changes).await
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        CountryRepository::delete(&self.inner, id).await
    }
}

#[async_trait]
impl HotelRepository for CountingCatalog {
    async fn save(&self, new_hotel: NewHotel) -> Result<Hotel, RepositoryError> {
        HotelRepository::save(&self.inner, new_hotel).await
    }

    async fn find(&self, id: i64) -> Result<Option<Hotel>, RepositoryError> {
        self.hotel_reads.fetch_add(1, Ordering::SeqCst);
        HotelRepository::find(&self.inner, id).await
    }

    async fn find_all(&self, page: PageRequest) -> Result<Page<Hotel>, RepositoryError> {
        self.hotel_reads.fetch_add(1, Ordering::SeqCst);
        HotelRepository::find_all(&self.inner, page).await
    }

    async fn find_by_country(&self, country_id: i64) -> Result<Vec<Hotel>, RepositoryError> {
        HotelRepository::find_by_country(&self.inner, country_id).await
    }

    async fn update(&self, id: i64, changes: NewHotel) -> Result<Option<Hotel>, RepositoryError> {
        HotelRepository::update(&self.inner, id, changes).await
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        HotelRepository::delete(&self.inner, id).await
    }
}

/// Counter store whose every call fails.
pub struct UnreachableCounterStore;

#[async_trait]
impl CounterStore for UnreachableCounterStore {
    async fn hit(&self, _key: &str, _window: Duration) -> StoreResult<WindowCount> {
        Err(StoreError::Connection("connection refused".to_string()))
    }

    async fn health_check(&self) -> bool {
        false
    }
}

pub fn test_config() -> Config {
    Config {
        jwt_secret: SECRET.to_string(),
        behind_proxy: true,
        cors_allowed_origins: vec!["https://app.example.com".to_string()],
        ..Config::default()
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub catalog: Arc<CountingCatalog>,
    pub tokens: TokenValidator,
}

impl TestApp {
    pub fn admin_token(&self) -> String {
        self.token("admin", &["Administrator"])
    }

    pub fn token(&self, subject: &str, roles: &[&str]) -> String {
        let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
        self.tokens
            .issue(subject, &roles, Duration::from_secs(600))
            .unwrap()
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(test_config(), Arc::new(MemoryCounterStore::new()))
}

pub fn spawn_app_with(config: Config, counter_store: Arc<dyn CounterStore>) -> TestApp {
    let catalog = Arc::new(CountingCatalog::seeded());
    let service = CatalogService::new(catalog.clone(), catalog.clone(), Duration::from_secs(1));

    let pipeline = Pipeline::new(
        &config,
        PipelineComponents {
            counter_store,
            cache_store: Arc::new(MemoryCacheStore::new(config.cache_max_bytes)),
            tokens: Arc::new(TokenValidator::new(&config.jwt_secret, None, 0)),
            groups: version_groups(AppState::new(Arc::new(service))),
        },
    )
    .unwrap();

    TestApp {
        server: TestServer::new(api_router(Arc::new(pipeline))).unwrap(),
        catalog,
        tokens: TokenValidator::new(&config.jwt_secret, None, 0),
    }
}
