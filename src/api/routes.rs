//! Versioned route table.
//!
//! Each version is an axum [`Router`] paired with the [`RouteSpec`]
//! metadata the pipeline uses for access control, caching and request
//! validation. Paths here are version-less; the pipeline strips `/api` and
//! the version segment before dispatch.

use axum::{Router, routing::get};

use crate::api::dto::country::CreateCountryDto;
use crate::api::dto::hotel::CreateHotelDto;
use crate::api::dto::validate_json;
use crate::api::handlers::{
    country_overview_handler, create_country_handler, create_hotel_handler,
    delete_country_handler, delete_hotel_handler, get_country_handler, get_hotel_handler,
    list_countries_handler, list_hotels_handler, profile_handler, update_country_handler,
    update_hotel_handler,
};
use crate::pipeline::{ApiVersion, HandlerGroup, RouteSpec};
use crate::state::AppState;

pub const ADMINISTRATOR: &str = "Administrator";

/// Version 1.
///
/// # Endpoints
///
/// - `GET    /countries`        - List countries (paged, cached)
/// - `POST   /countries`        - Create a country (Administrator)
/// - `GET    /countries/{id}`   - Country with hotels (cached)
/// - `PUT    /countries/{id}`   - Replace a country (Administrator)
/// - `DELETE /countries/{id}`   - Delete a country and its hotels (Administrator)
/// - `GET    /hotels`           - List hotels (paged, cached)
/// - `POST   /hotels`           - Create a hotel (Administrator)
/// - `GET    /hotels/{id}`      - Get a hotel (cached)
/// - `PUT    /hotels/{id}`      - Replace a hotel (Administrator)
/// - `DELETE /hotels/{id}`      - Delete a hotel (Administrator)
/// - `GET    /account/profile`  - Caller's profile (authenticated, cached per caller)
pub fn v1(state: AppState) -> HandlerGroup {
    let router = Router::new()
        .route(
            "/countries",
            get(list_countries_handler).post(create_country_handler),
        )
        .route(
            "/countries/{id}",
            get(get_country_handler)
                .put(update_country_handler)
                .delete(delete_country_handler),
        )
        .route("/hotels", get(list_hotels_handler).post(create_hotel_handler))
        .route(
            "/hotels/{id}",
            get(get_hotel_handler)
                .put(update_hotel_handler)
                .delete(delete_hotel_handler),
        )
        .route("/account/profile", get(profile_handler))
        .with_state(state);

    let routes = vec![
        RouteSpec::get("/countries", "List countries").public_cache(),
        RouteSpec::post("/countries", "Create a country")
            .protected(&[ADMINISTRATOR])
            .validate_with(validate_json::<CreateCountryDto>),
        RouteSpec::get("/countries/{id}", "Get a country with its hotels").public_cache(),
        RouteSpec::put("/countries/{id}", "Replace a country")
            .protected(&[ADMINISTRATOR])
            .validate_with(validate_json::<CreateCountryDto>),
        RouteSpec::delete("/countries/{id}", "Delete a country and its hotels")
            .protected(&[ADMINISTRATOR])
            .invalidates("/hotels"),
        RouteSpec::get("/hotels", "List hotels").public_cache(),
        RouteSpec::post("/hotels", "Create a hotel")
            .protected(&[ADMINISTRATOR])
            .validate_with(validate_json::<CreateHotelDto>)
            .invalidates("/countries"),
        RouteSpec::get("/hotels/{id}", "Get a hotel").public_cache(),
        RouteSpec::put("/hotels/{id}", "Replace a hotel")
            .protected(&[ADMINISTRATOR])
            .validate_with(validate_json::<CreateHotelDto>)
            .invalidates("/countries"),
        RouteSpec::delete("/hotels/{id}", "Delete a hotel")
            .protected(&[ADMINISTRATOR])
            .invalidates("/countries"),
        RouteSpec::get("/account/profile", "Caller profile")
            .protected(&[])
            .private_cache(),
    ];

    HandlerGroup::new(ApiVersion::new(1, 0), router, routes)
}

/// Version 2: read-only, with hotel counts on the country list.
///
/// # Endpoints
///
/// - `GET /countries`       - All countries with hotel counts (cached)
/// - `GET /countries/{id}`  - Country with hotels (cached)
/// - `GET /hotels`          - List hotels (paged, cached)
pub fn v2(state: AppState) -> HandlerGroup {
    let router = Router::new()
        .route("/countries", get(country_overview_handler))
        .route("/countries/{id}", get(get_country_handler))
        .route("/hotels", get(list_hotels_handler))
        .with_state(state);

    let routes = vec![
        RouteSpec::get("/countries", "List countries with hotel counts").public_cache(),
        RouteSpec::get("/countries/{id}", "Get a country with its hotels").public_cache(),
        RouteSpec::get("/hotels", "List hotels").public_cache(),
    ];

    HandlerGroup::new(ApiVersion::new(2, 0), router, routes)
}

/// Every handler group the service can expose.
pub fn version_groups(state: AppState) -> Vec<HandlerGroup> {
    vec![v1(state.clone()), v2(state)]
}
