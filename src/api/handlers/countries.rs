//! Handlers for country endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::api::dto::country::{CountryDetailsDto, CountryDto, CountryOverviewDto, CreateCountryDto};
use crate::api::dto::pagination::{PagedResult, PaginationParams};
use crate::error::AppError;
use crate::state::AppState;

/// Lists countries, paged.
///
/// # Endpoint
///
/// `GET /api/v1/countries?page=1&page_size=10`
pub async fn list_countries_handler(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PagedResult<CountryDto>>, AppError> {
    let page = state.catalog.list_countries(params.to_page_request()?).await?;
    Ok(Json(PagedResult::from_page(page, &params)))
}

/// Lists every country with its number of hotels.
///
/// # Endpoint
///
/// `GET /api/v2/countries`
pub async fn country_overview_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<CountryOverviewDto>>, AppError> {
    let overview = state.catalog.country_overview().await?;
    Ok(Json(overview.into_iter().map(CountryOverviewDto::from).collect()))
}

/// Returns a country with its hotels.
///
/// # Endpoint
///
/// `GET /api/v1/countries/{id}`
///
/// # Errors
///
/// Returns 404 if the country does not exist.
pub async fn get_country_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CountryDetailsDto>, AppError> {
    let details = state.catalog.get_country(id).await?;
    Ok(Json(details.into()))
}

/// Creates a country.
///
/// # Endpoint
///
/// `POST /api/v1/countries` (Administrator)
pub async fn create_country_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateCountryDto>,
) -> Result<(StatusCode, Json<CountryDto>), AppError> {
    let country = state.catalog.create_country(payload.into()).await?;
    tracing::info!(country_id = country.id, "Country created");
    Ok((StatusCode::CREATED, Json(country.into())))
}

/// Replaces a country.
///
/// # Endpoint
///
/// `PUT /api/v1/countries/{id}` (Administrator)
pub async fn update_country_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CreateCountryDto>,
) -> Result<Json<CountryDto>, AppError> {
    let country = state.catalog.update_country(id, payload.into()).await?;
    Ok(Json(country.into()))
}

/// Deletes a country and its hotels.
///
/// # Endpoint
///
/// `DELETE /api/v1/countries/{id}` (Administrator)
pub async fn delete_country_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.catalog.delete_country(id).await?;
    tracing::info!(country_id = id, "Country deleted");
    Ok(StatusCode::NO_CONTENT)
}
