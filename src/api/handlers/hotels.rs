//! Handlers for hotel endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::api::dto::hotel::{CreateHotelDto, HotelDto};
use crate::api::dto::pagination::{PagedResult, PaginationParams};
use crate::error::AppError;
use crate::state::AppState;

/// Lists hotels, paged.
///
/// # Endpoint
///
/// `GET /api/v1/hotels?page=1&page_size=10`
pub async fn list_hotels_handler(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PagedResult<HotelDto>>, AppError> {
    let page = state.catalog.list_hotels(params.to_page_request()?).await?;
    Ok(Json(PagedResult::from_page(page, &params)))
}

pub async fn get_hotel_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<HotelDto>, AppError> {
    let hotel = state.catalog.get_hotel(id).await?;
    Ok(Json(hotel.into()))
}

/// Creates a hotel under an existing country.
///
/// # Endpoint
///
/// `POST /api/v1/hotels` (Administrator)
///
/// # Errors
///
/// Returns 404 if `country_id` does not exist.
pub async fn create_hotel_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateHotelDto>,
) -> Result<(StatusCode, Json<HotelDto>), AppError> {
    let hotel = state.catalog.create_hotel(payload.into()).await?;
    tracing::info!(hotel_id = hotel.id, "Hotel created");
    Ok((StatusCode::CREATED, Json(hotel.into())))
}

/// Replaces a hotel.
///
/// # Endpoint
///
/// `PUT /api/v1/hotels/{id}` (Administrator)
pub async fn update_hotel_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CreateHotelDto>,
) -> Result<Json<HotelDto>, AppError> {
    let hotel = state.catalog.update_hotel(id, payload.into()).await?;
    Ok(Json(hotel.into()))
}

pub async fn delete_hotel_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.catalog.delete_hotel(id).await?;
    tracing::info!(hotel_id = id, "Hotel deleted");
    Ok(StatusCode::NO_CONTENT)
}
