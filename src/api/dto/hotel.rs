//! DTOs for hotel endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::{Hotel, NewHotel};

/// Body of `POST /hotels` and `PUT /hotels/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateHotelDto {
    #[validate(length(min = 1, max = 150, message = "Name must be 1-150 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 250, message = "Address must be 1-250 characters"))]
    pub address: String,

    #[validate(range(min = 1.0, max = 5.0, message = "Rating must be between 1 and 5"))]
    pub rating: f64,

    #[validate(range(min = 1, message = "Country id must be positive"))]
    pub country_id: i64,
}

impl From<CreateHotelDto> for NewHotel {
    fn from(dto: CreateHotelDto) -> Self {
        NewHotel {
            name: dto.name.trim().to_string(),
            address: dto.address.trim().to_string(),
            rating: dto.rating,
            country_id: dto.country_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HotelDto {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub rating: f64,
    pub country_id: i64,
}

impl From<Hotel> for HotelDto {
    fn from(h: Hotel) -> Self {
        HotelDto {
            id: h.id,
            name: h.name,
            address: h.address,
            rating: h.rating,
            country_id: h.country_id,
        }
    }
}
