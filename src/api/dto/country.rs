//! DTOs for country endpoints.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::hotel::HotelDto;
use crate::application::services::{CountryDetails, CountryOverview};
use crate::domain::entities::{Country, NewCountry};

/// Two uppercase letters, e.g. `JM`.
static SHORT_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").unwrap());

/// Body of `POST /countries` and `PUT /countries/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCountryDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(regex(path = *SHORT_NAME_REGEX, message = "Short name must be two uppercase letters"))]
    pub short_name: String,
}

impl From<CreateCountryDto> for NewCountry {
    fn from(dto: CreateCountryDto) -> Self {
        NewCountry {
            name: dto.name.trim().to_string(),
            short_name: dto.short_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CountryDto {
    pub id: i64,
    pub name: String,
    pub short_name: String,
}

impl From<Country> for CountryDto {
    fn from(c: Country) -> Self {
        CountryDto {
            id: c.id,
            name: c.name,
            short_name: c.short_name,
        }
    }
}

/// A country with its hotels.
#[derive(Debug, Serialize)]
pub struct CountryDetailsDto {
    pub id: i64,
    pub name: String,
    pub short_name: String,
    pub hotels: Vec<HotelDto>,
}

impl From<CountryDetails> for CountryDetailsDto {
    fn from(details: CountryDetails) -> Self {
        CountryDetailsDto {
            id: details.country.id,
            name: details.country.name,
            short_name: details.country.short_name,
            hotels: details.hotels.into_iter().map(HotelDto::from).collect(),
        }
    }
}

/// v2 list item.
#[derive(Debug, Serialize)]
pub struct CountryOverviewDto {
    pub id: i64,
    pub name: String,
    pub short_name: String,
    pub hotel_count: usize,
}

impl From<CountryOverview> for CountryOverviewDto {
    fn from(o: CountryOverview) -> Self {
        CountryOverviewDto {
            id: o.country.id,
            name: o.country.name,
            short_name: o.country.short_name,
            hotel_count: o.hotel_count,
        }
    }
}
