//! Hotel entity.

/// A hotel listed under a country.
#[derive(Debug, Clone, PartialEq)]
pub struct Hotel {
    pub id: i64,
    pub name: String,
    pub address: String,
    /// Star rating between 1.0 and 5.0.
    pub rating: f64,
    pub country_id: i64,
}

/// Input data for creating or replacing a hotel.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHotel {
    pub name: String,
    pub address: String,
    pub rating: f64,
    pub country_id: i64,
}

impl NewHotel {
    pub fn into_hotel(self, id: i64) -> Hotel {
        Hotel {
            id,
            name: self.name,
            address: self.address,
            rating: self.rating,
            country_id: self.country_id,
        }
    }
}
