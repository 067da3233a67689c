//! Country entity.

/// A country that groups hotels.
#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    pub id: i64,
    pub name: String,
    /// Two-letter code, e.g. `JM`.
    pub short_name: String,
}

/// Input data for creating or replacing a country.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCountry {
    pub name: String,
    pub short_name: String,
}

impl NewCountry {
    pub fn into_country(self, id: i64) -> Country {
        Country {
            id,
            name: self.name,
            short_name: self.short_name,
        }
    }
}
