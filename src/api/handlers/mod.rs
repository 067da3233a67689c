//! HTTP request handlers.
//!
//! Business handlers are grouped into per-version routers by
//! [`crate::api::routes`] and reached only through the pipeline.
//! `health` and `docs` are served directly.

pub mod account;
pub mod countries;
pub mod docs;
pub mod health;
pub mod hotels;

pub use account::profile_handler;
pub use countries::{
    country_overview_handler, create_country_handler, delete_country_handler, get_country_handler,
    list_countries_handler, update_country_handler,
};
pub use docs::swagger_handler;
pub use health::health_handler;
pub use hotels::{
    create_hotel_handler, delete_hotel_handler, get_hotel_handler, list_hotels_handler,
    update_hotel_handler,
};
