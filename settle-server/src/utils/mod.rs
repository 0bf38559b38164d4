//! Utility modules

pub mod geo;
pub mod logger;

pub use geo::{haversine_km, GeoPoint};
