//! Place search.
//!
//! Free-text place names and `lat,lon` literals are resolved to coordinates
//! before anything can be planned.

mod client;
mod error;
mod types;

pub use client::{
    DEFAULT_BASE_URL, GRENOBLE_CENTER, Geocoder, MIN_QUERY_CHARS, MapboxConfig, MapboxGeocoder,
    resolve_place,
};
pub use error::GeocodeError;
pub use types::{PlaceCandidate, PlaceFeature, PlacesResponse};
