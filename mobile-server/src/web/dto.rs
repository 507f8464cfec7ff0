//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{BoundingBox, ModeSet};
use crate::geocode::PlaceCandidate;
use crate::render::{ItinerarySummary, RenderedItinerary};
use crate::schedules::{Direction, Line, PassageView};

/// Place search request.
#[derive(Debug, Deserialize)]
pub struct PlacesQuery {
    /// Free text typed by the user
    pub q: String,
}

/// Place search results, best first.
#[derive(Debug, Serialize)]
pub struct PlacesResponse {
    pub places: Vec<PlaceCandidate>,
}

/// Reverse geocoding request.
#[derive(Debug, Deserialize)]
pub struct ReverseQuery {
    pub lat: f64,
    pub lon: f64,
}

/// Address at a position.
#[derive(Debug, Serialize)]
pub struct ReverseResponse {
    /// `None` when nothing is known there
    pub address: Option<String>,
    /// The address, or "Adresse inconnue"
    pub label: String,
}

/// Trip planning request.
///
/// `from` and `to` are place names or `lat,lon` literals.
#[derive(Debug, Deserialize)]
pub struct ItineraryQuery {
    pub from: String,
    pub to: String,

    /// Mode set name (defaults to public transport)
    pub mode: Option<String>,

    /// Treat date/time as the latest arrival
    #[serde(default)]
    pub arrive_by: bool,

    /// `YYYY-MM-DD` (defaults to today)
    pub date: Option<String>,

    /// `HH:MM` (defaults to now)
    pub time: Option<String>,
}

/// A planned and rendered itinerary.
#[derive(Debug, Serialize)]
pub struct ItineraryResponse {
    pub from: PlaceCandidate,
    pub to: PlaceCandidate,
    pub mode: ModeSet,
    pub mode_label: &'static str,
    /// GeoJSON `FeatureCollection`
    pub features: Value,
    pub bounds: Option<BoundingBox>,
    pub summary: ItinerarySummary,
    /// Other itineraries the planner proposed
    pub alternatives: Vec<ItinerarySummary>,
}

impl ItineraryResponse {
    pub fn new(
        from: PlaceCandidate,
        to: PlaceCandidate,
        mode: ModeSet,
        rendered: RenderedItinerary,
        alternatives: Vec<ItinerarySummary>,
    ) -> Self {
        Self {
            from,
            to,
            mode,
            mode_label: mode.label(),
            features: rendered.features.to_geojson(),
            bounds: rendered.bounds,
            summary: rendered.summary,
            alternatives,
        }
    }
}

/// Travel time estimate response.
#[derive(Debug, Serialize)]
pub struct TravelTimeResponse {
    pub mode: ModeSet,
    pub mode_label: &'static str,
    pub duration_secs: f64,
    /// Rounded half up
    pub minutes: i64,
}

/// Line listing request.
#[derive(Debug, Deserialize)]
pub struct LinesQuery {
    /// Keep urban lines whose names contain this
    pub q: Option<String>,
}

/// Lines by kind, sorted by short name.
#[derive(Debug, Serialize)]
pub struct LinesResponse {
    pub trams: Vec<Line>,
    pub buses: Vec<Line>,
}

/// Directions of one line.
#[derive(Debug, Serialize)]
pub struct DirectionsResponse {
    pub route_id: String,
    pub directions: Vec<Direction>,
}

/// Passages request.
#[derive(Debug, Deserialize)]
pub struct PassagesQuery {
    /// Only passages of this route, e.g. "SEM:A"
    pub route: Option<String>,
}

/// Next passages at a stop.
#[derive(Debug, Serialize)]
pub struct PassagesResponse {
    pub stop_id: String,
    pub passages: Vec<PassageView>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
