//! Trip planner response DTOs.
//!
//! These map the OpenTripPlanner `/plan` JSON. Fields differ by leg mode
//! (a walk has no route, a tram may have no geometry length) so nearly
//! everything is optional or defaulted; conversion decides what is required.

use serde::Deserialize;

/// Top-level `/plan` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    /// Present when a plan could be computed.
    pub plan: Option<Plan>,

    /// Present when the planner could not answer (no path, bad place...).
    pub error: Option<PlannerErrorBody>,
}

/// Error object embedded in a 200 response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerErrorBody {
    /// Numeric error id (404 for no path found).
    pub id: Option<i32>,

    /// Human-readable message.
    pub msg: Option<String>,

    /// Machine-readable code, e.g. "PATH_NOT_FOUND".
    pub message: Option<String>,

    /// Whether the error means no route exists.
    #[serde(default)]
    pub no_path: bool,
}

/// The computed plan.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// Request date, epoch milliseconds.
    pub date: Option<i64>,

    /// Resolved origin.
    pub from: Option<PlaceDto>,

    /// Resolved destination.
    pub to: Option<PlaceDto>,

    /// Candidate itineraries, best first.
    #[serde(default)]
    pub itineraries: Vec<ItineraryDto>,
}

/// One itinerary of the plan.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryDto {
    /// Total duration in seconds.
    pub duration: Option<f64>,

    /// Departure, epoch milliseconds.
    pub start_time: Option<i64>,

    /// Arrival, epoch milliseconds.
    pub end_time: Option<i64>,

    /// Seconds spent walking.
    pub walk_time: Option<f64>,

    /// Seconds spent on vehicles.
    pub transit_time: Option<f64>,

    /// Seconds spent waiting.
    pub waiting_time: Option<f64>,

    /// Metres walked.
    pub walk_distance: Option<f64>,

    /// Number of vehicle changes.
    pub transfers: Option<u32>,

    /// Legs in travel order.
    #[serde(default)]
    pub legs: Vec<LegDto>,
}

/// One leg of an itinerary.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegDto {
    /// Mode name, e.g. "WALK", "TRAM", "BUS".
    pub mode: Option<String>,

    /// Duration in seconds.
    pub duration: Option<f64>,

    /// Distance in metres.
    pub distance: Option<f64>,

    /// Departure, epoch milliseconds.
    pub start_time: Option<i64>,

    /// Arrival, epoch milliseconds.
    pub end_time: Option<i64>,

    /// Line short name ("A", "C1").
    pub route_short_name: Option<String>,

    /// Line long name.
    pub route_long_name: Option<String>,

    /// Operating agency.
    pub agency_name: Option<String>,

    /// Whether the leg rides a scheduled vehicle.
    pub transit_leg: Option<bool>,

    /// Where the leg starts.
    pub from: Option<PlaceDto>,

    /// Where the leg ends.
    pub to: Option<PlaceDto>,

    /// Encoded path.
    pub leg_geometry: Option<LegGeometry>,

    /// Stops passed without alighting (only when requested).
    pub intermediate_stops: Option<Vec<PlaceDto>>,
}

/// Encoded leg path.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegGeometry {
    /// Google polyline string.
    pub points: Option<String>,

    /// Number of points encoded.
    pub length: Option<u32>,
}

/// A named place: an itinerary endpoint or a stop.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDto {
    /// Stop or place name.
    pub name: Option<String>,

    /// Latitude.
    pub lat: Option<f64>,

    /// Longitude.
    pub lon: Option<f64>,

    /// Stop id, e.g. "SEM:3207".
    pub stop_id: Option<String>,

    /// Arrival here, epoch milliseconds.
    pub arrival: Option<i64>,

    /// Departure from here, epoch milliseconds.
    pub departure: Option<i64>,
}
