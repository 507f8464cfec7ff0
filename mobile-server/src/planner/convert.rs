//! Conversion from planner DTOs to domain types.
//!
//! Absent optional fields become empty defaults. Only timestamps that cannot
//! be recovered at all make an itinerary invalid; invalid itineraries are
//! skipped so one bad candidate does not hide the others.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::domain::{
    Coordinate, EncodedPolyline, IntermediateStop, Itinerary, Leg, RouteInfo, TravelMode,
    from_epoch_millis,
};

use super::types::{ItineraryDto, LegDto, Plan, PlaceDto};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Timestamp outside the representable range
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(i64),
}

/// Convert every usable itinerary of a plan.
pub fn convert_plan(plan: &Plan) -> Vec<Itinerary> {
    plan.itineraries
        .iter()
        .enumerate()
        .filter_map(|(i, dto)| match convert_itinerary(dto) {
            Ok(itinerary) => Some(itinerary),
            Err(e) => {
                warn!(index = i, error = %e, "skipping itinerary");
                None
            }
        })
        .collect()
}

/// Convert a single itinerary.
///
/// Start and end fall back to the first leg's start and last leg's end when
/// the itinerary itself omits them; duration falls back to their difference.
pub fn convert_itinerary(dto: &ItineraryDto) -> Result<Itinerary, ConversionError> {
    let legs: Vec<Leg> = dto.legs.iter().map(convert_leg).collect();

    let start_ms = dto
        .start_time
        .or_else(|| dto.legs.first().and_then(|l| l.start_time))
        .ok_or(ConversionError::MissingField("startTime"))?;
    let end_ms = dto
        .end_time
        .or_else(|| dto.legs.last().and_then(|l| l.end_time))
        .ok_or(ConversionError::MissingField("endTime"))?;

    let start_time = timestamp(start_ms)?;
    let end_time = timestamp(end_ms)?;

    let duration_secs = dto
        .duration
        .unwrap_or_else(|| (end_ms - start_ms).max(0) as f64 / 1000.0);

    let walk_distance_m = dto.walk_distance.unwrap_or_else(|| {
        legs.iter()
            .filter(|l| l.mode == TravelMode::Walk)
            .map(|l| l.distance_m)
            .sum()
    });

    Ok(Itinerary {
        legs,
        duration_secs,
        walk_distance_m,
        start_time,
        end_time,
    })
}

/// Convert a leg, defaulting whatever the planner left out.
pub fn convert_leg(dto: &LegDto) -> Leg {
    let mode = dto
        .mode
        .as_deref()
        .map_or(TravelMode::Other(String::new()), TravelMode::from_planner);

    let route = match (&dto.route_short_name, &dto.route_long_name) {
        (None, None) => None,
        (short, long) => Some(RouteInfo {
            short_name: short.clone().unwrap_or_default(),
            long_name: long.clone().unwrap_or_default(),
        }),
    };

    let transit_leg = dto
        .transit_leg
        .unwrap_or_else(|| !mode.is_active() && mode != TravelMode::Car);

    let geometry = dto
        .leg_geometry
        .as_ref()
        .and_then(|g| g.points.clone())
        .map(EncodedPolyline::new)
        .unwrap_or_default();

    let intermediate_stops = dto
        .intermediate_stops
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .map(convert_stop)
        .collect();

    let start_time = dto.start_time.and_then(from_epoch_millis);
    let end_time = dto.end_time.and_then(from_epoch_millis);

    let duration_secs = dto.duration.unwrap_or_else(|| match (start_time, end_time) {
        (Some(s), Some(e)) => (e - s).num_milliseconds().max(0) as f64 / 1000.0,
        _ => 0.0,
    });

    Leg {
        mode,
        duration_secs,
        distance_m: dto.distance.unwrap_or(0.0),
        route,
        from: place_name(dto.from.as_ref()),
        to: place_name(dto.to.as_ref()),
        intermediate_stops,
        transit_leg,
        geometry,
        start_time,
        end_time,
    }
}

fn convert_stop(dto: &PlaceDto) -> IntermediateStop {
    IntermediateStop {
        name: dto.name.clone().unwrap_or_default(),
        coordinate: place_coordinate(dto),
        arrival: dto.arrival.and_then(from_epoch_millis),
        departure: dto.departure.and_then(from_epoch_millis),
    }
}

/// Position of a place, if both halves are present.
pub fn place_coordinate(dto: &PlaceDto) -> Option<Coordinate> {
    Some(Coordinate::new(dto.lon?, dto.lat?))
}

fn place_name(dto: Option<&PlaceDto>) -> String {
    dto.and_then(|p| p.name.clone()).unwrap_or_default()
}

fn timestamp(ms: i64) -> Result<DateTime<Utc>, ConversionError> {
    from_epoch_millis(ms).ok_or(ConversionError::InvalidTimestamp(ms))
}
