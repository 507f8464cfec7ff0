//! Itinerary rendering.
//!
//! Turns a planner itinerary into what the map front-end draws: one line per
//! leg, markers for the endpoints and for every intermediate stop, the box to
//! fit the viewport to, and a textual summary.
//!
//! Rendering is a pure single pass over the legs and never fails; a leg whose
//! geometry cannot be decoded is drawn as an empty line so that leg order and
//! feature count are preserved.

mod feature;
mod summary;

use std::fmt::Display;

use chrono::TimeZone;
use tracing::warn;

use crate::domain::{BoundingBox, Coordinate, Itinerary};

pub use feature::{FeatureCollection, LineFeature, MapFeature, PointFeature, PointKind};
pub use summary::{ItinerarySummary, StepSummary};

/// Everything the map needs to show one itinerary.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedItinerary {
    /// `start`, `end`, then per leg its line followed by its stops
    pub features: FeatureCollection,
    /// Box around all leg coordinates; `None` if no leg has any
    pub bounds: Option<BoundingBox>,
    pub summary: ItinerarySummary,
}

/// Render an itinerary between `origin` and `destination`.
///
/// Produces exactly `2 + legs + intermediate stops` features. Clock times in
/// the summary are expressed in `zone`.
pub fn render_itinerary<Tz: TimeZone>(
    itinerary: &Itinerary,
    origin: Coordinate,
    destination: Coordinate,
    zone: &Tz,
) -> RenderedItinerary
where
    Tz::Offset: Display,
{
    let mut features = Vec::with_capacity(2 + itinerary.legs.len() + itinerary.intermediate_stop_count());

    features.push(MapFeature::Point(PointFeature::endpoint(PointKind::Start, origin)));
    features.push(MapFeature::Point(PointFeature::endpoint(PointKind::End, destination)));

    for (leg_index, leg) in itinerary.legs.iter().enumerate() {
        let coordinates = leg.geometry.decode().unwrap_or_else(|e| {
            warn!(leg_index, mode = %leg.mode, error = %e, "dropping undecodable leg geometry");
            Vec::new()
        });

        features.push(MapFeature::Line(LineFeature {
            coordinates,
            mode: leg.mode.clone(),
            duration_secs: leg.duration_secs,
            distance_m: leg.distance_m,
            route_short_name: leg.route_short_name().to_string(),
            route_long_name: leg.route_long_name().to_string(),
            leg_index,
        }));

        for stop in &leg.intermediate_stops {
            features.push(MapFeature::Point(PointFeature {
                coordinate: stop.coordinate,
                kind: PointKind::IntermediateStop,
                name: Some(stop.name.clone()),
                arrival: stop.arrival,
                departure: stop.departure,
                leg_index: Some(leg_index),
            }));
        }
    }

    let features = FeatureCollection { features };
    let bounds = features.line_bounds();

    RenderedItinerary {
        features,
        bounds,
        summary: ItinerarySummary::new(itinerary, zone),
    }
}
