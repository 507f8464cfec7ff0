//! Human-readable itinerary summary (French labels, as the client shows them).

use std::fmt::Display;

use chrono::TimeZone;
use serde::Serialize;

use crate::domain::{Itinerary, Leg, TravelMode, clock_time, kilometres, whole_minutes};

/// One line of the step-by-step breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepSummary {
    pub mode: TravelMode,
    /// e.g. "Marche", "Tram A", "Vélo"
    pub label: String,
    /// Distance for active legs, route long name for transit legs
    pub detail: String,
    pub duration_minutes: i64,
    /// "from → to", when both ends are named
    pub stops: Option<String>,
}

impl StepSummary {
    /// Describe one leg.
    pub fn from_leg(leg: &Leg) -> Self {
        let short = leg.route_short_name();
        let long = leg.route_long_name().to_string();
        let distance = format!("{} km", kilometres(leg.distance_m));

        let (label, detail) = match &leg.mode {
            TravelMode::Walk => ("Marche".to_string(), distance),
            TravelMode::Bicycle => ("Vélo".to_string(), distance),
            TravelMode::Tram => (prefixed("Tram", short), long),
            TravelMode::Bus => (prefixed("Bus", short), long),
            TravelMode::Subway => (prefixed("Métro", short), long),
            _ if leg.transit_leg => (prefixed("Transport", short), long),
            other => (other.as_str().to_string(), distance),
        };

        let stops = (!leg.from.is_empty() && !leg.to.is_empty())
            .then(|| format!("{} → {}", leg.from, leg.to));

        Self {
            mode: leg.mode.clone(),
            label,
            detail,
            duration_minutes: whole_minutes(leg.duration_secs),
            stops,
        }
    }
}

fn prefixed(prefix: &str, short_name: &str) -> String {
    if short_name.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix} {short_name}")
    }
}

/// Headline figures and steps of an itinerary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItinerarySummary {
    pub duration_minutes: i64,
    /// Total walking distance, one decimal
    pub walk_distance_km: String,
    /// Departure clock time, `HH:MM`
    pub start_time: String,
    /// Arrival clock time, `HH:MM`
    pub end_time: String,
    pub has_transit: bool,
    pub transfers: usize,
    pub steps: Vec<StepSummary>,
}

impl ItinerarySummary {
    /// Summarise an itinerary with clock times in `zone`.
    ///
    /// An itinerary without legs summarises to zero minutes and no steps.
    pub fn new<Tz: TimeZone>(itinerary: &Itinerary, zone: &Tz) -> Self
    where
        Tz::Offset: Display,
    {
        let duration_minutes = if itinerary.legs.is_empty() {
            0
        } else {
            whole_minutes(itinerary.duration_secs)
        };

        Self {
            duration_minutes,
            walk_distance_km: kilometres(itinerary.walk_distance_m),
            start_time: clock_time(itinerary.start_time, zone),
            end_time: clock_time(itinerary.end_time, zone),
            has_transit: itinerary.has_transit(),
            transfers: itinerary.transfers(),
            steps: itinerary.legs.iter().map(StepSummary::from_leg).collect(),
        }
    }
}
