//! Itinerary and leg types.
//!
//! An `Itinerary` is one trip plan returned by the planner for a route
//! search. It is built per request and discarded with the response.

use chrono::{DateTime, Utc};

use super::{Coordinate, EncodedPolyline, TravelMode};

/// A stop a transit leg passes through without the rider getting off.
#[derive(Debug, Clone, PartialEq)]
pub struct IntermediateStop {
    pub name: String,
    /// Stop position, when the planner reports one.
    pub coordinate: Option<Coordinate>,
    pub arrival: Option<DateTime<Utc>>,
    pub departure: Option<DateTime<Utc>>,
}

/// Route a transit leg rides on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteInfo {
    /// Public line name, e.g. "A" or "C1"
    pub short_name: String,
    /// Full line name, usually "Origin / Terminus"
    pub long_name: String,
}

/// One mode-homogeneous segment of an itinerary.
///
/// Fields the planner omits for a mode (route names on a walk, stops on a
/// bicycle ride) are filled with empty defaults during conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub mode: TravelMode,
    pub duration_secs: f64,
    pub distance_m: f64,
    /// Route details; `None` for non-transit legs.
    pub route: Option<RouteInfo>,
    /// Name of the place the leg starts from
    pub from: String,
    /// Name of the place the leg ends at
    pub to: String,
    pub intermediate_stops: Vec<IntermediateStop>,
    /// Set by the planner for any leg on a scheduled vehicle
    pub transit_leg: bool,
    pub geometry: EncodedPolyline,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl Leg {
    /// Create a leg with only mode, duration and distance set.
    pub fn new(mode: TravelMode, duration_secs: f64, distance_m: f64) -> Self {
        Self {
            transit_leg: !mode.is_active() && mode != TravelMode::Car,
            mode,
            duration_secs,
            distance_m,
            route: None,
            from: String::new(),
            to: String::new(),
            intermediate_stops: Vec::new(),
            geometry: EncodedPolyline::default(),
            start_time: None,
            end_time: None,
        }
    }

    /// Set the route names.
    pub fn with_route(mut self, short_name: impl Into<String>, long_name: impl Into<String>) -> Self {
        self.route = Some(RouteInfo {
            short_name: short_name.into(),
            long_name: long_name.into(),
        });
        self
    }

    /// Set the from / to place names.
    pub fn with_places(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.from = from.into();
        self.to = to.into();
        self
    }

    /// Set the encoded geometry.
    pub fn with_geometry(mut self, geometry: EncodedPolyline) -> Self {
        self.geometry = geometry;
        self
    }

    /// Set the intermediate stops.
    pub fn with_stops(mut self, stops: Vec<IntermediateStop>) -> Self {
        self.intermediate_stops = stops;
        self
    }

    /// Route short name, or `""` when the leg has no route.
    pub fn route_short_name(&self) -> &str {
        self.route.as_ref().map_or("", |r| r.short_name.as_str())
    }

    /// Route long name, or `""` when the leg has no route.
    pub fn route_long_name(&self) -> &str {
        self.route.as_ref().map_or("", |r| r.long_name.as_str())
    }
}

/// A complete trip plan from origin to destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    pub legs: Vec<Leg>,
    pub duration_secs: f64,
    pub walk_distance_m: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl Itinerary {
    /// Number of intermediate stops across all legs.
    pub fn intermediate_stop_count(&self) -> usize {
        self.legs.iter().map(|l| l.intermediate_stops.len()).sum()
    }

    /// Whether any leg rides a vehicle other than the traveller's own feet or bike.
    pub fn has_transit(&self) -> bool {
        self.legs.iter().any(|l| !l.mode.is_active())
    }

    /// Number of vehicle changes.
    pub fn transfers(&self) -> usize {
        self.legs
            .iter()
            .filter(|l| l.transit_leg)
            .count()
            .saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn itinerary(legs: Vec<Leg>) -> Itinerary {
        Itinerary {
            legs,
            duration_secs: 600.0,
            walk_distance_m: 300.0,
            start_time: at(1_700_000_000),
            end_time: at(1_700_000_600),
        }
    }

    #[test]
    fn new_leg_infers_transit_flag() {
        assert!(!Leg::new(TravelMode::Walk, 60.0, 80.0).transit_leg);
        assert!(!Leg::new(TravelMode::Car, 60.0, 80.0).transit_leg);
        assert!(Leg::new(TravelMode::Tram, 60.0, 80.0).transit_leg);
    }

    #[test]
    fn route_names_default_to_empty() {
        let walk = Leg::new(TravelMode::Walk, 60.0, 80.0);
        assert_eq!(walk.route_short_name(), "");
        assert_eq!(walk.route_long_name(), "");

        let tram = Leg::new(TravelMode::Tram, 600.0, 4000.0).with_route("A", "Fontaine / Échirolles");
        assert_eq!(tram.route_short_name(), "A");
        assert_eq!(tram.route_long_name(), "Fontaine / Échirolles");
    }

    #[test]
    fn has_transit_only_for_vehicle_legs() {
        let active = itinerary(vec![
            Leg::new(TravelMode::Walk, 60.0, 80.0),
            Leg::new(TravelMode::Bicycle, 300.0, 1500.0),
        ]);
        assert!(!active.has_transit());

        let mut with_bus = active.clone();
        with_bus.legs.push(Leg::new(TravelMode::Bus, 300.0, 2000.0));
        assert!(with_bus.has_transit());
    }

    #[test]
    fn transfers_count_vehicle_changes() {
        let it = itinerary(vec![
            Leg::new(TravelMode::Walk, 60.0, 80.0),
            Leg::new(TravelMode::Tram, 300.0, 1500.0),
            Leg::new(TravelMode::Walk, 60.0, 80.0),
            Leg::new(TravelMode::Bus, 300.0, 2000.0),
        ]);
        assert_eq!(it.transfers(), 1);
        assert_eq!(itinerary(vec![]).transfers(), 0);
    }

    #[test]
    fn counts_intermediate_stops() {
        let stop = IntermediateStop {
            name: "Chavant".into(),
            coordinate: None,
            arrival: None,
            departure: None,
        };
        let it = itinerary(vec![
            Leg::new(TravelMode::Tram, 300.0, 1500.0).with_stops(vec![stop.clone(), stop.clone()]),
            Leg::new(TravelMode::Bus, 300.0, 1500.0).with_stops(vec![stop]),
        ]);
        assert_eq!(it.intermediate_stop_count(), 3);
    }
}
