//! Travel modes.
//!
//! `TravelMode` is what a single leg uses, as reported by the planner.
//! `ModeSet` is what a user asks the planner for.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Mode of a single itinerary leg.
///
/// Unknown planner modes are kept verbatim in `Other` rather than rejected,
/// so new modes on the network degrade to a generic label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TravelMode {
    Walk,
    Bicycle,
    Car,
    Bus,
    Tram,
    Subway,
    Rail,
    /// Generic transit, or anything the planner sends that we do not know.
    Other(String),
}

impl TravelMode {
    /// Parse a planner mode name. Never fails.
    pub fn from_planner(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "WALK" => TravelMode::Walk,
            "BICYCLE" => TravelMode::Bicycle,
            "CAR" => TravelMode::Car,
            "BUS" => TravelMode::Bus,
            "TRAM" => TravelMode::Tram,
            "SUBWAY" => TravelMode::Subway,
            "RAIL" => TravelMode::Rail,
            _ => TravelMode::Other(s.trim().to_string()),
        }
    }

    /// The planner's name for this mode.
    pub fn as_str(&self) -> &str {
        match self {
            TravelMode::Walk => "WALK",
            TravelMode::Bicycle => "BICYCLE",
            TravelMode::Car => "CAR",
            TravelMode::Bus => "BUS",
            TravelMode::Tram => "TRAM",
            TravelMode::Subway => "SUBWAY",
            TravelMode::Rail => "RAIL",
            TravelMode::Other(s) => s,
        }
    }

    /// Whether the leg is self-propelled (walking or cycling).
    pub fn is_active(&self) -> bool {
        matches!(self, TravelMode::Walk | TravelMode::Bicycle)
    }
}

impl From<String> for TravelMode {
    fn from(s: String) -> Self {
        TravelMode::from_planner(&s)
    }
}

impl From<TravelMode> for String {
    fn from(mode: TravelMode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a requested mode set is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transport mode: {0}")]
pub struct UnknownModeSet(pub String);

/// The set of modes a trip is planned with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeSet {
    /// Public transport with walking connections.
    #[default]
    Transit,
    Walk,
    Bicycle,
    /// Public transport with cycling connections.
    TransitBicycle,
    Car,
}

impl ModeSet {
    /// Value of the planner's `mode` parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            ModeSet::Transit => "TRANSIT,WALK",
            ModeSet::Walk => "WALK",
            ModeSet::Bicycle => "BICYCLE",
            ModeSet::TransitBicycle => "TRANSIT,BICYCLE",
            ModeSet::Car => "CAR",
        }
    }

    /// French label shown next to a participant's travel choice.
    pub fn label(&self) -> &'static str {
        match self {
            ModeSet::Transit => "Transports en commun",
            ModeSet::Walk => "Marche",
            ModeSet::Bicycle => "Vélo",
            ModeSet::TransitBicycle => "Transports en commun + vélo",
            ModeSet::Car => "Voiture",
        }
    }

    /// Whether the set includes public transport.
    pub fn includes_transit(&self) -> bool {
        matches!(self, ModeSet::Transit | ModeSet::TransitBicycle)
    }

    /// Longest walk the planner may propose, in metres.
    pub fn max_walk_distance_m(&self) -> u32 {
        if self.includes_transit() { 1_000 } else { 100_000 }
    }

    /// How strongly the planner should avoid walking.
    pub fn walk_reluctance(&self) -> u32 {
        if self.includes_transit() { 10 } else { 2 }
    }
}

impl FromStr for ModeSet {
    type Err = UnknownModeSet;

    /// Accepts the planner values plus the aliases the web client sends.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(' ', "");
        match normalized.as_str() {
            "" | "TRANSIT" | "TRANSIT,WALK" | "WALK,TRANSIT" => Ok(ModeSet::Transit),
            "WALK" | "WALKING" => Ok(ModeSet::Walk),
            "BICYCLE" | "BICYCLING" | "BYCICLE" => Ok(ModeSet::Bicycle),
            "TRANSIT,BICYCLE" | "BICYCLE,TRANSIT" => Ok(ModeSet::TransitBicycle),
            "CAR" | "DRIVING" => Ok(ModeSet::Car),
            _ => Err(UnknownModeSet(s.to_string())),
        }
    }
}

impl fmt::Display for ModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}
