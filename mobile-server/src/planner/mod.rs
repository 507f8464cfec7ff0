//! Trip planner client.
//!
//! Talks to the Grenoble network's OpenTripPlanner instance, which answers
//! "how do I get from here to there at this time with these modes?".
//!
//! Key characteristics of the planner:
//! - Places are sent as `lat,lon` literals, times as local date and clock time
//! - Timestamps come back as epoch milliseconds
//! - A failed plan is a 200 response carrying an `error` object

mod client;
mod convert;
mod error;
mod types;

pub use client::{
    DEFAULT_BASE_URL, DEFAULT_ORIGIN, PlanRequest, PlannerClient, PlannerConfig, TripPlanner,
};
pub use convert::{ConversionError, convert_itinerary, convert_leg, convert_plan};
pub use error::PlannerError;
pub use types::{
    ItineraryDto, LegDto, LegGeometry, Plan, PlaceDto, PlanResponse, PlannerErrorBody,
};
