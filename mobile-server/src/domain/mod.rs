//! Domain types for the transit client back-end.
//!
//! Plain data for coordinates, encoded geometries, travel modes and trip
//! plans. Nothing here performs I/O; the planner, geocoder and timetable
//! clients convert their wire formats into these types.

mod coordinate;
mod itinerary;
mod mode;
mod polyline;
mod time;

pub use coordinate::{BoundingBox, Coordinate, InvalidCoordinate};
pub use itinerary::{IntermediateStop, Itinerary, Leg, RouteInfo};
pub use mode::{ModeSet, TravelMode, UnknownModeSet};
pub use polyline::{DecodeError, EncodedPolyline, decode, encode};
pub use time::{
    clock_time, from_epoch_millis, kilometres, service_date_param, wait_label, whole_minutes,
};
