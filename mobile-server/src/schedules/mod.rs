//! Line timetables.
//!
//! Lists the network's tram and bus lines and the next passages at a stop,
//! as the timetable screen shows them.

mod client;
mod error;
mod passages;
mod routes;
mod types;

pub use client::{ScheduleClient, ScheduleConfig, Timetable};
pub use error::ScheduleError;
pub use passages::{Passage, PassageView, Punctuality, flatten_passages, select_passages};
pub use routes::{
    Direction, DirectionStop, Line, LineCatalog, ROUTE_TYPE_BUS, ROUTE_TYPE_TRAM, RouteStyle,
    load_route_styles, read_route_styles,
};
pub use types::{
    DirectionDto, PatternDto, PatternStopTimes, RouteDto, SheetStopDto, StopTimeDto,
    TimetableSheet,
};
