//! Line catalogue.
//!
//! The planner's route index knows line ids and names; colours and GTFS
//! route types come from the network's `routes.txt`. Lines are matched on
//! their short name.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::Coordinate;

use super::error::ScheduleError;
use super::types::{DirectionDto, RouteDto};

/// GTFS route type of trams.
pub const ROUTE_TYPE_TRAM: u16 = 0;

/// GTFS route type of buses, also used when the type is unknown.
pub const ROUTE_TYPE_BUS: u16 = 3;

const DEFAULT_COLOR: &str = "CCCCCC";
const DEFAULT_TEXT_COLOR: &str = "000000";

/// Prefix of lines run by the urban network operator.
const URBAN_PREFIX: &str = "SEM:";

/// Display attributes of a line from `routes.txt`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteStyle {
    pub route_short_name: String,
    #[serde(default)]
    pub route_color: Option<String>,
    #[serde(default)]
    pub route_text_color: Option<String>,
    #[serde(default)]
    pub route_type: Option<u16>,
}

/// Read route styles from CSV with a header row.
///
/// Malformed rows are skipped.
pub fn read_route_styles(reader: impl Read) -> Vec<RouteStyle> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut styles = Vec::new();
    let mut skipped = 0usize;

    for row in csv_reader.deserialize::<RouteStyle>() {
        match row {
            Ok(style) => styles.push(style),
            Err(e) => {
                skipped += 1;
                debug!(error = %e, "skipping routes.txt row");
            }
        }
    }

    if skipped > 0 {
        warn!(skipped, kept = styles.len(), "some routes.txt rows were unreadable");
    }
    styles
}

/// Read route styles from a `routes.txt` file.
pub fn load_route_styles(path: impl AsRef<Path>) -> Result<Vec<RouteStyle>, ScheduleError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ScheduleError::RoutesFile {
        path: path.display().to_string(),
        source,
    })?;
    Ok(read_route_styles(file))
}

/// A line as shown in the timetable screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    /// Planner route id, e.g. "SEM:A"
    pub id: String,
    /// `"{id}-{short_name}"`
    pub unique_id: String,
    pub short_name: String,
    pub long_name: String,
    pub mode: Option<String>,
    /// Hex colour without '#'
    pub color: String,
    pub text_color: String,
    /// GTFS route type
    pub route_type: u16,
}

impl Line {
    /// Combine an index entry with its style, if any.
    ///
    /// The colour comes from `routes.txt`, then from the index, then grey.
    pub fn new(route: &RouteDto, style: Option<&RouteStyle>) -> Self {
        let non_empty = |s: &Option<String>| s.clone().filter(|s| !s.trim().is_empty());

        Self {
            id: route.id.clone(),
            unique_id: format!("{}-{}", route.id, route.short_name),
            short_name: route.short_name.clone(),
            long_name: route.long_name.clone(),
            mode: route.mode.clone(),
            color: style
                .and_then(|s| non_empty(&s.route_color))
                .or_else(|| non_empty(&route.color))
                .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            text_color: style
                .and_then(|s| non_empty(&s.route_text_color))
                .unwrap_or_else(|| DEFAULT_TEXT_COLOR.to_string()),
            route_type: style.and_then(|s| s.route_type).unwrap_or(ROUTE_TYPE_BUS),
        }
    }

    fn matches(&self, term: &str) -> bool {
        self.short_name.to_lowercase().contains(term) || self.long_name.to_lowercase().contains(term)
    }
}

/// All known lines, deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineCatalog {
    lines: Vec<Line>,
}

impl LineCatalog {
    /// Merge the route index with `routes.txt` styles.
    ///
    /// The first style listed for a short name wins; routes with the same
    /// unique id collapse to the first.
    pub fn merge(routes: &[RouteDto], styles: &[RouteStyle]) -> Self {
        let mut by_short_name: HashMap<&str, &RouteStyle> = HashMap::new();
        for style in styles {
            by_short_name
                .entry(style.route_short_name.as_str())
                .or_insert(style);
        }

        let mut seen = std::collections::HashSet::new();
        let lines = routes
            .iter()
            .map(|r| Line::new(r, by_short_name.get(r.short_name.as_str()).copied()))
            .filter(|l| seen.insert(l.unique_id.clone()))
            .collect();

        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Look a line up by planner route id.
    pub fn get(&self, id: &str) -> Option<&Line> {
        self.lines.iter().find(|l| l.id == id)
    }

    /// Tram lines sorted by short name.
    pub fn trams(&self) -> Vec<&Line> {
        self.of_type(ROUTE_TYPE_TRAM, None)
    }

    /// Bus lines sorted by short name.
    pub fn buses(&self) -> Vec<&Line> {
        self.of_type(ROUTE_TYPE_BUS, None)
    }

    /// Urban lines of a type whose names contain `term` (case-insensitive).
    pub fn search(&self, route_type: u16, term: &str) -> Vec<&Line> {
        self.of_type(route_type, Some(&term.trim().to_lowercase()))
    }

    fn of_type(&self, route_type: u16, term: Option<&str>) -> Vec<&Line> {
        let mut lines: Vec<&Line> = self
            .lines
            .iter()
            .filter(|l| l.route_type == route_type)
            .filter(|l| match term {
                Some(term) => l.id.starts_with(URBAN_PREFIX) && l.matches(term),
                None => true,
            })
            .collect();
        lines.sort_by(|a, b| a.short_name.cmp(&b.short_name));
        lines
    }
}

/// A direction of travel on a line, as listed on its timetable sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Direction {
    /// "first stop → last stop"
    pub name: String,
    pub stops: Vec<DirectionStop>,
}

/// A stop served in one direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectionStop {
    pub stop_id: String,
    pub name: String,
    pub coordinate: Option<Coordinate>,
}

impl From<&DirectionDto> for Direction {
    fn from(dto: &DirectionDto) -> Self {
        let first = dto.arrets.first().map_or("", |s| s.stop_name.as_str());
        let last = dto.arrets.last().map_or("", |s| s.stop_name.as_str());

        Self {
            name: format!("{first} → {last}"),
            stops: dto
                .arrets
                .iter()
                .map(|s| DirectionStop {
                    stop_id: s.stop_id.clone(),
                    name: s.stop_name.clone(),
                    coordinate: match (s.lon, s.lat) {
                        (Some(lon), Some(lat)) => Some(Coordinate::new(lon, lat)),
                        _ => None,
                    },
                })
                .collect(),
        }
    }
}
