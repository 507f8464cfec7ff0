//! Map features handed to the front-end's map widget.

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use crate::domain::{BoundingBox, Coordinate, TravelMode};

/// What a point marker stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointKind {
    Start,
    End,
    IntermediateStop,
}

impl PointKind {
    /// Tag the map layer styles markers by.
    pub fn as_str(&self) -> &'static str {
        match self {
            PointKind::Start => "start",
            PointKind::End => "end",
            PointKind::IntermediateStop => "intermediate-stop",
        }
    }
}

/// The drawn path of one leg.
#[derive(Debug, Clone, PartialEq)]
pub struct LineFeature {
    /// Empty when the leg had no usable geometry
    pub coordinates: Vec<Coordinate>,
    pub mode: TravelMode,
    pub duration_secs: f64,
    pub distance_m: f64,
    pub route_short_name: String,
    pub route_long_name: String,
    /// Position of the leg in the itinerary
    pub leg_index: usize,
}

/// A marker on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct PointFeature {
    /// `None` only for intermediate stops the planner sent without a position
    pub coordinate: Option<Coordinate>,
    pub kind: PointKind,
    pub name: Option<String>,
    pub arrival: Option<DateTime<Utc>>,
    pub departure: Option<DateTime<Utc>>,
    /// Leg the stop belongs to, for intermediate stops
    pub leg_index: Option<usize>,
}

impl PointFeature {
    /// An itinerary endpoint marker.
    pub fn endpoint(kind: PointKind, coordinate: Coordinate) -> Self {
        Self {
            coordinate: Some(coordinate),
            kind,
            name: None,
            arrival: None,
            departure: None,
            leg_index: None,
        }
    }
}

/// A renderable map primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum MapFeature {
    Line(LineFeature),
    Point(PointFeature),
}

impl MapFeature {
    /// GeoJSON `Feature` object with `[lon, lat]` positions.
    pub fn to_geojson(&self) -> Value {
        match self {
            MapFeature::Line(line) => {
                let positions: Vec<[f64; 2]> =
                    line.coordinates.iter().map(Coordinate::to_position).collect();
                json!({
                    "type": "Feature",
                    "geometry": {
                        "type": "LineString",
                        "coordinates": positions,
                    },
                    "properties": {
                        "kind": "leg",
                        "legIndex": line.leg_index,
                        "mode": line.mode.as_str(),
                        "durationSecs": line.duration_secs,
                        "distanceMeters": line.distance_m,
                        "routeShortName": line.route_short_name,
                        "routeLongName": line.route_long_name,
                    },
                })
            }
            MapFeature::Point(point) => {
                let geometry = point.coordinate.map_or(Value::Null, |c| {
                    json!({
                        "type": "Point",
                        "coordinates": c.to_position(),
                    })
                });
                json!({
                    "type": "Feature",
                    "geometry": geometry,
                    "properties": {
                        "kind": point.kind.as_str(),
                        "legIndex": point.leg_index,
                        "name": point.name,
                        "arrival": point.arrival.map(|t| t.to_rfc3339()),
                        "departure": point.departure.map(|t| t.to_rfc3339()),
                    },
                })
            }
        }
    }
}

/// Ordered features of one rendered itinerary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<MapFeature>,
}

impl FeatureCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Leg paths, in leg order.
    pub fn lines(&self) -> impl Iterator<Item = &LineFeature> {
        self.features.iter().filter_map(|f| match f {
            MapFeature::Line(line) => Some(line),
            MapFeature::Point(_) => None,
        })
    }

    /// Markers, in emission order.
    pub fn points(&self) -> impl Iterator<Item = &PointFeature> {
        self.features.iter().filter_map(|f| match f {
            MapFeature::Point(point) => Some(point),
            MapFeature::Line(_) => None,
        })
    }

    /// Box around every coordinate of every leg path.
    ///
    /// `None` when no leg has any coordinate; endpoint markers do not count.
    pub fn line_bounds(&self) -> Option<BoundingBox> {
        BoundingBox::enclosing(self.lines().flat_map(|l| l.coordinates.iter()))
    }

    /// GeoJSON `FeatureCollection`.
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self.features.iter().map(MapFeature::to_geojson).collect();
        json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }
}
