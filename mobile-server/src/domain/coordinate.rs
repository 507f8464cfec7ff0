//! Geographic coordinates and bounding boxes.
//!
//! Coordinates are stored longitude first, matching GeoJSON positions and
//! the `[lon, lat]` centres returned by the geocoder. The planner wants the
//! opposite order on the wire (`lat,lon`), which `to_place_param` handles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing a `lat,lon` literal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coordinate: {reason}")]
pub struct InvalidCoordinate {
    reason: &'static str,
}

impl InvalidCoordinate {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A WGS84 position in degrees, longitude first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    /// Create a coordinate from longitude and latitude.
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Parse a `lat,lon` literal, as typed by a user or sent by the planner.
    ///
    /// # Examples
    ///
    /// ```
    /// use mobile_server::domain::Coordinate;
    ///
    /// let c = Coordinate::parse_lat_lon("45.1885, 5.7245").unwrap();
    /// assert_eq!(c, Coordinate::new(5.7245, 45.1885));
    ///
    /// assert!(Coordinate::parse_lat_lon("Place Victor Hugo").is_err());
    /// assert!(Coordinate::parse_lat_lon("95.0,5.0").is_err());
    /// ```
    pub fn parse_lat_lon(s: &str) -> Result<Self, InvalidCoordinate> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| InvalidCoordinate::new("expected lat,lon"))?;

        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| InvalidCoordinate::new("latitude is not a number"))?;
        let lon: f64 = lon
            .trim()
            .parse()
            .map_err(|_| InvalidCoordinate::new("longitude is not a number"))?;

        if !(-90.0..=90.0).contains(&lat) {
            return Err(InvalidCoordinate::new("latitude out of range"));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(InvalidCoordinate::new("longitude out of range"));
        }

        Ok(Self { lon, lat })
    }

    /// Format as the planner's `fromPlace` / `toPlace` parameter (`lat,lon`).
    pub fn to_place_param(&self) -> String {
        format!("{},{}", self.lat, self.lon)
    }

    /// GeoJSON position, `[lon, lat]`.
    pub fn to_position(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    /// Integer key at polyline precision (1e-5 degrees), used for caching.
    pub fn grid_key(&self) -> (i64, i64) {
        (
            (self.lon * 1e5).round() as i64,
            (self.lat * 1e5).round() as i64,
        )
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lon)
    }
}

/// Smallest axis-aligned box containing a set of coordinates.
///
/// Used by the map front-end to fit its viewport around an itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    /// South-west corner
    pub min: Coordinate,
    /// North-east corner
    pub max: Coordinate,
}

impl BoundingBox {
    /// A box containing exactly one point.
    pub fn from_point(c: Coordinate) -> Self {
        Self { min: c, max: c }
    }

    /// Grow the box to include `c`.
    pub fn extend(&mut self, c: Coordinate) {
        self.min.lon = self.min.lon.min(c.lon);
        self.min.lat = self.min.lat.min(c.lat);
        self.max.lon = self.max.lon.max(c.lon);
        self.max.lat = self.max.lat.max(c.lat);
    }

    /// Bounding box of a sequence, or `None` if it is empty.
    pub fn enclosing<'a>(coords: impl IntoIterator<Item = &'a Coordinate>) -> Option<Self> {
        let mut iter = coords.into_iter();
        let mut bounds = Self::from_point(*iter.next()?);
        for c in iter {
            bounds.extend(*c);
        }
        Some(bounds)
    }

    /// Whether `c` lies inside the box (edges included).
    pub fn contains(&self, c: &Coordinate) -> bool {
        (self.min.lon..=self.max.lon).contains(&c.lon)
            && (self.min.lat..=self.max.lat).contains(&c.lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lat_lon_swaps_order() {
        let c = Coordinate::parse_lat_lon("45.188529,5.724524").unwrap();
        assert_eq!(c.lon, 5.724524);
        assert_eq!(c.lat, 45.188529);
    }

    #[test]
    fn parse_lat_lon_rejects_garbage() {
        assert!(Coordinate::parse_lat_lon("").is_err());
        assert!(Coordinate::parse_lat_lon("45.1").is_err());
        assert!(Coordinate::parse_lat_lon("abc,def").is_err());
        assert!(Coordinate::parse_lat_lon("45.1,200").is_err());
    }

    #[test]
    fn place_param_is_lat_first() {
        let c = Coordinate::new(5.72, 45.18);
        assert_eq!(c.to_place_param(), "45.18,5.72");
        assert_eq!(c.to_position(), [5.72, 45.18]);
    }

    #[test]
    fn grid_key_rounds_to_polyline_precision() {
        let a = Coordinate::new(5.724524, 45.188529);
        let b = Coordinate::new(5.7245241, 45.1885289);
        assert_eq!(a.grid_key(), b.grid_key());
        assert_eq!(a.grid_key(), (572452, 4518853));
    }

    #[test]
    fn bounding_box_of_empty_is_none() {
        assert!(BoundingBox::enclosing(&[]).is_none());
    }

    #[test]
    fn bounding_box_encloses_all_points() {
        let points = [
            Coordinate::new(5.70, 45.19),
            Coordinate::new(5.74, 45.17),
            Coordinate::new(5.72, 45.20),
        ];
        let bounds = BoundingBox::enclosing(&points).unwrap();

        assert_eq!(bounds.min, Coordinate::new(5.70, 45.17));
        assert_eq!(bounds.max, Coordinate::new(5.74, 45.20));
        assert!(points.iter().all(|p| bounds.contains(p)));
        assert!(!bounds.contains(&Coordinate::new(5.80, 45.18)));
    }
}
