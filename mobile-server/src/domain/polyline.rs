//! Encoded polyline codec.
//!
//! The planner ships leg geometries in Google's polyline format: each point
//! is a (latitude, longitude) pair scaled by 1e5, delta-encoded against the
//! previous point and written as 5-bit chunks offset by 63 so that every
//! chunk is a printable ASCII character. Bit `0x20` of a chunk marks that
//! another chunk of the same value follows.
//!
//! The decoder validates the stream: a run that stops mid-value or mid-point
//! is reported as [`DecodeError::TruncatedStream`] instead of producing
//! trailing garbage coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Coordinate;

/// Scale factor between degrees and encoded integers.
const PRECISION: f64 = 1e5;

/// Offset added to every chunk to make it printable.
const CHUNK_OFFSET: u8 = 63;

/// Continuation bit of a chunk.
const CONTINUATION: i64 = 0x20;

/// Payload bits of a chunk.
const CHUNK_MASK: i64 = 0x1f;

/// Largest shift a 32-bit value can need (7 chunks).
const MAX_SHIFT: u32 = 30;

/// Errors from decoding a malformed polyline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The stream ended inside a value or between the two halves of a point.
    #[error("polyline truncated at byte {offset}")]
    TruncatedStream { offset: usize },

    /// A byte outside the printable range a polyline can contain.
    #[error("invalid polyline byte 0x{byte:02x} at {offset}")]
    InvalidByte { offset: usize, byte: u8 },

    /// A continuation run longer than any 32-bit value needs.
    #[error("polyline value too long at byte {offset}")]
    Overflow { offset: usize },
}

/// A polyline string as received from the planner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedPolyline(String);

impl EncodedPolyline {
    /// Wrap an encoded string without validating it.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The raw encoded text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the geometry has no points at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode into coordinates. See [`decode`].
    pub fn decode(&self) -> Result<Vec<Coordinate>, DecodeError> {
        decode(&self.0)
    }
}

impl fmt::Display for EncodedPolyline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&[Coordinate]> for EncodedPolyline {
    fn from(coords: &[Coordinate]) -> Self {
        Self(encode(coords))
    }
}

/// Running state of a decode: absolute position so far plus read offset.
#[derive(Debug, Default)]
struct Accumulator {
    lat: i64,
    lng: i64,
    index: usize,
}

impl Accumulator {
    /// Read one zigzag-encoded signed value starting at `self.index`.
    fn next_value(&mut self, bytes: &[u8]) -> Result<i64, DecodeError> {
        let mut result: i64 = 0;
        let mut shift: u32 = 0;

        loop {
            let offset = self.index;
            let byte = *bytes
                .get(offset)
                .ok_or(DecodeError::TruncatedStream { offset })?;

            if !(CHUNK_OFFSET..=b'~').contains(&byte) {
                return Err(DecodeError::InvalidByte { offset, byte });
            }
            if shift > MAX_SHIFT {
                return Err(DecodeError::Overflow { offset });
            }

            let chunk = i64::from(byte - CHUNK_OFFSET);
            result |= (chunk & CHUNK_MASK) << shift;
            shift += 5;
            self.index += 1;

            if chunk & CONTINUATION == 0 {
                break;
            }
        }

        if result & 1 == 1 {
            Ok(!(result >> 1))
        } else {
            Ok(result >> 1)
        }
    }
}

/// Decode a polyline into `(lon, lat)` coordinates in encoding order.
///
/// The empty string decodes to an empty sequence.
///
/// # Errors
///
/// Returns `Err` if the stream stops in the middle of a point, contains a
/// byte that cannot appear in a polyline, or encodes a value wider than
/// 32 bits.
///
/// # Examples
///
/// ```
/// use mobile_server::domain::decode;
///
/// let coords = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
/// assert_eq!(coords.len(), 3);
/// assert!((coords[0].lon - -120.2).abs() < 1e-9);
/// assert!((coords[0].lat - 38.5).abs() < 1e-9);
///
/// assert!(decode("").unwrap().is_empty());
/// assert!(decode("_p~iF").is_err());
/// ```
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, DecodeError> {
    let bytes = encoded.as_bytes();
    let mut acc = Accumulator::default();
    // Each point takes at least two bytes.
    let mut coords = Vec::with_capacity(bytes.len() / 2);

    while acc.index < bytes.len() {
        acc.lat += acc.next_value(bytes)?;
        acc.lng += acc.next_value(bytes)?;
        coords.push(Coordinate::new(
            acc.lng as f64 / PRECISION,
            acc.lat as f64 / PRECISION,
        ));
    }

    Ok(coords)
}

/// Encode coordinates as a polyline. Inverse of [`decode`] up to 1e-5 degrees.
pub fn encode(coords: &[Coordinate]) -> String {
    let mut out = String::with_capacity(coords.len() * 8);
    let mut prev_lat = 0i64;
    let mut prev_lng = 0i64;

    for c in coords {
        let lat = (c.lat * PRECISION).round() as i64;
        let lng = (c.lon * PRECISION).round() as i64;
        encode_value(lat - prev_lat, &mut out);
        encode_value(lng - prev_lng, &mut out);
        prev_lat = lat;
        prev_lng = lng;
    }

    out
}

fn encode_value(value: i64, out: &mut String) {
    let mut v = if value < 0 { !(value << 1) } else { value << 1 };
    while v >= CONTINUATION {
        out.push(char::from(((CONTINUATION | (v & CHUNK_MASK)) as u8) + CHUNK_OFFSET));
        v >>= 5;
    }
    out.push(char::from(v as u8 + CHUNK_OFFSET));
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    fn assert_close(actual: &Coordinate, lon: f64, lat: f64) {
        assert!(
            (actual.lon - lon).abs() < 1e-5 && (actual.lat - lat).abs() < 1e-5,
            "expected ({lon}, {lat}), got ({}, {})",
            actual.lon,
            actual.lat
        );
    }

    #[test]
    fn decodes_known_vector() {
        let coords = decode(KNOWN).unwrap();
        assert_eq!(coords.len(), 3);
        assert_close(&coords[0], -120.2, 38.5);
        assert_close(&coords[1], -120.95, 40.7);
        assert_close(&coords[2], -126.453, 43.252);
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(decode("").unwrap(), Vec::new());
        assert!(EncodedPolyline::default().decode().unwrap().is_empty());
    }

    #[test]
    fn single_zero_point() {
        // Two zero deltas
        let coords = decode("??").unwrap();
        assert_eq!(coords, vec![Coordinate::new(0.0, 0.0)]);
    }

    #[test]
    fn truncated_inside_value() {
        // "_p~iF" is a full latitude; "~ps" is a longitude missing its tail.
        let err = decode("_p~iF~ps").unwrap_err();
        assert_eq!(err, DecodeError::TruncatedStream { offset: 8 });
    }

    #[test]
    fn truncated_between_halves_of_point() {
        let err = decode("_p~iF").unwrap_err();
        assert_eq!(err, DecodeError::TruncatedStream { offset: 5 });
    }

    #[test]
    fn rejects_bytes_below_offset() {
        let err = decode("_p~iF ps|U").unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidByte {
                offset: 5,
                byte: b' '
            }
        );
    }

    #[test]
    fn rejects_non_ascii() {
        let err = decode("é").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidByte { offset: 0, .. }));
    }

    #[test]
    fn rejects_overlong_runs() {
        // Eight continuation chunks in a row
        let err = decode("~~~~~~~~?").unwrap_err();
        assert_eq!(err, DecodeError::Overflow { offset: 7 });
    }

    #[test]
    fn encodes_known_vector() {
        let coords = [
            Coordinate::new(-120.2, 38.5),
            Coordinate::new(-120.95, 40.7),
            Coordinate::new(-126.453, 43.252),
        ];
        assert_eq!(encode(&coords), KNOWN);
        assert_eq!(EncodedPolyline::from(&coords[..]).as_str(), KNOWN);
    }

    #[test]
    fn decode_is_idempotent() {
        let a = decode(KNOWN).unwrap();
        let b = decode(KNOWN).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn error_display() {
        let err = DecodeError::TruncatedStream { offset: 3 };
        assert_eq!(err.to_string(), "polyline truncated at byte 3");

        let err = DecodeError::InvalidByte {
            offset: 1,
            byte: 0x20,
        };
        assert_eq!(err.to_string(), "invalid polyline byte 0x20 at 1");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn coordinate() -> impl Strategy<Value = Coordinate> {
        (-180.0f64..180.0, -90.0f64..90.0).prop_map(|(lon, lat)| Coordinate::new(lon, lat))
    }

    proptest! {
        /// Property: encode then decode reproduces every point to 1e-5.
        #[test]
        fn round_trip_within_precision(coords in prop::collection::vec(coordinate(), 0..40)) {
            let decoded = decode(&encode(&coords)).unwrap();
            prop_assert_eq!(decoded.len(), coords.len());
            for (original, back) in coords.iter().zip(&decoded) {
                prop_assert!((original.lon - back.lon).abs() <= 1e-5);
                prop_assert!((original.lat - back.lat).abs() <= 1e-5);
            }
        }

        /// Property: dropping the last byte of a valid stream is always detected.
        #[test]
        fn chopped_stream_is_truncated(coords in prop::collection::vec(coordinate(), 1..20)) {
            let encoded = encode(&coords);
            let chopped = &encoded[..encoded.len() - 1];
            let is_truncated = matches!(
                decode(chopped),
                Err(DecodeError::TruncatedStream { .. })
            );
            prop_assert!(is_truncated);
        }

        /// Property: arbitrary printable input never panics.
        #[test]
        fn arbitrary_ascii_never_panics(s in "[ -~]{0,64}") {
            let _ = decode(&s);
        }
    }
}
