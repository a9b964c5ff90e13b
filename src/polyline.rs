//! Polyline representation for route geometries.
//!
//! The service ships every geometry as an encoded polyline string at five
//! decimal digits of precision. Decoding is delegated to the `polyline`
//! crate after a structural check of the text, and happens eagerly at the
//! response boundary.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PolylineError;
use crate::request::LatLng;

const PRECISION: u32 = 5;

/// Smallest valid chunk character (`?`).
const CHUNK_MIN: u8 = b'?';
const CHUNK_MAX: u8 = b'~';

/// Chunks at or above this character carry a continuation bit.
const CHUNK_CONTINUE: u8 = b'_';

/// A full-range delta (360 degrees at 1e5) needs six 5-bit chunks.
const MAX_CHUNKS_PER_VALUE: usize = 7;

/// A polyline representing a route geometry as decoded coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<LatLng>,
}

impl Polyline {
    /// Creates a new Polyline from decoded coordinate points.
    pub fn new(points: Vec<LatLng>) -> Self {
        Self { points }
    }

    /// Decodes an encoded polyline string.
    pub fn decode(encoded: &str) -> Result<Self, PolylineError> {
        check_structure(encoded)?;

        let line = polyline::decode_polyline(encoded, PRECISION)
            .map_err(|err| PolylineError::Invalid(err.to_string()))?;

        // geo-types coordinates are x = longitude, y = latitude.
        let points = line
            .0
            .into_iter()
            .map(|coord| LatLng::new(coord.y, coord.x))
            .collect::<Vec<_>>();

        if let Some(point) = points
            .iter()
            .find(|point| point.lat.abs() > 90.0 || point.lng.abs() > 180.0)
        {
            return Err(PolylineError::OutOfRange {
                lat: point.lat,
                lng: point.lng,
            });
        }

        Ok(Self { points })
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[LatLng] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<LatLng> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl FromStr for Polyline {
    type Err = PolylineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Polyline::decode(s)
    }
}

/// Rejects text that cannot be a well-formed sequence of coordinate pairs.
///
/// Every value must be at most `MAX_CHUNKS_PER_VALUE` chunks long, so no
/// delta fed to the decoder can exceed a few hundred degrees.
fn check_structure(encoded: &str) -> Result<(), PolylineError> {
    let mut chunks = 0;
    let mut values = 0usize;

    for (index, character) in encoded.char_indices() {
        let byte = u8::try_from(character).unwrap_or(0);
        if !(CHUNK_MIN..=CHUNK_MAX).contains(&byte) {
            return Err(PolylineError::InvalidCharacter { character, index });
        }

        chunks += 1;
        if chunks > MAX_CHUNKS_PER_VALUE {
            return Err(PolylineError::Overflow { index });
        }
        if byte < CHUNK_CONTINUE {
            chunks = 0;
            values += 1;
        }
    }

    if chunks != 0 {
        Err(PolylineError::Truncated)
    } else if values % 2 != 0 {
        Err(PolylineError::UnpairedCoordinate)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latlngs(points: &[(f64, f64)]) -> Vec<LatLng> {
        points.iter().copied().map(LatLng::from).collect()
    }

    #[test]
    fn test_new_and_points() {
        let points = latlngs(&[(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)]);
        let polyline = Polyline::new(points.clone());
        assert_eq!(polyline.points(), &points[..]);
    }

    #[test]
    fn test_into_points() {
        let points = latlngs(&[(38.5, -120.2), (40.7, -120.95)]);
        let polyline = Polyline::new(points.clone());
        assert_eq!(polyline.into_points(), points);
    }

    #[test]
    fn test_decode_reference_vector() {
        let polyline = Polyline::decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
        assert_eq!(
            polyline.points(),
            &latlngs(&[(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)])[..]
        );
    }

    #[test]
    fn test_decode_single_point() {
        // (0, 0) encodes as one zero chunk per axis.
        let polyline: Polyline = "??".parse().unwrap();
        assert_eq!(polyline.points(), &[LatLng::new(0.0, 0.0)]);
    }

    #[test]
    fn test_decode_empty() {
        let polyline = Polyline::decode("").unwrap();
        assert!(polyline.is_empty());
    }

    #[test]
    fn test_decode_truncated_chunk() {
        // `_` has the continuation bit set and nothing follows.
        assert_eq!(Polyline::decode("_"), Err(PolylineError::Truncated));
    }

    #[test]
    fn test_decode_unpaired_latitude() {
        assert_eq!(Polyline::decode("_p~iF"), Err(PolylineError::UnpairedCoordinate));
    }

    #[test]
    fn test_decode_invalid_character() {
        assert_eq!(
            Polyline::decode("_p~iF ps|U"),
            Err(PolylineError::InvalidCharacter {
                character: ' ',
                index: 5
            })
        );
    }

    #[test]
    fn test_decode_overlong_value() {
        let encoded = "~".repeat(20);
        assert!(matches!(
            Polyline::decode(&encoded),
            Err(PolylineError::Overflow { index: 7 })
        ));
    }

    #[test]
    fn test_decode_huge_deltas_are_rejected() {
        // Three maximal deltas would overflow a 64-bit accumulator.
        let encoded = format!("{}F?", "~".repeat(12)).repeat(3);
        assert!(Polyline::decode(&encoded).is_err());
    }

    #[test]
    fn test_decode_out_of_range_latitude() {
        // Two +64 degree latitude steps land at 128 degrees.
        let encoded = "__seK?__seK?";
        assert!(Polyline::decode(encoded).is_err());
    }
}
