//! Validated query coordinate.

use geo::Coord;
use serde::Serialize;
use serde_json::Value;

use crate::error::{LookupError, Result};

/// Geographic point (lat/lng), always finite and in range once constructed
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

impl Coordinate {
    /// Validate a latitude/longitude pair.
    ///
    /// Bounds are inclusive, so the poles and the antimeridian are valid.
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);

        if !valid {
            return Err(LookupError::InvalidCoordinate);
        }
        Ok(Self { lat, lng })
    }

    /// Validate untyped input. Only JSON numbers are accepted; booleans,
    /// strings, arrays, objects and null are rejected rather than coerced.
    pub fn from_json(lat: Option<&Value>, lng: Option<&Value>) -> Result<Self> {
        match (lat, lng) {
            (Some(Value::Number(lat)), Some(Value::Number(lng))) => {
                let lat = lat.as_f64().ok_or(LookupError::InvalidCoordinate)?;
                let lng = lng.as_f64().ok_or(LookupError::InvalidCoordinate)?;
                Self::new(lat, lng)
            }
            _ => Err(LookupError::InvalidCoordinate),
        }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// As a planar coordinate (x = lng, y = lat)
    pub fn to_coord(&self) -> Coord<f64> {
        Coord {
            x: self.lng,
            y: self.lat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts_in_range() {
        let c = Coordinate::new(13.7563, 100.5018).unwrap();
        assert_eq!(c.lat(), 13.7563);
        assert_eq!(c.to_coord(), Coord { x: 100.5018, y: 13.7563 });
    }

    #[test]
    fn test_accepts_extremes() {
        for (lat, lng) in [(90.0, 0.0), (-90.0, 0.0), (0.0, 180.0), (0.0, -180.0)] {
            assert!(Coordinate::new(lat, lng).is_ok(), "({lat}, {lng})");
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(
            Coordinate::new(91.0, 100.0),
            Err(LookupError::InvalidCoordinate)
        ));
        assert!(Coordinate::new(13.7, 181.0).is_err());
        assert!(Coordinate::new(-90.0001, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!(Coordinate::new(f64::NAN, 100.0).is_err());
        assert!(Coordinate::new(13.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_from_json_rejects_non_numbers() {
        let cases = [
            (json!("not a number"), json!("not a number")),
            (json!(true), json!(false)),
            (json!([13.7563]), json!([100.5018])),
            (json!(null), json!(100.5018)),
            (json!({"lat": 1}), json!(100.5018)),
        ];
        for (lat, lng) in cases {
            let err = Coordinate::from_json(Some(&lat), Some(&lng)).unwrap_err();
            assert_eq!(err.to_string(), "Invalid (lat, lng) input.");
        }
    }

    #[test]
    fn test_from_json_rejects_missing() {
        assert!(Coordinate::from_json(Some(&json!(13.7563)), None).is_err());
        assert!(Coordinate::from_json(None, None).is_err());
    }

    #[test]
    fn test_from_json_accepts_integers_and_floats() {
        let c = Coordinate::from_json(Some(&json!(13)), Some(&json!(100.5))).unwrap();
        assert_eq!(c.lat(), 13.0);
        assert_eq!(c.lng(), 100.5);
    }

    #[test]
    fn test_json_objects_go_through_validation() {
        let body = json!({"lat": 500.0, "lng": -999.0});
        assert!(Coordinate::from_json(body.get("lat"), body.get("lng")).is_err());

        let c = Coordinate::new(13.75, 100.5).unwrap();
        assert_eq!(
            serde_json::to_value(c).unwrap(),
            json!({"lat": 13.75, "lng": 100.5})
        );
    }
}
