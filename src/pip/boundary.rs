//! Admin boundary decoded from a single dataset feature.

use geo::coordinate_position::{CoordPos, CoordinatePosition};
use geo::{BoundingRect, Geometry, MultiPolygon, Rect};
use geojson::Feature;
use serde_json::Value;

use crate::error::{LookupError, Result};
use crate::models::{AdminLevel, AdminUnit, Coordinate};

/// A single admin boundary polygon with its source properties
#[derive(Debug, Clone)]
pub struct AdminBoundary {
    pub geometry: MultiPolygon<f64>,
    bbox: Option<Rect<f64>>,
    properties: Option<geojson::JsonObject>,
}

impl AdminBoundary {
    /// Decode a feature's geometry.
    ///
    /// Returns `Ok(None)` for features that can never contain a point
    /// (no geometry, or a non-areal one).
    pub fn from_feature(feature: Feature, dataset: &str) -> Result<Option<Self>> {
        let Some(geometry) = feature.geometry else {
            return Ok(None);
        };

        let geometry: Geometry<f64> =
            geometry
                .try_into()
                .map_err(|e: geojson::Error| LookupError::DatasetCorrupt {
                    dataset: dataset.to_string(),
                    reason: e.to_string(),
                })?;

        let geometry = match geometry {
            Geometry::MultiPolygon(mp) => mp,
            Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
            _ => return Ok(None),
        };

        Ok(Some(Self {
            bbox: geometry.bounding_rect(),
            geometry,
            properties: feature.properties,
        }))
    }

    /// Get the bounding box of this boundary
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        self.bbox
            .map(|rect| (rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }

    /// Cheap rectangle check. A `false` here means `contains` is `false` too.
    pub fn bbox_contains(&self, point: &Coordinate) -> bool {
        let Some((min_lng, min_lat, max_lng, max_lat)) = self.bbox() else {
            return false;
        };
        let (lng, lat) = (point.lng(), point.lat());
        lng >= min_lng && lng <= max_lng && lat >= min_lat && lat <= max_lat
    }

    /// Exact test. Points on an edge count as inside; points in a hole do not.
    pub fn contains(&self, point: &Coordinate) -> bool {
        self.geometry.coordinate_position(&point.to_coord()) != CoordPos::Outside
    }

    /// Map this boundary's properties to a unit at `level`
    pub fn to_unit(&self, level: AdminLevel, dataset: &str) -> Result<AdminUnit> {
        let property = |key: String| -> Result<String> {
            match self.properties.as_ref().and_then(|p| p.get(&key)) {
                Some(Value::String(s)) => Ok(s.clone()),
                _ => Err(LookupError::DatasetCorrupt {
                    dataset: dataset.to_string(),
                    reason: format!("matched feature has no string property {}", key),
                }),
            }
        };

        Ok(AdminUnit {
            name_en: property(level.name_en_key())?,
            name_th: property(level.name_th_key())?,
            pcode: property(level.pcode_key())?,
            adm_level: level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(value: serde_json::Value) -> Feature {
        serde_json::from_value(value).unwrap()
    }

    fn square_with_hole() -> AdminBoundary {
        let f = feature(json!({
            "type": "Feature",
            "properties": {"ADM1_EN": "Ring", "ADM1_TH": "วง", "ADM1_PCODE": "TH99"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [
                    [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
                    [[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0], [4.0, 4.0]]
                ]
            }
        }));
        AdminBoundary::from_feature(f, "test").unwrap().unwrap()
    }

    fn at(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    #[test]
    fn test_bbox() {
        let boundary = square_with_hole();
        assert_eq!(boundary.bbox(), Some((0.0, 0.0, 10.0, 10.0)));
        assert!(boundary.bbox_contains(&at(5.0, 5.0)));
        assert!(!boundary.bbox_contains(&at(11.0, 5.0)));
    }

    #[test]
    fn test_hole_is_outside() {
        let boundary = square_with_hole();
        assert!(boundary.contains(&at(2.0, 2.0)));
        assert!(!boundary.contains(&at(5.0, 5.0)));
        assert!(!boundary.contains(&at(5.0, 12.0)));
    }

    #[test]
    fn test_edge_is_inside() {
        let boundary = square_with_hole();
        assert!(boundary.contains(&at(0.0, 5.0)));
        assert!(boundary.contains(&at(10.0, 10.0)));
    }

    #[test]
    fn test_multipolygon_any_part() {
        let f = feature(json!({
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": [
                    [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]],
                    [[[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 6.0], [5.0, 5.0]]]
                ]
            }
        }));
        let boundary = AdminBoundary::from_feature(f, "test").unwrap().unwrap();
        assert!(boundary.contains(&at(0.5, 0.5)));
        assert!(boundary.contains(&at(5.5, 5.5)));
        // Inside the combined bbox but in neither part
        assert!(boundary.bbox_contains(&at(3.0, 3.0)));
        assert!(!boundary.contains(&at(3.0, 3.0)));
    }

    #[test]
    fn test_non_areal_geometry_is_skipped() {
        let f = feature(json!({
            "type": "Feature",
            "properties": {},
            "geometry": {"type": "Point", "coordinates": [1.0, 1.0]}
        }));
        assert!(AdminBoundary::from_feature(f, "test").unwrap().is_none());

        let f = feature(json!({"type": "Feature", "properties": {}, "geometry": null}));
        assert!(AdminBoundary::from_feature(f, "test").unwrap().is_none());
    }

    #[test]
    fn test_to_unit() {
        let unit = square_with_hole()
            .to_unit(AdminLevel::Province, "test")
            .unwrap();
        assert_eq!(unit.name_en, "Ring");
        assert_eq!(unit.name_th, "วง");
        assert_eq!(unit.pcode, "TH99");
        assert_eq!(unit.adm_level, AdminLevel::Province);
    }

    #[test]
    fn test_to_unit_wrong_level_is_corrupt() {
        let err = square_with_hole()
            .to_unit(AdminLevel::Amphoe, "test")
            .unwrap_err();
        assert!(matches!(err, LookupError::DatasetCorrupt { .. }));
        assert!(err.to_string().contains("ADM2_EN"));
    }
}
