//! Synthetic datasets for tests: axis-aligned squares named after real regions.

use serde_json::{json, Value};

use super::{DatasetKey, MemoryRepository};
use crate::models::AdminLevel;

fn properties(level: AdminLevel, name_en: &str, name_th: &str, pcode: &str) -> Value {
    json!({
        level.name_en_key(): name_en,
        level.name_th_key(): name_th,
        level.pcode_key(): pcode,
        "ADM0_EN": "Thailand",
    })
}

/// Closed ring for the square with south-west corner `(lat, lng)`
fn ring((lat, lng): (f64, f64), size: f64) -> Value {
    json!([
        [lng, lat],
        [lng + size, lat],
        [lng + size, lat + size],
        [lng, lat + size],
        [lng, lat]
    ])
}

pub fn region(
    level: AdminLevel,
    name_en: &str,
    name_th: &str,
    pcode: &str,
    origin: (f64, f64),
    size: f64,
) -> Value {
    json!({
        "type": "Feature",
        "properties": properties(level, name_en, name_th, pcode),
        "geometry": {"type": "Polygon", "coordinates": [ring(origin, size)]}
    })
}

pub fn square(
    level: AdminLevel,
    name_en: &str,
    pcode: &str,
    origin: (f64, f64),
    size: f64,
) -> Value {
    region(level, name_en, name_en, pcode, origin, size)
}

/// Square with a centred square hole of side `hole`
pub fn square_with_hole(
    level: AdminLevel,
    name_en: &str,
    pcode: &str,
    (lat, lng): (f64, f64),
    size: f64,
    hole: f64,
) -> Value {
    let inset = (size - hole) / 2.0;
    json!({
        "type": "Feature",
        "properties": properties(level, name_en, name_en, pcode),
        "geometry": {
            "type": "Polygon",
            "coordinates": [ring((lat, lng), size), ring((lat + inset, lng + inset), hole)]
        }
    })
}

pub fn collection(features: &[Value]) -> String {
    json!({
        "type": "FeatureCollection",
        "name": "fixture",
        "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:OGC:1.3:CRS84"}},
        "features": features
    })
    .to_string()
}

/// A small Thailand: Bangkok and Nakhon Ratchasima with a few districts.
///
/// Accuracy 1 has every level; accuracy 2 only has provinces. Phra Nakhon
/// (TH1001) has no tambon dataset.
pub fn thailand() -> MemoryRepository {
    use AdminLevel::{Amphoe, Province, Tambon};

    let provinces = collection(&[
        region(Province, "Bangkok", "กรุงเทพมหานคร", "TH10", (13.5, 100.3), 0.5),
        region(Province, "Nakhon Ratchasima", "นครราชสีมา", "TH30", (14.5, 101.5), 1.5),
    ]);

    MemoryRepository::new()
        .with(DatasetKey::province(1), provinces.clone())
        .with(DatasetKey::province(2), provinces)
        .with(
            DatasetKey::amphoe(1, "TH10"),
            collection(&[
                region(Amphoe, "Phra Nakhon", "พระนคร", "TH1001", (13.75, 100.49), 0.02),
                region(Amphoe, "Pathum Wan", "ปทุมวัน", "TH1007", (13.73, 100.51), 0.04),
            ]),
        )
        .with(
            DatasetKey::amphoe(1, "TH30"),
            collection(&[region(Amphoe, "Bua Yai", "บัวใหญ่", "TH3012", (15.5, 102.2), 0.2)]),
        )
        .with(
            DatasetKey::tambon(1, "TH1007"),
            collection(&[region(
                Tambon,
                "Lumphini",
                "ลุมพินี",
                "TH100704",
                (13.73, 100.53),
                0.015,
            )]),
        )
        .with(
            DatasetKey::tambon(1, "TH3012"),
            collection(&[
                region(Tambon, "Bua Yai", "บัวใหญ่", "TH301201", (15.5, 102.2), 0.05),
                region(Tambon, "Huai Yang", "ห้วยยาง", "TH301203", (15.6, 102.25), 0.05),
            ]),
        )
}
