//! First-match point-in-polygon scan over a feature stream.

use tracing::debug;

use super::{AdminBoundary, FeatureStream};
use crate::error::Result;
use crate::models::{AdminLevel, AdminUnit, Coordinate};

/// Scan `stream` for the first feature containing `point`.
///
/// Features are tested in file order. Each one is first checked against
/// its bounding box; only features whose box holds the point get the exact
/// polygon test. The stream is closed as soon as a feature matches or an
/// error occurs, without reading the rest of the dataset. An exhausted
/// stream yields `Ok(None)`.
pub async fn scan(
    mut stream: FeatureStream,
    level: AdminLevel,
    point: &Coordinate,
) -> Result<Option<AdminUnit>> {
    let outcome = scan_features(&mut stream, level, point).await;
    stream.close().await;
    outcome
}

async fn scan_features(
    stream: &mut FeatureStream,
    level: AdminLevel,
    point: &Coordinate,
) -> Result<Option<AdminUnit>> {
    let mut scanned = 0usize;
    let mut exact_tests = 0usize;

    while let Some(feature) = stream.next().await {
        scanned += 1;

        let Some(boundary) = AdminBoundary::from_feature(feature?, stream.dataset())? else {
            debug!("Skipping non-areal feature #{} in {}", scanned, stream.dataset());
            continue;
        };

        if !boundary.bbox_contains(point) {
            continue;
        }

        exact_tests += 1;
        if boundary.contains(point) {
            let unit = boundary.to_unit(level, stream.dataset())?;
            debug!(
                "PIP {} match at ({}, {}): {} ({}) after {} features, {} exact tests",
                level,
                point.lat(),
                point.lng(),
                unit.name_en,
                unit.pcode,
                scanned,
                exact_tests
            );
            return Ok(Some(unit));
        }
    }

    debug!(
        "PIP {} miss at ({}, {}): scanned {} features in {}, {} exact tests",
        level,
        point.lat(),
        point.lng(),
        scanned,
        stream.dataset(),
        exact_tests
    );
    Ok(None)
}
