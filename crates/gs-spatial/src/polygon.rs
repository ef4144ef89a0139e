//! Bounding rectangles and buffered query polygons.

use gs_core::{Distance, GeoPoint};

use crate::{SpatialError, SpatialResult};

/// Metres per degree of latitude (and of longitude at the equator); the
/// flat-earth conversion used for query windows and mesh spacing.
pub const DEGREE_TO_METER: f64 = 111_139.0;

/// Axis-aligned bounding rectangle of a point set as `(min, max)` corners.
pub fn bounding_rect(points: &[GeoPoint]) -> SpatialResult<(GeoPoint, GeoPoint)> {
    if points.is_empty() {
        return Err(SpatialError::InvalidInput(
            "bounding rectangle of an empty point set".into(),
        ));
    }
    let mut min = points[0];
    let mut max = points[0];
    for p in &points[1..] {
        min.lon = min.lon.min(p.lon);
        min.lat = min.lat.min(p.lat);
        max.lon = max.lon.max(p.lon);
        max.lat = max.lat.max(p.lat);
    }
    Ok((min, max))
}

/// Closed ring (5 points, first == last) of the bounding rectangle of
/// `points` inflated by `buffer` on every side.
///
/// The buffer converts to degrees via [`DEGREE_TO_METER`] — an accepted
/// approximation for road-network query windows.
pub fn bounding_polygon(
    points: &[GeoPoint],
    buffer: Distance,
) -> SpatialResult<Vec<GeoPoint>> {
    let (mut min, mut max) = bounding_rect(points)?;
    let pad = buffer.as_meters() / DEGREE_TO_METER;
    min.lon -= pad;
    min.lat -= pad;
    max.lon += pad;
    max.lat += pad;

    Ok(vec![
        GeoPoint::new(min.lon, min.lat),
        GeoPoint::new(max.lon, min.lat),
        GeoPoint::new(max.lon, max.lat),
        GeoPoint::new(min.lon, max.lat),
        GeoPoint::new(min.lon, min.lat),
    ])
}
