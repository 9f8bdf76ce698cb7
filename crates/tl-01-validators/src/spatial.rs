//! # Spatial Validator
//!
//! Polygon topology, shoelace area and claimed-area reconciliation.
//!
//! Coordinates are `[lon, lat]` in degrees. They are projected to metres with
//! fixed linear scale factors taken at [`REFERENCE_LATITUDE_DEG`].

use crate::errors::SpatialError;
use shared_types::{SpatialRecord, SurveyMethod};

/// Metres per degree of latitude.
pub const LAT_TO_M: f64 = 110_574.0;
/// Metres per degree of longitude at the equator.
pub const LON_TO_M_EQUATOR: f64 = 111_320.0;
/// Latitude at which the longitude scale is evaluated.
pub const REFERENCE_LATITUDE_DEG: f64 = 18.5204;
/// Maximum per-axis gap between first and last vertex of a closed ring.
pub const CLOSURE_EPSILON: f64 = 1e-7;
/// Three distinct vertices plus the closing vertex.
pub const MIN_RING_VERTICES: usize = 4;
/// Default claimed-vs-computed area tolerance.
pub const DEFAULT_TOLERANCE_PERCENT: f64 = 5.0;

/// Metres per degree of longitude at the reference latitude.
pub fn lon_to_m() -> f64 {
    LON_TO_M_EQUATOR * REFERENCE_LATITUDE_DEG.to_radians().cos()
}

/// Checks that the ring is a closed linear ring with enough vertices.
pub fn validate_topology(ring: &[[f64; 2]]) -> Result<(), SpatialError> {
    if ring.len() < MIN_RING_VERTICES {
        return Err(SpatialError::TooFewVertices { count: ring.len() });
    }
    if let Some(index) = ring
        .iter()
        .position(|p| !p[0].is_finite() || !p[1].is_finite())
    {
        return Err(SpatialError::NonFiniteCoordinate { index });
    }

    let first = ring[0];
    let last = ring[ring.len() - 1];
    let closed = (first[0] - last[0]).abs() < CLOSURE_EPSILON
        && (first[1] - last[1]).abs() < CLOSURE_EPSILON;
    if !closed {
        return Err(SpatialError::NotClosed { first, last });
    }
    Ok(())
}

/// Shoelace area of the ring in square metres.
pub fn calculate_area_sqm(ring: &[[f64; 2]]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let lon_scale = lon_to_m();

    let twice_area: f64 = (0..n)
        .map(|i| {
            let [x1, y1] = ring[i];
            let [x2, y2] = ring[(i + 1) % n];
            (x1 * lon_scale) * (y2 * LAT_TO_M) - (x2 * lon_scale) * (y1 * LAT_TO_M)
        })
        .sum();

    twice_area.abs() / 2.0
}

/// Mean of the distinct vertices (closing vertex excluded), `[lon, lat]`.
pub fn centroid(ring: &[[f64; 2]]) -> [f64; 2] {
    let distinct = match ring.len() {
        0 => return [0.0, 0.0],
        1 => ring,
        n => &ring[..n - 1],
    };
    let count = distinct.len() as f64;
    let (sx, sy) = distinct
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p[0], sy + p[1]));
    [sx / count, sy / count]
}

/// Fails when `claimed` deviates from `calculated` by more than `tolerance_percent`.
pub fn validate_area_match(
    calculated: f64,
    claimed: f64,
    tolerance_percent: f64,
) -> Result<(), SpatialError> {
    let diff = (calculated - claimed).abs();
    let allowed = calculated * tolerance_percent / 100.0;
    if diff > allowed {
        return Err(SpatialError::AreaMismatch {
            calculated,
            claimed,
            tolerance_percent,
        });
    }
    Ok(())
}

/// Validates a ring and derives its structured record.
pub fn build_record(
    ring: Vec<[f64; 2]>,
    survey_method: SurveyMethod,
    accuracy_margin_m: f64,
) -> Result<SpatialRecord, SpatialError> {
    validate_topology(&ring)?;
    Ok(SpatialRecord {
        calculated_area_sqm: calculate_area_sqm(&ring),
        centroid: centroid(&ring),
        ring,
        survey_method,
        accuracy_margin_m,
    })
}
