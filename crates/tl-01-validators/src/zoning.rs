//! Encroachment checks against restricted bounding-box zones.

use crate::errors::ComplianceError;
use serde::{Deserialize, Serialize};

/// What happens when a parcel centroid falls inside a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZoneSeverity {
    /// Reject the operation.
    Block,
    /// Allow, but report.
    Warn,
}

/// Axis-aligned restricted area, `[min_lon, min_lat, max_lon, max_lat]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestrictedZone {
    pub name: String,
    pub bbox: [f64; 4],
    pub severity: ZoneSeverity,
}

impl RestrictedZone {
    pub fn contains(&self, point: [f64; 2]) -> bool {
        let [min_x, min_y, max_x, max_y] = self.bbox;
        let [x, y] = point;
        x >= min_x && x <= max_x && y >= min_y && y <= max_y
    }
}

/// Zones every registry ships with: the Pune forest block and the NH48
/// highway buffer.
pub fn default_zones() -> Vec<RestrictedZone> {
    vec![
        RestrictedZone {
            name: "FOREST_DEPT_PUNE".into(),
            bbox: [73.00, 18.00, 73.01, 18.01],
            severity: ZoneSeverity::Block,
        },
        RestrictedZone {
            name: "HIGHWAY_BUFFER_NH48".into(),
            bbox: [73.80, 18.50, 73.82, 18.52],
            severity: ZoneSeverity::Warn,
        },
    ]
}

/// Checks a centroid against every zone.
///
/// Returns the `Warn` zones that matched; the first matching `Block` zone
/// fails the check.
pub fn verify_zoning<'a>(
    centroid: [f64; 2],
    zones: &'a [RestrictedZone],
) -> Result<Vec<&'a RestrictedZone>, ComplianceError> {
    let mut warnings = Vec::new();
    for zone in zones.iter().filter(|z| z.contains(centroid)) {
        match zone.severity {
            ZoneSeverity::Block => {
                return Err(ComplianceError::Encroachment {
                    zone: zone.name.clone(),
                })
            }
            ZoneSeverity::Warn => warnings.push(zone),
        }
    }
    Ok(warnings)
}
