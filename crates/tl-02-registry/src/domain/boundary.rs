//! Boundary inputs and their validation into stored [`Geometry`].

use crate::config::RegistryConfig;
use crate::domain::errors::RegistryError;
use serde::{Deserialize, Serialize};
use shared_types::{Geometry, SurveyMethod};
use tl_01_validators::{spatial, zoning};
use tracing::warn;

/// Boundary as supplied by a caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum BoundaryInput {
    /// Opaque polygon string, stored as-is.
    Raw { wkt: String },
    /// Exterior ring as `[lon, lat]` pairs.
    Ring {
        ring: Vec<[f64; 2]>,
        #[serde(default)]
        claimed_area_sqm: Option<f64>,
        #[serde(default)]
        survey_method: SurveyMethod,
        #[serde(default)]
        accuracy_margin_m: f64,
    },
}

impl BoundaryInput {
    pub fn raw(wkt: impl Into<String>) -> Self {
        BoundaryInput::Raw { wkt: wkt.into() }
    }
}

/// Boundary field of a request payload: a bare polygon string or a tagged
/// [`BoundaryInput`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeoInput {
    Wkt(String),
    Boundary(BoundaryInput),
}

impl From<GeoInput> for BoundaryInput {
    fn from(input: GeoInput) -> Self {
        match input {
            GeoInput::Wkt(wkt) => BoundaryInput::Raw { wkt },
            GeoInput::Boundary(boundary) => boundary,
        }
    }
}

impl From<BoundaryInput> for GeoInput {
    fn from(input: BoundaryInput) -> Self {
        GeoInput::Boundary(input)
    }
}

impl From<String> for GeoInput {
    fn from(wkt: String) -> Self {
        GeoInput::Wkt(wkt)
    }
}

impl From<&str> for GeoInput {
    fn from(wkt: &str) -> Self {
        GeoInput::Wkt(wkt.to_string())
    }
}

/// A validated boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBoundary {
    pub geometry: Geometry,
    /// Computed area, when the boundary was structured.
    pub computed_hectares: Option<f64>,
}

/// Validates `input` against topology, the claimed area and restricted zones.
///
/// `claimed_hectares` is reconciled against the computed area when the ring
/// does not carry its own claimed area.
pub fn resolve(
    input: BoundaryInput,
    claimed_hectares: Option<f64>,
    config: &RegistryConfig,
) -> Result<ResolvedBoundary, RegistryError> {
    match input {
        BoundaryInput::Raw { wkt } => Ok(ResolvedBoundary {
            geometry: Geometry::Raw { wkt },
            computed_hectares: None,
        }),
        BoundaryInput::Ring {
            ring,
            claimed_area_sqm,
            survey_method,
            accuracy_margin_m,
        } => {
            let record = spatial::build_record(ring, survey_method, accuracy_margin_m)?;

            let claimed = claimed_area_sqm.or(claimed_hectares.map(|ha| ha * 10_000.0));
            if let Some(claimed) = claimed {
                spatial::validate_area_match(
                    record.calculated_area_sqm,
                    claimed,
                    config.spatial_tolerance_percent,
                )?;
            }

            for zone in zoning::verify_zoning(record.centroid, &config.restricted_zones)? {
                warn!(
                    zone = %zone.name,
                    centroid = ?record.centroid,
                    "Parcel lies within a restricted zone; land use and construction may be limited"
                );
            }

            Ok(ResolvedBoundary {
                computed_hectares: Some(record.calculated_area_sqm / 10_000.0),
                geometry: Geometry::Spatial(record),
            })
        }
    }
}
