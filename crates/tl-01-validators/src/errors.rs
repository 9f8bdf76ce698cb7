//! Error types for the validators.

use thiserror::Error;

/// Identifier syntax violations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("Invalid ULPIN Format. Must be 14 digits. Value: {0}")]
    InvalidUlpin(String),

    #[error("Invalid CNR Format. Must be 16 alphanumeric characters. Value: {0}")]
    InvalidCaseNumber(String),

    #[error("Invalid RERA Registration Format. Example: P52100012345. Value: {0}")]
    InvalidRera(String),

    #[error("Invalid IPFS Hash Format. Must start with Qm and be 46 chars. Value: {0}")]
    InvalidContentHash(String),

    #[error("Invalid asset identifier: {0} is neither a ULPIN nor an accepted legacy id")]
    InvalidAssetId(String),
}

/// Geometry violations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SpatialError {
    #[error("Invalid Geometry: Polygon must have at least 3 points + closing point (got {count})")]
    TooFewVertices { count: usize },

    #[error("Invalid Geometry: Polygon is not closed. First {first:?} != Last {last:?}")]
    NotClosed { first: [f64; 2], last: [f64; 2] },

    #[error("Invalid Geometry: non-finite coordinate at vertex {index}")]
    NonFiniteCoordinate { index: usize },

    #[error(
        "Spatial Mismatch: Calculated Area ({calculated:.2} sqm) differs from Claimed Area ({claimed:.2} sqm) by more than {tolerance_percent}%"
    )]
    AreaMismatch {
        calculated: f64,
        claimed: f64,
        tolerance_percent: f64,
    },
}

/// Administrative and protected-land rule breaches.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ComplianceError {
    #[error("Restricted: Wakf property {asset_id} is LOCKED_FOR_ENDOWMENT. Sale is prohibited.")]
    EndowmentLocked { asset_id: String },

    #[error("Restricted: Tribal Land transfer of {asset_id} requires District Collector (DC) Approval.")]
    TribalApprovalRequired { asset_id: String },

    #[error("RERA Compliance: Cannot Sell Strata Unit without Occupancy Certificate (OC). Unit: {asset_id}")]
    MissingOccupancyCertificate { asset_id: String },

    #[error("Restricted: Cannot convert FOREST or CRZ land ({asset_id}). Protected under Forest Conservation Act.")]
    ProtectedConversion { asset_id: String },

    #[error("ENCROACHMENT_DETECTED: Parcel overlaps with restricted zone {zone}. Transaction Blocked.")]
    Encroachment { zone: String },

    #[error(transparent)]
    Format(#[from] FormatError),
}
