//! # Validators Subsystem (TL-01)
//!
//! Stateless gatekeepers consulted by the registry before any mutation is
//! staged. Every function here is pure: no I/O, no clock, no persistent state.
//!
//! ## Validators
//!
//! | Module | Checks | Error |
//! |--------|--------|-------|
//! | [`format`] | ULPIN, case record (CNR), RERA number, content hash, legacy ids | [`FormatError`] |
//! | [`spatial`] | Ring topology, shoelace area, claimed-vs-computed area | [`SpatialError`] |
//! | [`zoning`] | Centroid inside restricted bounding boxes | [`ComplianceError`] |
//! | [`compliance`] | Endowment lock, tribal approval, strata occupancy, conservation | [`ComplianceError`] |
//!
//! ## Area Projection
//!
//! ```text
//! [lon, lat] (degrees) ──× LON_TO_M, × LAT_TO_M──→ [x, y] (metres) ──shoelace──→ m²
//! ```
//!
//! The scaling factors are fixed at a reference latitude, which is accurate
//! enough for cadastral plots a few hundred metres across.

pub mod compliance;
pub mod errors;
pub mod format;
pub mod spatial;
pub mod zoning;

pub use errors::{ComplianceError, FormatError, SpatialError};
