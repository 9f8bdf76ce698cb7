//! # Format Validator
//!
//! Fixed-pattern identifier checks and the hectare to local-unit conversion.
//!
//! Patterns are compiled once and cached in `OnceLock` statics.

use crate::errors::FormatError;
use regex::Regex;
use shared_types::LocalUnit;
use std::sync::OnceLock;

/// Acres per hectare.
pub const ACRES_PER_HECTARE: f64 = 2.47105;
/// Gunthas per acre.
pub const GUNTHAS_PER_ACRE: f64 = 40.0;
/// Cents per acre.
pub const CENTS_PER_ACRE: f64 = 100.0;
/// Bighas per hectare (UP standard).
pub const BIGHAS_PER_HECTARE: f64 = 3.95;

/// Accepted shape of an asset key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetIdKind {
    /// 14-digit ULPIN.
    Ulpin,
    /// Pre-ULPIN identifier kept for backward compatibility.
    Legacy,
}

struct Patterns {
    ulpin: Regex,
    cnr: Regex,
    rera: Regex,
    content_hash: Regex,
    legacy_prefixed: Regex,
    legacy_district: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| Patterns {
        ulpin: Regex::new(r"^\d{14}$").expect("valid ULPIN regex"),
        cnr: Regex::new(r"^[a-zA-Z0-9]{16}$").expect("valid CNR regex"),
        rera: Regex::new(r"^P[A-Z0-9]{10,12}$").expect("valid RERA regex"),
        content_hash: Regex::new(r"^Qm[1-9A-HJ-NP-Za-km-z]{44}$").expect("valid IPFS regex"),
        legacy_prefixed: Regex::new(r"^(PARCEL_|TEST|P)[A-Z0-9_]*$")
            .expect("valid legacy prefix regex"),
        legacy_district: Regex::new(r"^[A-Z]{2}[0-9]{2}[A-Z0-9]{6,}$")
            .expect("valid legacy district regex"),
    })
}

/// 14-digit Unique Land Parcel Identification Number.
pub fn validate_ulpin(ulpin: &str) -> Result<(), FormatError> {
    if patterns().ulpin.is_match(ulpin) {
        Ok(())
    } else {
        Err(FormatError::InvalidUlpin(ulpin.to_string()))
    }
}

/// 16-character e-Courts case number record.
pub fn validate_cnr(cnr: &str) -> Result<(), FormatError> {
    if patterns().cnr.is_match(cnr) {
        Ok(())
    } else {
        Err(FormatError::InvalidCaseNumber(cnr.to_string()))
    }
}

/// RERA project registration number, e.g. `P52100012345`.
pub fn validate_rera(rera: &str) -> Result<(), FormatError> {
    if patterns().rera.is_match(rera) {
        Ok(())
    } else {
        Err(FormatError::InvalidRera(rera.to_string()))
    }
}

/// CIDv0 content hash (`Qm` + 44 base58 characters).
pub fn validate_content_hash(hash: &str) -> Result<(), FormatError> {
    if patterns().content_hash.is_match(hash) {
        Ok(())
    } else {
        Err(FormatError::InvalidContentHash(hash.to_string()))
    }
}

/// Document hashes are free-form unless they claim to be content hashes.
pub fn validate_doc_hash(hash: &str) -> Result<(), FormatError> {
    if hash.starts_with("Qm") {
        validate_content_hash(hash)
    } else {
        Ok(())
    }
}

/// Returns true for the legacy key shapes still in circulation.
pub fn is_legacy_id(id: &str) -> bool {
    let p = patterns();
    p.legacy_prefixed.is_match(id) || p.legacy_district.is_match(id)
}

/// Validates a key chosen for a new asset.
pub fn validate_asset_id(id: &str, allow_legacy: bool) -> Result<AssetIdKind, FormatError> {
    if patterns().ulpin.is_match(id) {
        return Ok(AssetIdKind::Ulpin);
    }
    if allow_legacy && is_legacy_id(id) {
        return Ok(AssetIdKind::Legacy);
    }
    Err(FormatError::InvalidAssetId(id.to_string()))
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Converts a canonical hectare area to the given display unit.
pub fn calculate_local_unit(hectares: f64, unit: LocalUnit) -> f64 {
    let acres = hectares * ACRES_PER_HECTARE;
    match unit {
        LocalUnit::Hectare => hectares,
        LocalUnit::Acre => round_to(acres, 4),
        LocalUnit::Guntha => round_to(acres * GUNTHAS_PER_ACRE, 2),
        LocalUnit::Cent => round_to(acres * CENTS_PER_ACRE, 2),
        LocalUnit::Bigha => round_to(hectares * BIGHAS_PER_HECTARE, 2),
    }
}
