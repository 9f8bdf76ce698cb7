//! # Admin / Compliance Validator
//!
//! Protected-land and sector rules that gate registry workflows:
//!
//! - Religious endowments are inalienable, including by succession.
//! - Tribal or scheduled-category land needs an explicit approval reference
//!   for every workflow, not only sales.
//! - A strata Unit cannot be sold without an occupancy certificate, and any
//!   RERA number it carries must be well formed.
//! - Forest or conservation-zone land cannot change use, and no land can be
//!   converted into forest through this path.

use crate::errors::ComplianceError;
use crate::format;
use shared_types::{Asset, LandUse};

/// Religious endowments cannot change hands by any route.
pub fn validate_endowment(asset: &Asset) -> Result<(), ComplianceError> {
    if asset.protection.religious_endowment {
        return Err(ComplianceError::EndowmentLocked {
            asset_id: asset.asset_id.clone(),
        });
    }
    Ok(())
}

/// Tribal or scheduled land needs a non-blank approval reference for any
/// workflow that touches it.
pub fn validate_tribal_approval(
    asset: &Asset,
    approval_ref: Option<&str>,
) -> Result<(), ComplianceError> {
    let approved = approval_ref.is_some_and(|r| !r.trim().is_empty());
    if asset.is_tribal() && !approved {
        return Err(ComplianceError::TribalApprovalRequired {
            asset_id: asset.asset_id.clone(),
        });
    }
    Ok(())
}

/// Gate applied to every workflow that moves ownership.
pub fn validate_transfer(asset: &Asset, approval_ref: Option<&str>) -> Result<(), ComplianceError> {
    validate_endowment(asset)?;
    validate_tribal_approval(asset, approval_ref)
}

/// Sale of a strata Unit. Parcels pass unchecked.
pub fn validate_unit_sale(asset: &Asset) -> Result<(), ComplianceError> {
    let Some(unit) = asset.unit() else {
        return Ok(());
    };

    let has_oc = unit
        .occupancy_certificate_hash
        .as_deref()
        .is_some_and(|h| !h.is_empty());
    if !has_oc {
        return Err(ComplianceError::MissingOccupancyCertificate {
            asset_id: asset.asset_id.clone(),
        });
    }

    if let Some(rera) = unit.rera_registration.as_deref() {
        format::validate_rera(rera)?;
    }
    Ok(())
}

/// Land-use conversion.
pub fn validate_conversion(asset: &Asset, new_use: LandUse) -> Result<(), ComplianceError> {
    if asset.is_conservation_land() || new_use == LandUse::Forest {
        return Err(ComplianceError::ProtectedConversion {
            asset_id: asset.asset_id.clone(),
        });
    }
    Ok(())
}
