//! Owner-share arithmetic on a [`Title`].
//!
//! Every function computes the new owner list on a copy and only replaces the
//! title once the 100% invariant holds, so a rejected call leaves the title
//! untouched.

use crate::domain::errors::RegistryError;
use serde::{Deserialize, Serialize};
use shared_types::{share_total_within, OwnerShare, Title};

/// Shares at or below this are treated as zero.
pub const SHARE_EPSILON: f64 = 1e-9;

/// An heir and the percentage they inherit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeirShare {
    pub id: String,
    pub share: f64,
}

fn validate_pct(pct: f64) -> Result<(), RegistryError> {
    if !pct.is_finite() || pct <= 0.0 || pct > 100.0 + SHARE_EPSILON {
        return Err(RegistryError::InvalidShare(pct));
    }
    Ok(())
}

fn ensure_balanced(owners: &[OwnerShare], tolerance: f64) -> Result<(), RegistryError> {
    let total: f64 = owners.iter().map(|o| o.share_percentage).sum();
    if !share_total_within(total, tolerance) {
        return Err(RegistryError::ShareSumViolation { total });
    }
    Ok(())
}

/// Checks that `seller` may dispose of `pct` percent of the title.
pub fn check_disposal(title: &Title, seller: &str, pct: f64) -> Result<f64, RegistryError> {
    validate_pct(pct)?;
    let owned = title
        .share_of(seller)
        .ok_or_else(|| RegistryError::NotAnOwner {
            asset_id: title.asset_id.clone(),
            owner_id: seller.to_string(),
        })?;
    if pct > owned + SHARE_EPSILON {
        return Err(RegistryError::InsufficientShare {
            owned,
            requested: pct,
        });
    }
    Ok(owned)
}

/// Owner list after moving `pct` from `seller` to `buyer`.
pub fn preview_move(
    title: &Title,
    seller: &str,
    buyer: &str,
    pct: f64,
    tolerance: f64,
) -> Result<Vec<OwnerShare>, RegistryError> {
    check_disposal(title, seller, pct)?;

    let mut owners = title.owners.clone();
    if let Some(entry) = owners.iter_mut().find(|o| o.owner_id == seller) {
        entry.share_percentage -= pct;
    }
    owners.retain(|o| o.share_percentage > SHARE_EPSILON);

    match owners.iter_mut().find(|o| o.owner_id == buyer) {
        Some(entry) => entry.share_percentage += pct,
        None => owners.push(OwnerShare::new(buyer, pct)),
    }

    ensure_balanced(&owners, tolerance)?;
    Ok(owners)
}

/// Moves `pct` from `seller` to `buyer`, removing a seller left with nothing.
pub fn move_share(
    title: &mut Title,
    seller: &str,
    buyer: &str,
    pct: f64,
    tolerance: f64,
) -> Result<(), RegistryError> {
    title.owners = preview_move(title, seller, buyer, pct, tolerance)?;
    Ok(())
}

/// Replaces the owners with `heirs`, which must sum to 100.
pub fn distribute(title: &mut Title, heirs: &[HeirShare], tolerance: f64) -> Result<(), RegistryError> {
    if heirs.is_empty() {
        return Err(RegistryError::InvalidRequest("at least one heir is required".into()));
    }
    let mut owners: Vec<OwnerShare> = Vec::with_capacity(heirs.len());
    for heir in heirs {
        validate_pct(heir.share)?;
        if owners.iter().any(|o| o.owner_id == heir.id) {
            return Err(RegistryError::InvalidRequest(format!(
                "heir {} listed more than once",
                heir.id
            )));
        }
        owners.push(OwnerShare::new(heir.id.clone(), heir.share));
    }
    ensure_balanced(&owners, tolerance)?;
    title.owners = owners;
    Ok(())
}

/// Hands the whole title to a single owner.
pub fn reassign_sole(title: &mut Title, owner_id: &str) {
    title.owners = vec![OwnerShare::new(owner_id, 100.0)];
}
