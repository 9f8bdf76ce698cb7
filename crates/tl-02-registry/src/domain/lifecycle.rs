//! # Asset Lifecycle State Machine
//!
//! Admission control and the status derivations triggered by register changes.
//!
//! ## Admission
//!
//! | Status | Admitted workflows |
//! |--------|-------------------|
//! | `FREE` | all |
//! | `RETIRED` | none |
//! | `LOCKED_FOR_SUCCESSION` | allow-list + `INHERITANCE` |
//! | any other | `RESOLVE_DISPUTE`, `UNLOCK_CHARGE`, `APPROVE_MUTATION`, `INTIMATE_DEATH` |
//!
//! ## Derivations
//!
//! | Event | New status |
//! |-------|-----------|
//! | blocking charge added | `LOCKED` |
//! | dispute added | `LITIGATION` |
//! | charge released | unlocked if from `LOCKED`/`LITIGATION` and nothing blocks, else unchanged |
//! | dispute resolved | from `LOCKED`/`LITIGATION`: unlocked if nothing blocks, `LOCKED` if a blocking charge remains, else unchanged |
//!
//! "Unlocked" is `PENDING_SCRUTINY` while a single-phase mutation is still
//! awaiting approval, otherwise `FREE`.

use crate::domain::errors::RegistryError;
use crate::domain::workflows::WorkflowTag;
use shared_types::{
    charge_id, dispute_id, Asset, AssetStatus, Charge, ChargeType, Dispute, DisputeStatus,
    DisputeType, Timestamp,
};

/// Rejects `tag` unless the asset's status admits it.
pub fn admit(asset: &Asset, tag: WorkflowTag) -> Result<(), RegistryError> {
    if asset.is_retired() {
        return Err(RegistryError::Retired(asset.asset_id.clone()));
    }
    if asset.is_free() || tag.admitted_in(asset.status) {
        return Ok(());
    }
    Err(RegistryError::InvalidState {
        asset_id: asset.asset_id.clone(),
        status: asset.status,
        operation: tag.to_string(),
    })
}

/// Rejects any mutation of a retired asset.
pub fn ensure_mutable(asset: &Asset) -> Result<(), RegistryError> {
    if asset.is_retired() {
        return Err(RegistryError::Retired(asset.asset_id.clone()));
    }
    Ok(())
}

/// Requires the asset to be FREE for `operation`.
pub fn ensure_free(asset: &Asset, operation: &str) -> Result<(), RegistryError> {
    ensure_mutable(asset)?;
    if !asset.is_free() {
        return Err(RegistryError::InvalidState {
            asset_id: asset.asset_id.clone(),
            status: asset.status,
            operation: operation.to_string(),
        });
    }
    Ok(())
}

/// Returns true if the asset carries anything that keeps it out of FREE.
pub fn has_blockers(asset: &Asset) -> bool {
    asset.blocking_charge_count() > 0 || asset.pending_dispute_count() > 0
}

/// Status an asset settles into once a temporary lock ends.
pub fn settled_status(asset: &Asset) -> AssetStatus {
    if asset.pending_dispute_count() > 0 {
        AssetStatus::Litigation
    } else if asset.blocking_charge_count() > 0 {
        AssetStatus::Locked
    } else if asset.mutation_requested_at.is_some() {
        AssetStatus::PendingScrutiny
    } else {
        AssetStatus::Free
    }
}

/// Appends a charge and derives the new status. Returns the charge id.
pub fn record_charge(
    asset: &mut Asset,
    charge_type: ChargeType,
    holder: &str,
    amount: f64,
    now: Timestamp,
) -> String {
    let asset_id = asset.asset_id.clone();
    let id = asset
        .charges
        .append(|seq| Charge {
            charge_id: charge_id(seq),
            asset_id,
            charge_type,
            holder: holder.to_string(),
            amount,
            active: true,
            recorded_at: now,
        })
        .charge_id
        .clone();

    if charge_type.is_blocking() {
        asset.status = AssetStatus::Locked;
    }
    id
}

/// Appends a pending dispute and moves the asset into litigation.
pub fn record_dispute(
    asset: &mut Asset,
    dispute_type: DisputeType,
    court_id: &str,
    case_number: Option<String>,
    now: Timestamp,
) -> String {
    let asset_id = asset.asset_id.clone();
    let id = asset
        .disputes
        .append(|seq| Dispute {
            dispute_id: dispute_id(seq),
            asset_id,
            court_id: court_id.to_string(),
            dispute_type,
            case_number,
            status: DisputeStatus::Pending,
            recorded_at: now,
            resolution: None,
        })
        .dispute_id
        .clone();

    asset.status = AssetStatus::Litigation;
    id
}

/// Deactivates a charge and unlocks the asset if nothing else blocks it.
pub fn release_charge(asset: &mut Asset, charge_id: &str) -> Result<(), RegistryError> {
    let charge = asset
        .charges
        .get_mut(charge_id)
        .ok_or_else(|| RegistryError::ChargeNotFound {
            asset_id: asset.asset_id.clone(),
            charge_id: charge_id.to_string(),
        })?;
    if !charge.active {
        return Err(RegistryError::ChargeInactive(charge_id.to_string()));
    }
    charge.active = false;

    let locked = matches!(asset.status, AssetStatus::Locked | AssetStatus::Litigation);
    if locked && !has_blockers(asset) {
        asset.status = settled_status(asset);
    }
    Ok(())
}

/// Resolves a pending dispute and re-derives the lock status.
pub fn resolve_dispute(
    asset: &mut Asset,
    dispute_id: &str,
    resolution: Option<String>,
) -> Result<(), RegistryError> {
    let dispute = asset
        .disputes
        .get_mut(dispute_id)
        .ok_or_else(|| RegistryError::DisputeNotFound {
            asset_id: asset.asset_id.clone(),
            dispute_id: dispute_id.to_string(),
        })?;
    if dispute.status != DisputeStatus::Pending {
        return Err(RegistryError::DisputeAlreadyResolved(dispute_id.to_string()));
    }
    dispute.status = DisputeStatus::Resolved;
    dispute.resolution = resolution;

    if matches!(asset.status, AssetStatus::Locked | AssetStatus::Litigation) {
        if !has_blockers(asset) {
            asset.status = settled_status(asset);
        } else if asset.blocking_charge_count() > 0 {
            asset.status = AssetStatus::Locked;
        }
    }
    Ok(())
}
