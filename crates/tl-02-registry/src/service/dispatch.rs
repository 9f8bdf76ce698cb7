//! # Transaction Dispatch
//!
//! ```text
//! TransactionRequest
//!   ├─ AMALGAMATE_PARCELS ──→ load constituents ──→ registry_ops::amalgamate
//!   └─ other tags ──→ load target ──→ admission ──→ parent gate (units)
//!                      ──→ tribal approval (all tags) ──→ endowment bar (ownership changes)
//!                      ──→ workflows::apply
//! ──→ stage target + minted assets ──→ TransactionExecuted
//! ```
//!
//! All writes go to the [`StagedLedger`]; the caller commits.

use super::staging::StagedLedger;
use crate::config::RegistryConfig;
use crate::domain::errors::RegistryError;
use crate::domain::lifecycle;
use crate::domain::registry_ops;
use crate::domain::workflows::{self, AmalgamationPayload, TransactionRequest, Workflow};
use crate::events::RegistryEvent;
use crate::ports::outbound::LedgerStore;
use shared_types::{PaymentStatus, Timestamp};
use tl_01_validators::compliance;
use tracing::{info, warn};

fn ensure_unused<L: LedgerStore + ?Sized>(
    staged: &mut StagedLedger<'_, L>,
    asset_id: &str,
) -> Result<(), RegistryError> {
    if staged.exists(asset_id)? {
        return Err(RegistryError::AssetExists(asset_id.to_string()));
    }
    Ok(())
}

/// Units follow their parent parcel: anything but a FREE parent blocks them.
pub(crate) fn ensure_parent_free<L: LedgerStore + ?Sized>(
    staged: &mut StagedLedger<'_, L>,
    parent_id: &str,
) -> Result<(), RegistryError> {
    let parent = staged.load_asset(parent_id)?;
    if !parent.is_free() {
        return Err(RegistryError::ParentNotFree {
            parent_id: parent.asset_id,
            status: parent.status,
        });
    }
    Ok(())
}

/// Marks the escrow of a dropped two-phase transfer as failed.
pub(crate) fn fail_escrow<L: LedgerStore + ?Sized>(
    staged: &mut StagedLedger<'_, L>,
    asset_id: &str,
    utr: &str,
) -> Result<(), RegistryError> {
    if staged.settle_escrow(utr, PaymentStatus::Failed)?.is_some() {
        warn!(asset_id, utr, "Pending transfer aborted; escrow payment marked FAILED");
    }
    Ok(())
}

/// Runs one `executeTransaction` call against the staged ledger.
///
/// Returns the ids of every asset written, target (or merged asset) first.
pub fn execute<L: LedgerStore + ?Sized>(
    staged: &mut StagedLedger<'_, L>,
    request: TransactionRequest,
    now: Timestamp,
    config: &RegistryConfig,
) -> Result<Vec<String>, RegistryError> {
    let tag = request.workflow.tag();
    let TransactionRequest {
        asset_id,
        approval_ref,
        evidence_ref,
        workflow,
    } = request;

    if let Workflow::AmalgamateParcels(payload) = workflow {
        return amalgamate(staged, payload, approval_ref, evidence_ref, now, config);
    }

    let asset_id =
        asset_id.ok_or_else(|| RegistryError::InvalidRequest(format!("{tag} requires parcelId")))?;
    let mut asset = staged.load_asset(&asset_id)?;
    lifecycle::admit(&asset, tag)?;

    if let Some(parent_id) = asset.parent_id().map(str::to_string) {
        ensure_parent_free(staged, &parent_id)?;
    }
    compliance::validate_tribal_approval(&asset, approval_ref.as_deref())?;
    if tag.changes_ownership() {
        compliance::validate_endowment(&asset)?;
    }

    match &workflow {
        Workflow::Partition(partition) => {
            for sub in &partition.sub_parcels {
                ensure_unused(staged, &sub.id)?;
            }
        }
        Workflow::FinalizePartition(finalize) => {
            for id in &finalize.new_parcels {
                if !staged.exists(id)? {
                    return Err(RegistryError::AssetNotFound(id.clone()));
                }
            }
        }
        _ => {}
    }

    let previous = asset.status;
    let outcome = workflows::apply(&mut asset, workflow, now, config)?;

    if let Some(aborted) = &outcome.aborted_transfer {
        fail_escrow(staged, &asset.asset_id, &aborted.utr)?;
    }

    staged.stage_asset(&asset)?;
    let mut written = vec![asset.asset_id.clone()];
    for child in &outcome.minted {
        staged.stage_asset(child)?;
        written.push(child.asset_id.clone());
    }
    for event in outcome.events {
        staged.emit(event);
    }
    staged.emit(RegistryEvent::TransactionExecuted {
        tx_type: tag.to_string(),
        asset_id: asset.asset_id.clone(),
        evidence_ref,
        timestamp: now,
    });

    info!(
        workflow = %tag,
        asset_id = %asset.asset_id,
        from = %previous,
        status = %asset.status,
        minted = outcome.minted.len(),
        "Workflow applied"
    );
    Ok(written)
}

fn amalgamate<L: LedgerStore + ?Sized>(
    staged: &mut StagedLedger<'_, L>,
    payload: AmalgamationPayload,
    approval_ref: Option<String>,
    evidence_ref: String,
    now: Timestamp,
    config: &RegistryConfig,
) -> Result<Vec<String>, RegistryError> {
    ensure_unused(staged, &payload.new_parcel_id)?;
    let mut constituents = payload
        .constituent_parcel_ids
        .iter()
        .map(|id| staged.load_asset(id))
        .collect::<Result<Vec<_>, _>>()?;
    for constituent in &constituents {
        compliance::validate_tribal_approval(constituent, approval_ref.as_deref())?;
    }

    let merged = registry_ops::amalgamate(
        &mut constituents,
        &payload.new_parcel_id,
        payload.new_geo_json.map(Into::into),
        config,
    )?;

    staged.stage_asset(&merged)?;
    let mut written = vec![merged.asset_id.clone()];
    for constituent in &constituents {
        staged.stage_asset(constituent)?;
        written.push(constituent.asset_id.clone());
    }
    staged.emit(RegistryEvent::TransactionExecuted {
        tx_type: workflows::WorkflowTag::AmalgamateParcels.to_string(),
        asset_id: merged.asset_id.clone(),
        evidence_ref,
        timestamp: now,
    });

    info!(
        asset_id = %merged.asset_id,
        constituents = ?payload.constituent_parcel_ids,
        area_hectares = merged.area_hectares,
        "Parcels amalgamated"
    );
    Ok(written)
}
