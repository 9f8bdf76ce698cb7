//! # Workflow Catalogue
//!
//! `executeTransaction` receives a tag and an opaque JSON payload. Both are
//! decoded once, at the boundary, into a [`Workflow`] whose variants carry
//! only the fields their handler needs.
//!
//! | Tag | Payload | Effect on the target asset |
//! |-----|---------|----------------------------|
//! | `SALE` | [`SalePayload`] | buyer becomes sole owner, `PENDING_SCRUTINY`, timer starts |
//! | `PARTITION` | [`PartitionPayload`] | `RETIRED`, sole-owner children minted |
//! | `INHERITANCE` | [`InheritancePayload`] | owners replaced by heirs |
//! | `CONVERSION` | [`ConversionPayload`] | land use changed |
//! | `APPROVE_MUTATION` | none | `PENDING_SCRUTINY` → `FREE` once the timer elapsed |
//! | `REGISTER_ATS` | [`AtsPayload`] | `PENDING_ATS` |
//! | `INTIMATE_DEATH` | [`DeathIntimationPayload`] | `LOCKED_FOR_SUCCESSION` |
//! | `GIFT` | [`GiftPayload`] | donee becomes sole owner, `PENDING_SCRUTINY`, timer starts |
//! | `FINALIZE_PARTITION` | [`FinalizePartitionPayload`] | `RETIRED` |
//! | `AMALGAMATE_PARCELS` | [`AmalgamationPayload`] | multi-asset, see [`registry_ops::amalgamate`] |
//! | `RECTIFY_BOUNDARY` | [`RectifyBoundaryPayload`] | geometry (and ULPIN) replaced |
//! | `UNLOCK_CHARGE` | [`UnlockChargePayload`] | charge released, status re-derived |
//! | `RESOLVE_DISPUTE` | [`ResolveDisputePayload`] | dispute resolved, status re-derived |

use crate::config::RegistryConfig;
use crate::domain::boundary::GeoInput;
use crate::domain::errors::RegistryError;
use crate::domain::lifecycle;
use crate::domain::registry_ops::{self, SubParcel};
use crate::domain::title_ops::{self, HeirShare};
use crate::domain::transfer;
use crate::events::RegistryEvent;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{
    Asset, AssetStatus, LandUse, LastTransaction, PendingTransfer, StampDuty, Timestamp,
};
use std::fmt;
use std::str::FromStr;
use tl_01_validators::{compliance, format};

// =============================================================================
// TAGS
// =============================================================================

/// Workflow selector of `executeTransaction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowTag {
    Sale,
    Partition,
    Inheritance,
    Conversion,
    ApproveMutation,
    RegisterAts,
    IntimateDeath,
    Gift,
    FinalizePartition,
    AmalgamateParcels,
    RectifyBoundary,
    UnlockCharge,
    ResolveDispute,
}

impl WorkflowTag {
    pub const ALL: [WorkflowTag; 13] = [
        Self::Sale,
        Self::Partition,
        Self::Inheritance,
        Self::Conversion,
        Self::ApproveMutation,
        Self::RegisterAts,
        Self::IntimateDeath,
        Self::Gift,
        Self::FinalizePartition,
        Self::AmalgamateParcels,
        Self::RectifyBoundary,
        Self::UnlockCharge,
        Self::ResolveDispute,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sale => "SALE",
            Self::Partition => "PARTITION",
            Self::Inheritance => "INHERITANCE",
            Self::Conversion => "CONVERSION",
            Self::ApproveMutation => "APPROVE_MUTATION",
            Self::RegisterAts => "REGISTER_ATS",
            Self::IntimateDeath => "INTIMATE_DEATH",
            Self::Gift => "GIFT",
            Self::FinalizePartition => "FINALIZE_PARTITION",
            Self::AmalgamateParcels => "AMALGAMATE_PARCELS",
            Self::RectifyBoundary => "RECTIFY_BOUNDARY",
            Self::UnlockCharge => "UNLOCK_CHARGE",
            Self::ResolveDispute => "RESOLVE_DISPUTE",
        }
    }

    /// Workflows that dispose of an interest by act of the owner.
    pub fn is_transfer(&self) -> bool {
        matches!(
            self,
            Self::Sale | Self::Gift | Self::Partition | Self::RegisterAts
        )
    }

    /// Transfers plus succession: every workflow that can put a new owner on
    /// the title, and so is barred on endowment land.
    pub fn changes_ownership(&self) -> bool {
        self.is_transfer() || *self == Self::Inheritance
    }

    /// Workflows with no single target asset.
    pub fn is_multi_asset(&self) -> bool {
        matches!(self, Self::AmalgamateParcels)
    }

    /// Returns true if this workflow may run on an asset in a non-FREE `status`.
    pub fn admitted_in(&self, status: AssetStatus) -> bool {
        match status {
            AssetStatus::Free => true,
            AssetStatus::Retired => false,
            AssetStatus::LockedForSuccession if *self == Self::Inheritance => true,
            _ => matches!(
                self,
                Self::ResolveDispute
                    | Self::UnlockCharge
                    | Self::ApproveMutation
                    | Self::IntimateDeath
            ),
        }
    }
}

impl fmt::Display for WorkflowTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowTag {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| RegistryError::UnsupportedWorkflow(s.to_string()))
    }
}

// =============================================================================
// PAYLOADS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalePayload {
    #[serde(default)]
    pub seller_id: Option<String>,
    pub buyer_id: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub witnesses: Vec<String>,
    #[serde(default)]
    pub stamp_duty: Option<StampDuty>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionPayload {
    pub sub_parcels: Vec<SubParcel>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InheritancePayload {
    pub heirs: Vec<HeirShare>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionPayload {
    pub new_use: LandUse,
}

/// Agreement to sale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsPayload {
    pub buyer_id: String,
    #[serde(default)]
    pub agreement_date: Option<String>,
    #[serde(default)]
    pub advance_amount: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeathIntimationPayload {
    pub deceased_owner_id: String,
    #[serde(default)]
    pub death_certificate_hash: Option<String>,
    #[serde(default)]
    pub date_of_death: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftPayload {
    pub donee_id: String,
    #[serde(default)]
    pub gift_deed_hash: Option<String>,
    #[serde(default)]
    pub stamp_duty: Option<StampDuty>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizePartitionPayload {
    pub new_parcels: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmalgamationPayload {
    pub constituent_parcel_ids: Vec<String>,
    pub new_parcel_id: String,
    #[serde(default)]
    pub new_geo_json: Option<GeoInput>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectifyBoundaryPayload {
    pub new_geo_json: GeoInput,
    #[serde(default)]
    pub survey_ref: Option<String>,
    #[serde(default)]
    pub new_ulpin: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockChargePayload {
    pub charge_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveDisputePayload {
    pub dispute_id: String,
    #[serde(default)]
    pub resolution: Option<String>,
}

/// A decoded workflow.
#[derive(Clone, Debug, PartialEq)]
pub enum Workflow {
    Sale(SalePayload),
    Partition(PartitionPayload),
    Inheritance(InheritancePayload),
    Conversion(ConversionPayload),
    ApproveMutation,
    RegisterAts(AtsPayload),
    IntimateDeath(DeathIntimationPayload),
    Gift(GiftPayload),
    FinalizePartition(FinalizePartitionPayload),
    AmalgamateParcels(AmalgamationPayload),
    RectifyBoundary(RectifyBoundaryPayload),
    UnlockCharge(UnlockChargePayload),
    ResolveDispute(ResolveDisputePayload),
}

fn payload<T: DeserializeOwned>(tag: WorkflowTag, value: &Value) -> Result<T, RegistryError> {
    T::deserialize(value)
        .map_err(|e| RegistryError::InvalidRequest(format!("Malformed {tag} payload: {e}")))
}

impl Workflow {
    /// Decodes the payload for `tag`.
    pub fn decode(tag: WorkflowTag, value: &Value) -> Result<Self, RegistryError> {
        Ok(match tag {
            WorkflowTag::Sale => Self::Sale(payload(tag, value)?),
            WorkflowTag::Partition => Self::Partition(payload(tag, value)?),
            WorkflowTag::Inheritance => Self::Inheritance(payload(tag, value)?),
            WorkflowTag::Conversion => Self::Conversion(payload(tag, value)?),
            WorkflowTag::ApproveMutation => Self::ApproveMutation,
            WorkflowTag::RegisterAts => Self::RegisterAts(payload(tag, value)?),
            WorkflowTag::IntimateDeath => Self::IntimateDeath(payload(tag, value)?),
            WorkflowTag::Gift => Self::Gift(payload(tag, value)?),
            WorkflowTag::FinalizePartition => Self::FinalizePartition(payload(tag, value)?),
            WorkflowTag::AmalgamateParcels => Self::AmalgamateParcels(payload(tag, value)?),
            WorkflowTag::RectifyBoundary => Self::RectifyBoundary(payload(tag, value)?),
            WorkflowTag::UnlockCharge => Self::UnlockCharge(payload(tag, value)?),
            WorkflowTag::ResolveDispute => Self::ResolveDispute(payload(tag, value)?),
        })
    }

    pub fn tag(&self) -> WorkflowTag {
        match self {
            Self::Sale(_) => WorkflowTag::Sale,
            Self::Partition(_) => WorkflowTag::Partition,
            Self::Inheritance(_) => WorkflowTag::Inheritance,
            Self::Conversion(_) => WorkflowTag::Conversion,
            Self::ApproveMutation => WorkflowTag::ApproveMutation,
            Self::RegisterAts(_) => WorkflowTag::RegisterAts,
            Self::IntimateDeath(_) => WorkflowTag::IntimateDeath,
            Self::Gift(_) => WorkflowTag::Gift,
            Self::FinalizePartition(_) => WorkflowTag::FinalizePartition,
            Self::AmalgamateParcels(_) => WorkflowTag::AmalgamateParcels,
            Self::RectifyBoundary(_) => WorkflowTag::RectifyBoundary,
            Self::UnlockCharge(_) => WorkflowTag::UnlockCharge,
            Self::ResolveDispute(_) => WorkflowTag::ResolveDispute,
        }
    }
}

/// Fields every `executeTransaction` payload may carry besides its own.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    #[serde(default)]
    parcel_id: Option<String>,
    #[serde(default, alias = "dcApprovalHash")]
    approval_ref: Option<String>,
}

/// A fully decoded `executeTransaction` call.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionRequest {
    /// Target asset; `None` only for multi-asset workflows.
    pub asset_id: Option<String>,
    /// Approval reference for protected land (e.g. the collector's order).
    pub approval_ref: Option<String>,
    pub evidence_ref: String,
    pub workflow: Workflow,
}

impl TransactionRequest {
    /// Decodes a raw call. Unknown tags fail before the payload is read.
    pub fn parse(tag: &str, payload_json: &str, evidence_ref: &str) -> Result<Self, RegistryError> {
        let tag: WorkflowTag = tag.parse()?;
        let value: Value = serde_json::from_str(payload_json)
            .map_err(|e| RegistryError::InvalidRequest(format!("Malformed {tag} payload: {e}")))?;
        let envelope: Envelope = payload(tag, &value)?;

        let asset_id = match envelope.parcel_id {
            Some(id) if !id.trim().is_empty() => Some(id),
            _ if tag.is_multi_asset() => None,
            _ => {
                return Err(RegistryError::InvalidRequest(format!(
                    "{tag} requires parcelId"
                )))
            }
        };

        Ok(Self {
            asset_id,
            approval_ref: envelope.approval_ref,
            evidence_ref: evidence_ref.to_string(),
            workflow: Workflow::decode(tag, &value)?,
        })
    }
}

// =============================================================================
// SINGLE-ASSET HANDLERS
// =============================================================================

/// What a handler produced besides mutating the target asset.
#[derive(Debug, Default)]
pub struct Outcome {
    /// Assets created by the workflow.
    pub minted: Vec<Asset>,
    pub events: Vec<RegistryEvent>,
    /// Two-phase transfer dropped because the asset changed hands or locked.
    pub aborted_transfer: Option<PendingTransfer>,
}

fn require_id(field: &str, value: &str) -> Result<(), RegistryError> {
    if value.trim().is_empty() {
        return Err(RegistryError::InvalidRequest(format!("{field} is required")));
    }
    Ok(())
}

fn summary(
    tx_type: WorkflowTag,
    now: Timestamp,
    consideration: f64,
    duty: Option<&StampDuty>,
    witnesses: Vec<String>,
) -> LastTransaction {
    LastTransaction {
        tx_type: tx_type.to_string(),
        executed_at: now,
        consideration,
        duty_amount: duty.map(|d| d.amount),
        duty_reference: duty.map(|d| d.challan_no.clone()),
        witnesses,
    }
}

/// Starts the single-phase scrutiny timer after a change of hands.
fn start_scrutiny(asset: &mut Asset, now: Timestamp) {
    asset.title.is_conclusive = false;
    asset.title.published_at = Some(now);
    asset.status = AssetStatus::PendingScrutiny;
    asset.mutation_requested_at = Some(now);
}

/// Applies a workflow to its already admitted target asset.
///
/// `AMALGAMATE_PARCELS` has no target and is routed to
/// [`registry_ops::amalgamate`] by the dispatcher instead.
pub fn apply(
    asset: &mut Asset,
    workflow: Workflow,
    now: Timestamp,
    config: &RegistryConfig,
) -> Result<Outcome, RegistryError> {
    let tag = workflow.tag();
    let mut outcome = Outcome::default();

    match workflow {
        Workflow::Sale(sale) => {
            require_id("buyerId", &sale.buyer_id)?;
            if let Some(seller) = sale.seller_id.as_deref() {
                if asset.title.share_of(seller).is_none() {
                    return Err(RegistryError::NotAnOwner {
                        asset_id: asset.asset_id.clone(),
                        owner_id: seller.to_string(),
                    });
                }
            }
            if !(sale.price.is_finite() && sale.price >= 0.0) {
                return Err(RegistryError::InvalidRequest(format!(
                    "invalid sale price {}",
                    sale.price
                )));
            }
            transfer::validate_duty(sale.stamp_duty.as_ref())?;
            compliance::validate_unit_sale(asset)?;

            title_ops::reassign_sole(&mut asset.title, &sale.buyer_id);
            asset.title.last_transaction = Some(summary(
                tag,
                now,
                sale.price,
                sale.stamp_duty.as_ref(),
                sale.witnesses,
            ));
            start_scrutiny(asset, now);
        }

        Workflow::Partition(partition) => {
            outcome.minted =
                registry_ops::partition(asset, &partition.sub_parcels, now, config)?;
            outcome.events.push(RegistryEvent::ParcelSubdivided {
                asset_id: asset.asset_id.clone(),
                child_ids: outcome.minted.iter().map(|c| c.asset_id.clone()).collect(),
                timestamp: now,
            });
        }

        Workflow::Inheritance(inheritance) => {
            title_ops::distribute(&mut asset.title, &inheritance.heirs, config.share_tolerance)?;
            asset.title.is_conclusive = false;
            asset.title.published_at = Some(now);
            asset.title.last_transaction = Some(summary(tag, now, 0.0, None, Vec::new()));
            if asset.status == AssetStatus::LockedForSuccession {
                asset.status = lifecycle::settled_status(asset);
            }
        }

        Workflow::Conversion(conversion) => {
            compliance::validate_conversion(asset, conversion.new_use)?;
            let old_use = asset.land_use;
            asset.land_use = conversion.new_use;
            outcome.events.push(RegistryEvent::ConversionEvent {
                asset_id: asset.asset_id.clone(),
                old_use,
                new_use: conversion.new_use,
                timestamp: now,
            });
        }

        Workflow::ApproveMutation => {
            let requested_at = match (asset.status, asset.mutation_requested_at) {
                (AssetStatus::PendingScrutiny, Some(at)) => at,
                _ => {
                    return Err(RegistryError::NotPendingScrutiny {
                        asset_id: asset.asset_id.clone(),
                        status: asset.status,
                    })
                }
            };
            transfer::ensure_scrutiny_elapsed(requested_at, now, config.scrutiny_period_ms)?;
            asset.status = AssetStatus::Free;
            asset.mutation_requested_at = None;
            asset.title.is_conclusive = true;
            asset.title.published_at = Some(now);
        }

        Workflow::RegisterAts(ats) => {
            require_id("buyerId", &ats.buyer_id)?;
            if !(ats.advance_amount.is_finite() && ats.advance_amount >= 0.0) {
                return Err(RegistryError::InvalidRequest(format!(
                    "invalid advance amount {}",
                    ats.advance_amount
                )));
            }
            asset.status = AssetStatus::PendingAts;
        }

        Workflow::IntimateDeath(death) => {
            if asset.title.share_of(&death.deceased_owner_id).is_none() {
                return Err(RegistryError::NotAnOwner {
                    asset_id: asset.asset_id.clone(),
                    owner_id: death.deceased_owner_id,
                });
            }
            if let Some(hash) = death.death_certificate_hash.as_deref() {
                format::validate_doc_hash(hash)?;
            }
            outcome.aborted_transfer = transfer::abort(asset);
            asset.mutation_requested_at = None;
            asset.status = AssetStatus::LockedForSuccession;
        }

        Workflow::Gift(gift) => {
            require_id("doneeId", &gift.donee_id)?;
            if let Some(hash) = gift.gift_deed_hash.as_deref() {
                format::validate_doc_hash(hash)?;
            }
            transfer::validate_duty(gift.stamp_duty.as_ref())?;

            title_ops::reassign_sole(&mut asset.title, &gift.donee_id);
            asset.title.last_transaction =
                Some(summary(tag, now, 0.0, gift.stamp_duty.as_ref(), Vec::new()));
            start_scrutiny(asset, now);
        }

        Workflow::FinalizePartition(finalize) => {
            if finalize.new_parcels.is_empty() {
                return Err(RegistryError::InvalidRequest(
                    "FINALIZE_PARTITION requires the new parcels".into(),
                ));
            }
            asset.status = AssetStatus::Retired;
        }

        Workflow::RectifyBoundary(rectify) => {
            registry_ops::rectify_boundary(
                asset,
                rectify.new_geo_json.into(),
                rectify.survey_ref,
                rectify.new_ulpin.as_deref().filter(|u| !u.is_empty()),
                config,
            )?;
        }

        Workflow::UnlockCharge(unlock) => {
            lifecycle::release_charge(asset, &unlock.charge_id)?;
        }

        Workflow::ResolveDispute(resolve) => {
            lifecycle::resolve_dispute(asset, &resolve.dispute_id, resolve.resolution)?;
            outcome.events.push(RegistryEvent::DisputeResolved {
                asset_id: asset.asset_id.clone(),
                dispute_id: resolve.dispute_id,
                status: asset.status,
                timestamp: now,
            });
        }

        Workflow::AmalgamateParcels(_) => {
            return Err(RegistryError::InvalidRequest(format!(
                "{tag} has no single target asset"
            )));
        }
    }

    Ok(outcome)
}
