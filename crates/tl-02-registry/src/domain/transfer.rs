//! # Two-Phase Transfer Protocol
//!
//! ```text
//! initiateTransfer ──→ [PENDING_MUTATION] ──(scrutiny period)──→ approveMutation ──→ [FREE]
//!        │                    │
//!        │                    └── blocking intimation ──→ transfer aborted, escrow FAILED
//!        └── escrow payment (ESCROW_LOCKED)
//! ```
//!
//! The timer is evaluated on demand as `now - requested_at`; nothing runs in
//! the background.

use crate::config::DAY_MS;
use crate::domain::errors::RegistryError;
use crate::domain::lifecycle;
use crate::domain::title_ops::{self, SHARE_EPSILON};
use serde::{Deserialize, Serialize};
use shared_types::{Asset, AssetStatus, LastTransaction, PendingTransfer, StampDuty, Timestamp};

/// Caller-supplied terms of a transfer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferTerms {
    pub seller_id: String,
    pub buyer_id: String,
    pub share_percentage: f64,
    pub price: f64,
    #[serde(alias = "paymentUtr")]
    pub utr: String,
    #[serde(default)]
    pub witnesses: Vec<String>,
    #[serde(default)]
    pub stamp_duty: Option<StampDuty>,
}

/// Rejects a stamp duty whose amount is not positive.
pub fn validate_duty(duty: Option<&StampDuty>) -> Result<(), RegistryError> {
    match duty {
        Some(d) if !(d.amount.is_finite() && d.amount > 0.0) => {
            Err(RegistryError::NonPositiveDuty(d.amount))
        }
        _ => Ok(()),
    }
}

/// Whole days left before the scrutiny period ends, or `None` once elapsed.
pub fn remaining_scrutiny_days(requested_at: Timestamp, now: Timestamp, period_ms: u64) -> Option<u64> {
    let elapsed = now.saturating_sub(requested_at);
    if elapsed >= period_ms {
        return None;
    }
    Some((period_ms - elapsed).div_ceil(DAY_MS))
}

/// Fails with the remaining days while the scrutiny period is running.
pub fn ensure_scrutiny_elapsed(
    requested_at: Timestamp,
    now: Timestamp,
    period_ms: u64,
) -> Result<(), RegistryError> {
    match remaining_scrutiny_days(requested_at, now, period_ms) {
        Some(remaining_days) => Err(RegistryError::ScrutinyActive { remaining_days }),
        None => Ok(()),
    }
}

/// Phase one: validates the terms and parks them on the asset.
///
/// UTR replay is checked by the caller, which owns the payment keys.
pub fn begin(
    asset: &mut Asset,
    terms: &TransferTerms,
    now: Timestamp,
    tolerance: f64,
) -> Result<PendingTransfer, RegistryError> {
    lifecycle::ensure_free(asset, "initiateTransfer")?;
    if terms.utr.trim().is_empty() {
        return Err(RegistryError::InvalidRequest("paymentUtr is required".into()));
    }
    if terms.seller_id == terms.buyer_id {
        return Err(RegistryError::InvalidRequest(
            "seller and buyer must differ".into(),
        ));
    }
    if !(terms.price.is_finite() && terms.price >= 0.0) {
        return Err(RegistryError::InvalidRequest(format!(
            "invalid sale price {}",
            terms.price
        )));
    }
    validate_duty(terms.stamp_duty.as_ref())?;

    let owned = title_ops::check_disposal(&asset.title, &terms.seller_id, terms.share_percentage)?;
    let whole = (terms.share_percentage - 100.0).abs() <= SHARE_EPSILON;
    if whole && asset.title.owners.len() > 1 {
        return Err(RegistryError::MultiSigRequired { owned });
    }
    // the approval must not be able to break the share invariant
    title_ops::preview_move(
        &asset.title,
        &terms.seller_id,
        &terms.buyer_id,
        terms.share_percentage,
        tolerance,
    )?;

    let pending = PendingTransfer {
        buyer_id: terms.buyer_id.clone(),
        seller_id: terms.seller_id.clone(),
        share_percentage: terms.share_percentage,
        consideration: terms.price,
        witnesses: terms.witnesses.clone(),
        duty: terms.stamp_duty.clone(),
        utr: terms.utr.clone(),
        requested_at: now,
        officer_approved: false,
    };
    asset.pending_transfer = Some(pending.clone());
    asset.status = AssetStatus::PendingMutation;
    Ok(pending)
}

/// Phase two: applies a parked transfer once the scrutiny period is over.
pub fn complete(
    asset: &mut Asset,
    now: Timestamp,
    scrutiny_period_ms: u64,
    tolerance: f64,
) -> Result<PendingTransfer, RegistryError> {
    lifecycle::ensure_mutable(asset)?;
    let pending = match (&asset.status, &asset.pending_transfer) {
        (AssetStatus::PendingMutation, Some(pending)) => pending.clone(),
        _ => {
            return Err(RegistryError::NoPendingTransfer {
                asset_id: asset.asset_id.clone(),
                status: asset.status,
            })
        }
    };
    ensure_scrutiny_elapsed(pending.requested_at, now, scrutiny_period_ms)?;

    title_ops::move_share(
        &mut asset.title,
        &pending.seller_id,
        &pending.buyer_id,
        pending.share_percentage,
        tolerance,
    )?;
    asset.title.is_conclusive = true;
    asset.title.published_at = Some(now);
    asset.title.last_transaction = Some(LastTransaction {
        tx_type: "TRANSFER".to_string(),
        executed_at: now,
        consideration: pending.consideration,
        duty_amount: pending.duty.as_ref().map(|d| d.amount),
        duty_reference: pending.duty.as_ref().map(|d| d.challan_no.clone()),
        witnesses: pending.witnesses.clone(),
    });
    asset.pending_transfer = None;
    asset.status = AssetStatus::Free;

    let mut approved = pending;
    approved.officer_approved = true;
    Ok(approved)
}

/// Drops a parked transfer because the asset became encumbered.
pub fn abort(asset: &mut Asset) -> Option<PendingTransfer> {
    if asset.status == AssetStatus::PendingMutation {
        asset.status = AssetStatus::Free;
    }
    asset.pending_transfer.take()
}
