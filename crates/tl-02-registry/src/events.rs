//! # Event Schema
//!
//! Domain events emitted by the registry. Every mutating operation stages one
//! or more events; they are wrapped in an [`EventEnvelope`] and handed to the
//! publisher only after the ledger commit succeeded.
//!
//! | Event | Emitted by |
//! |-------|-----------|
//! | `ParcelCreated` | `createParcel` |
//! | `IntimationRecorded` | `recordIntimation` |
//! | `MutationRequest` | `initiateTransfer` |
//! | `MutationApproved` | `approveMutation` |
//! | `DisputeResolved` | `resolveDispute`, `RESOLVE_DISPUTE` |
//! | `StrataUnitCreated` | `createStrataUnit` |
//! | `ParcelSubdivided` | `subdivideParcel`, `PARTITION` |
//! | `ConversionEvent` | `convertLandUse`, `CONVERSION` |
//! | `TitleFinalized` | `finalizeTitle` |
//! | `TransactionExecuted` | every `executeTransaction` tag |

use crate::ports::outbound::TxId;
use serde::{Deserialize, Serialize};
use shared_types::{AssetStatus, LandUse, Timestamp};
use uuid::Uuid;

/// Intimation category as reported to subscribers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntimationCategory {
    Charge,
    Dispute,
}

/// A domain event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "eventType", rename_all_fields = "camelCase")]
pub enum RegistryEvent {
    ParcelCreated {
        asset_id: String,
        owner_id: String,
        timestamp: Timestamp,
    },
    IntimationRecorded {
        asset_id: String,
        category: IntimationCategory,
        record_id: String,
        record_type: String,
        status: AssetStatus,
        timestamp: Timestamp,
    },
    MutationRequest {
        asset_id: String,
        seller_id: String,
        buyer_id: String,
        share_percentage: f64,
        utr: String,
        timestamp: Timestamp,
    },
    MutationApproved {
        asset_id: String,
        seller_id: String,
        buyer_id: String,
        share_percentage: f64,
        timestamp: Timestamp,
    },
    DisputeResolved {
        asset_id: String,
        dispute_id: String,
        status: AssetStatus,
        timestamp: Timestamp,
    },
    StrataUnitCreated {
        asset_id: String,
        parent_id: String,
        timestamp: Timestamp,
    },
    ParcelSubdivided {
        asset_id: String,
        child_ids: Vec<String>,
        timestamp: Timestamp,
    },
    ConversionEvent {
        asset_id: String,
        old_use: LandUse,
        new_use: LandUse,
        timestamp: Timestamp,
    },
    TitleFinalized {
        asset_id: String,
        title_id: String,
        timestamp: Timestamp,
    },
    TransactionExecuted {
        tx_type: String,
        asset_id: String,
        evidence_ref: String,
        timestamp: Timestamp,
    },
}

impl RegistryEvent {
    /// Event name as seen by subscribers.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ParcelCreated { .. } => "ParcelCreated",
            Self::IntimationRecorded { .. } => "IntimationRecorded",
            Self::MutationRequest { .. } => "MutationRequest",
            Self::MutationApproved { .. } => "MutationApproved",
            Self::DisputeResolved { .. } => "DisputeResolved",
            Self::StrataUnitCreated { .. } => "StrataUnitCreated",
            Self::ParcelSubdivided { .. } => "ParcelSubdivided",
            Self::ConversionEvent { .. } => "ConversionEvent",
            Self::TitleFinalized { .. } => "TitleFinalized",
            Self::TransactionExecuted { .. } => "TransactionExecuted",
        }
    }

    /// The asset the event is about.
    pub fn asset_id(&self) -> &str {
        match self {
            Self::ParcelCreated { asset_id, .. }
            | Self::IntimationRecorded { asset_id, .. }
            | Self::MutationRequest { asset_id, .. }
            | Self::MutationApproved { asset_id, .. }
            | Self::DisputeResolved { asset_id, .. }
            | Self::StrataUnitCreated { asset_id, .. }
            | Self::ParcelSubdivided { asset_id, .. }
            | Self::ConversionEvent { asset_id, .. }
            | Self::TitleFinalized { asset_id, .. }
            | Self::TransactionExecuted { asset_id, .. } => asset_id,
        }
    }
}

/// A committed event with its correlation data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    pub event_id: Uuid,
    /// Ledger transaction that made the event's state visible.
    pub tx_id: TxId,
    pub event: RegistryEvent,
}

impl EventEnvelope {
    pub fn new(tx_id: TxId, event: RegistryEvent) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            tx_id,
            event,
        }
    }
}
