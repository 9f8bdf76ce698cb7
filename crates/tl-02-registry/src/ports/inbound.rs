//! # Inbound Ports (Driving Ports)
//!
//! The operations the Land Registry exposes to the gateway layer. Verbs follow
//! the gateway's invocation names; wire framing belongs to the caller.

use crate::domain::boundary::GeoInput;
use crate::domain::errors::RegistryError;
use crate::domain::registry_ops::{ChildParcelSpec, UnitSpec};
use crate::domain::transfer::TransferTerms;
use crate::ports::outbound::TxId;
use serde::{Deserialize, Serialize};
use shared_types::{
    Asset, AssetStatus, ChargeType, DisputeType, LandCategory, LandUse, LocalUnit, PaymentRecord,
    PendingTransfer, ProtectionFlags, Timestamp, Title,
};

/// Input of `createParcel`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateParcelRequest {
    pub parcel_id: String,
    pub owner_id: String,
    #[serde(alias = "geoJson")]
    pub boundary: GeoInput,
    pub doc_hash: String,
    /// Canonical area; computed from a structured boundary when omitted.
    #[serde(default)]
    pub area_hectares: Option<f64>,
    /// Defaults to the segment after the first `_` of the id, or `000`.
    #[serde(default)]
    pub survey_no: Option<String>,
    #[serde(default)]
    pub land_use: LandUse,
    #[serde(default)]
    pub land_category: LandCategory,
    #[serde(default)]
    pub protection: ProtectionFlags,
    #[serde(default)]
    pub local_unit: Option<LocalUnit>,
    #[serde(default)]
    pub ulpin: Option<String>,
    #[serde(default)]
    pub legacy_refs: Vec<String>,
}

impl CreateParcelRequest {
    /// A request with every optional attribute defaulted.
    pub fn new(
        parcel_id: impl Into<String>,
        owner_id: impl Into<String>,
        boundary: impl Into<GeoInput>,
        doc_hash: impl Into<String>,
    ) -> Self {
        Self {
            parcel_id: parcel_id.into(),
            owner_id: owner_id.into(),
            boundary: boundary.into(),
            doc_hash: doc_hash.into(),
            area_hectares: None,
            survey_no: None,
            land_use: LandUse::default(),
            land_category: LandCategory::default(),
            protection: ProtectionFlags::default(),
            local_unit: None,
            ulpin: None,
            legacy_refs: Vec::new(),
        }
    }

    pub fn with_area(mut self, hectares: f64) -> Self {
        self.area_hectares = Some(hectares);
        self
    }
}

/// Input of `recordIntimation`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "category",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum IntimationRequest {
    Charge {
        parcel_id: String,
        charge_type: ChargeType,
        holder: String,
        #[serde(default)]
        amount: f64,
    },
    Dispute {
        parcel_id: String,
        dispute_type: DisputeType,
        court_id: String,
        /// 16-character case-record number.
        #[serde(default)]
        case_number: Option<String>,
    },
}

impl IntimationRequest {
    pub fn parcel_id(&self) -> &str {
        match self {
            Self::Charge { parcel_id, .. } | Self::Dispute { parcel_id, .. } => parcel_id,
        }
    }
}

/// Result of `recordIntimation`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntimationReceipt {
    /// `CHG_n` or `DSP_n`.
    pub record_id: String,
    pub status: AssetStatus,
    /// UTR of a two-phase transfer the intimation aborted.
    pub aborted_transfer_utr: Option<String>,
}

/// Input of `initiateTransfer`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub parcel_id: String,
    /// Required for tribal or scheduled-category land.
    #[serde(default, alias = "dcApprovalHash")]
    pub approval_ref: Option<String>,
    #[serde(flatten)]
    pub terms: TransferTerms,
}

/// Coarse encumbrance indicator of the public view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeIndicator {
    Clear,
    Pending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MortgageIndicator {
    Clear,
    Encumbered,
}

/// Redacted view of an asset: no owner identities.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicParcelView {
    pub asset_id: String,
    pub asset_type: String,
    pub status: AssetStatus,
    pub land_use: LandUse,
    pub area_hectares: f64,
    pub owner_count: usize,
    pub owner_shares: Vec<f64>,
    pub dispute_status: DisputeIndicator,
    pub mortgage_status: MortgageIndicator,
}

impl PublicParcelView {
    pub fn from_asset(asset: &Asset) -> Self {
        Self {
            asset_id: asset.asset_id.clone(),
            asset_type: if asset.is_unit() { "UNIT" } else { "PARCEL" }.to_string(),
            status: asset.status,
            land_use: asset.land_use,
            area_hectares: asset.area_hectares,
            owner_count: asset.title.owners.len(),
            owner_shares: asset
                .title
                .owners
                .iter()
                .map(|o| o.share_percentage)
                .collect(),
            dispute_status: if asset.pending_dispute_count() > 0 {
                DisputeIndicator::Pending
            } else {
                DisputeIndicator::Clear
            },
            mortgage_status: if asset.blocking_charge_count() > 0 {
                MortgageIndicator::Encumbered
            } else {
                MortgageIndicator::Clear
            },
        }
    }
}

/// Result of `executeTransaction`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReceipt {
    pub tx_id: TxId,
    pub tx_type: String,
    /// Every asset written by the call, target first.
    pub asset_ids: Vec<String>,
}

/// One entry of `getParcelHistory`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelHistoryEntry {
    pub tx_id: TxId,
    pub timestamp: Timestamp,
    pub is_delete: bool,
    pub asset: Option<Asset>,
}

/// Primary API of the Land Registry.
///
/// Every mutating call either commits all of its writes and then publishes
/// its events, or fails without any persisted effect.
pub trait LandRegistryApi {
    /// Creates a FREE parcel with a sole owner.
    ///
    /// ## Errors
    ///
    /// - `AssetExists`: key already used (even by a retired asset)
    /// - `Format` / `Spatial`: malformed id, document hash or boundary
    fn create_parcel(&self, request: CreateParcelRequest) -> Result<Asset, RegistryError>;

    fn get_parcel(&self, parcel_id: &str) -> Result<Asset, RegistryError>;

    fn get_public_parcel_details(&self, parcel_id: &str) -> Result<PublicParcelView, RegistryError>;

    /// Appends a charge or dispute and re-derives the asset status.
    fn record_intimation(&self, request: IntimationRequest)
        -> Result<IntimationReceipt, RegistryError>;

    /// Phase one of a transfer.
    ///
    /// ## Errors
    ///
    /// - `InvalidState`: asset not FREE
    /// - `PaymentReplay`: UTR already recorded
    /// - `InsufficientShare` / `MultiSigRequired`: seller cannot dispose of the share
    fn initiate_transfer(&self, request: TransferRequest) -> Result<PendingTransfer, RegistryError>;

    /// Phase two of a transfer.
    ///
    /// ## Errors
    ///
    /// - `NoPendingTransfer`: nothing to approve
    /// - `ScrutinyActive`: period not elapsed, carries the remaining days
    fn approve_mutation(&self, parcel_id: &str) -> Result<Title, RegistryError>;

    fn resolve_dispute(
        &self,
        parcel_id: &str,
        dispute_id: &str,
        resolution: Option<String>,
    ) -> Result<AssetStatus, RegistryError>;

    fn create_strata_unit(&self, spec: UnitSpec) -> Result<Asset, RegistryError>;

    fn get_strata_unit(&self, unit_id: &str) -> Result<Asset, RegistryError>;

    /// Retires a FREE parcel and mints its children in one commit.
    fn subdivide_parcel(
        &self,
        parent_id: &str,
        children: Vec<ChildParcelSpec>,
    ) -> Result<Vec<Asset>, RegistryError>;

    fn convert_land_use(&self, parcel_id: &str, new_use: LandUse) -> Result<Asset, RegistryError>;

    /// Marks the title conclusive; fails while disputes are pending.
    fn finalize_title(&self, parcel_id: &str) -> Result<Title, RegistryError>;

    /// Tagged dispatch of one workflow.
    fn execute_transaction(
        &self,
        tx_type: &str,
        payload_json: &str,
        evidence_ref: &str,
    ) -> Result<ExecutionReceipt, RegistryError>;

    fn get_payment_details(&self, utr: &str) -> Result<PaymentRecord, RegistryError>;

    /// Assets awaiting either mutation approval.
    fn query_pending_mutations(&self) -> Result<Vec<Asset>, RegistryError>;

    fn get_parcel_history(&self, parcel_id: &str) -> Result<Vec<ParcelHistoryEntry>, RegistryError>;
}
