//! # Registry Service
//!
//! Implements [`LandRegistryApi`] over the outbound ports. Every mutating
//! call follows the same shape:
//!
//! 1. read through a [`StagedLedger`] (versions recorded)
//! 2. validate and mutate in memory
//! 3. commit all writes in one batch
//! 4. publish the staged events
//!
//! A failure in 1-3 leaves the ledger untouched and publishes nothing. A
//! publish failure after the commit is logged and does not fail the call.

use super::dispatch;
use super::staging::StagedLedger;
use crate::adapters::NoOpPublisher;
use crate::config::RegistryConfig;
use crate::domain::boundary;
use crate::domain::errors::RegistryError;
use crate::domain::lifecycle;
use crate::domain::registry_ops::{self, ChildParcelSpec, UnitSpec};
use crate::domain::transfer;
use crate::domain::workflows::{ConversionPayload, TransactionRequest, Workflow};
use crate::events::{IntimationCategory, RegistryEvent};
use crate::ports::inbound::{
    CreateParcelRequest, ExecutionReceipt, IntimationReceipt, IntimationRequest,
    LandRegistryApi, ParcelHistoryEntry, PublicParcelView, TransferRequest,
};
use crate::ports::outbound::{
    LedgerStore, RegistryEventPublisher, Selector, SystemTimeSource, TimeSource, TxId,
};
use shared_types::{
    Asset, AssetStatus, LandUse, LocalMeasure, PaymentRecord, PaymentStatus, PaymentType,
    PendingTransfer, Timestamp, Title,
};
use tl_01_validators::{compliance, format};
use tracing::{info, instrument, warn};

/// Area assumed for a raw boundary when the caller gives none.
pub const DEFAULT_PARCEL_HECTARES: f64 = 1.0;

/// Survey number taken from the second `_`-separated segment of an id.
fn survey_no_from_id(asset_id: &str) -> String {
    asset_id
        .split('_')
        .nth(1)
        .filter(|s| !s.is_empty())
        .unwrap_or("000")
        .to_string()
}

/// The Land Registry service.
pub struct RegistryService<L, T = SystemTimeSource, P = NoOpPublisher> {
    ledger: L,
    clock: T,
    publisher: P,
    config: RegistryConfig,
}

impl<L: LedgerStore> RegistryService<L> {
    /// Service on the system clock that discards events.
    pub fn with_defaults(ledger: L, config: RegistryConfig) -> Self {
        Self::new(ledger, SystemTimeSource, NoOpPublisher, config)
    }
}

impl<L, T, P> RegistryService<L, T, P>
where
    L: LedgerStore,
    T: TimeSource,
    P: RegistryEventPublisher,
{
    pub fn new(ledger: L, clock: T, publisher: P, config: RegistryConfig) -> Self {
        Self {
            ledger,
            clock,
            publisher,
            config,
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn stage(&self) -> StagedLedger<'_, L> {
        StagedLedger::new(&self.ledger)
    }

    /// Commits the invocation, then publishes its events.
    fn finish(&self, staged: StagedLedger<'_, L>, now: Timestamp) -> Result<TxId, RegistryError> {
        let (tx_id, envelopes) = staged.commit(now)?;
        for envelope in &envelopes {
            if let Err(e) = self.publisher.publish(envelope) {
                warn!(
                    event = envelope.event.name(),
                    tx_id = %tx_id,
                    error = %e,
                    "Failed to publish committed event"
                );
            }
        }
        Ok(tx_id)
    }

    fn read_asset(&self, asset_id: &str) -> Result<Asset, RegistryError> {
        self.stage().load_asset(asset_id)
    }

    fn local_measure(&self, hectares: f64, unit: Option<shared_types::LocalUnit>) -> LocalMeasure {
        let unit = unit.unwrap_or(self.config.default_local_unit);
        LocalMeasure {
            unit,
            value: format::calculate_local_unit(hectares, unit),
        }
    }
}

impl<L, T, P> LandRegistryApi for RegistryService<L, T, P>
where
    L: LedgerStore,
    T: TimeSource,
    P: RegistryEventPublisher,
{
    #[instrument(skip(self, request), fields(asset_id = %request.parcel_id))]
    fn create_parcel(&self, request: CreateParcelRequest) -> Result<Asset, RegistryError> {
        let now = self.clock.now();
        let mut staged = self.stage();

        format::validate_asset_id(&request.parcel_id, self.config.allow_legacy_ids)?;
        if request.owner_id.trim().is_empty() {
            return Err(RegistryError::InvalidRequest("ownerId is required".into()));
        }
        if staged.exists(&request.parcel_id)? {
            return Err(RegistryError::AssetExists(request.parcel_id));
        }
        format::validate_doc_hash(&request.doc_hash)?;
        if let Some(ulpin) = request.ulpin.as_deref() {
            format::validate_ulpin(ulpin)?;
        }
        if let Some(area) = request.area_hectares {
            if !(area.is_finite() && area > 0.0) {
                return Err(RegistryError::InvalidRequest(format!(
                    "invalid area {area}"
                )));
            }
        }

        let resolved = boundary::resolve(
            request.boundary.into(),
            request.area_hectares,
            &self.config,
        )?;
        let area = request
            .area_hectares
            .or(resolved.computed_hectares)
            .unwrap_or(DEFAULT_PARCEL_HECTARES);

        let mut asset = Asset::new_parcel(request.parcel_id.as_str(), request.owner_id.as_str());
        asset.survey_no = request
            .survey_no
            .unwrap_or_else(|| survey_no_from_id(&request.parcel_id));
        asset.land_use = request.land_use;
        asset.land_category = request.land_category;
        asset.protection = request.protection;
        asset.area_hectares = area;
        asset.local_measure = self.local_measure(area, request.local_unit);
        asset.geometry = resolved.geometry;
        asset.doc_hash = request.doc_hash;
        asset.ulpin = request.ulpin;
        asset.legacy_refs = request.legacy_refs;

        staged.stage_asset(&asset)?;
        staged.emit(RegistryEvent::ParcelCreated {
            asset_id: asset.asset_id.clone(),
            owner_id: request.owner_id,
            timestamp: now,
        });
        self.finish(staged, now)?;

        info!(
            asset_id = %asset.asset_id,
            area_hectares = asset.area_hectares,
            land_use = %asset.land_use,
            "Parcel created"
        );
        Ok(asset)
    }

    fn get_parcel(&self, parcel_id: &str) -> Result<Asset, RegistryError> {
        self.read_asset(parcel_id)
    }

    fn get_public_parcel_details(&self, parcel_id: &str) -> Result<PublicParcelView, RegistryError> {
        Ok(PublicParcelView::from_asset(&self.read_asset(parcel_id)?))
    }

    #[instrument(skip(self, request), fields(asset_id = %request.parcel_id()))]
    fn record_intimation(
        &self,
        request: IntimationRequest,
    ) -> Result<IntimationReceipt, RegistryError> {
        let now = self.clock.now();
        let mut staged = self.stage();
        let mut asset = staged.load_asset(request.parcel_id())?;
        lifecycle::ensure_mutable(&asset)?;

        let (category, record_id, record_type, aborted) = match request {
            IntimationRequest::Charge {
                charge_type,
                holder,
                amount,
                ..
            } => {
                if holder.trim().is_empty() {
                    return Err(RegistryError::InvalidRequest("holder is required".into()));
                }
                if !(amount.is_finite() && amount >= 0.0) {
                    return Err(RegistryError::InvalidRequest(format!(
                        "invalid charge amount {amount}"
                    )));
                }
                let aborted = if charge_type.is_blocking() {
                    transfer::abort(&mut asset)
                } else {
                    None
                };
                let id = lifecycle::record_charge(&mut asset, charge_type, &holder, amount, now);
                (IntimationCategory::Charge, id, charge_type.to_string(), aborted)
            }
            IntimationRequest::Dispute {
                dispute_type,
                court_id,
                case_number,
                ..
            } => {
                if court_id.trim().is_empty() {
                    return Err(RegistryError::InvalidRequest("courtId is required".into()));
                }
                if let Some(cnr) = case_number.as_deref() {
                    format::validate_cnr(cnr)?;
                }
                let aborted = transfer::abort(&mut asset);
                let id = lifecycle::record_dispute(&mut asset, dispute_type, &court_id, case_number, now);
                (IntimationCategory::Dispute, id, dispute_type.to_string(), aborted)
            }
        };

        let aborted_transfer_utr = aborted.map(|pending: PendingTransfer| pending.utr);
        if let Some(utr) = aborted_transfer_utr.as_deref() {
            dispatch::fail_escrow(&mut staged, &asset.asset_id, utr)?;
        }

        staged.stage_asset(&asset)?;
        staged.emit(RegistryEvent::IntimationRecorded {
            asset_id: asset.asset_id.clone(),
            category,
            record_id: record_id.clone(),
            record_type: record_type.clone(),
            status: asset.status,
            timestamp: now,
        });
        self.finish(staged, now)?;

        info!(
            asset_id = %asset.asset_id,
            record_id = %record_id,
            record_type = %record_type,
            status = %asset.status,
            "Intimation recorded"
        );
        Ok(IntimationReceipt {
            record_id,
            status: asset.status,
            aborted_transfer_utr,
        })
    }

    #[instrument(skip(self, request), fields(asset_id = %request.parcel_id, utr = %request.terms.utr))]
    fn initiate_transfer(&self, request: TransferRequest) -> Result<PendingTransfer, RegistryError> {
        let now = self.clock.now();
        let mut staged = self.stage();
        let mut asset = staged.load_asset(&request.parcel_id)?;

        lifecycle::ensure_free(&asset, "initiateTransfer")?;
        if staged.find_payment(&request.terms.utr)?.is_some() {
            return Err(RegistryError::PaymentReplay(request.terms.utr));
        }
        if let Some(parent_id) = asset.parent_id().map(str::to_string) {
            dispatch::ensure_parent_free(&mut staged, &parent_id)?;
        }
        compliance::validate_transfer(&asset, request.approval_ref.as_deref())?;
        compliance::validate_unit_sale(&asset)?;

        let pending = transfer::begin(&mut asset, &request.terms, now, self.config.share_tolerance)?;

        staged.stage_payment(&PaymentRecord {
            utr: pending.utr.clone(),
            asset_id: asset.asset_id.clone(),
            amount: pending.consideration,
            payer_id: pending.buyer_id.clone(),
            payee_id: pending.seller_id.clone(),
            recorded_at: now,
            status: PaymentStatus::EscrowLocked,
            payment_type: PaymentType::SalePrice,
        })?;
        staged.stage_asset(&asset)?;
        staged.emit(RegistryEvent::MutationRequest {
            asset_id: asset.asset_id.clone(),
            seller_id: pending.seller_id.clone(),
            buyer_id: pending.buyer_id.clone(),
            share_percentage: pending.share_percentage,
            utr: pending.utr.clone(),
            timestamp: now,
        });
        self.finish(staged, now)?;

        info!(
            asset_id = %asset.asset_id,
            seller = %pending.seller_id,
            buyer = %pending.buyer_id,
            share = pending.share_percentage,
            status = %asset.status,
            "Transfer initiated; scrutiny period started"
        );
        Ok(pending)
    }

    #[instrument(skip(self))]
    fn approve_mutation(&self, parcel_id: &str) -> Result<Title, RegistryError> {
        let now = self.clock.now();
        let mut staged = self.stage();
        let mut asset = staged.load_asset(parcel_id)?;

        let approved = transfer::complete(
            &mut asset,
            now,
            self.config.scrutiny_period_ms,
            self.config.share_tolerance,
        )?;
        staged.settle_escrow(&approved.utr, PaymentStatus::Confirmed)?;

        staged.stage_asset(&asset)?;
        staged.emit(RegistryEvent::MutationApproved {
            asset_id: asset.asset_id.clone(),
            seller_id: approved.seller_id.clone(),
            buyer_id: approved.buyer_id.clone(),
            share_percentage: approved.share_percentage,
            timestamp: now,
        });
        self.finish(staged, now)?;

        info!(
            asset_id = %asset.asset_id,
            buyer = %approved.buyer_id,
            owners = asset.title.owners.len(),
            "Mutation approved"
        );
        Ok(asset.title)
    }

    #[instrument(skip(self, resolution))]
    fn resolve_dispute(
        &self,
        parcel_id: &str,
        dispute_id: &str,
        resolution: Option<String>,
    ) -> Result<AssetStatus, RegistryError> {
        let now = self.clock.now();
        let mut staged = self.stage();
        let mut asset = staged.load_asset(parcel_id)?;
        lifecycle::ensure_mutable(&asset)?;
        lifecycle::resolve_dispute(&mut asset, dispute_id, resolution)?;

        staged.stage_asset(&asset)?;
        staged.emit(RegistryEvent::DisputeResolved {
            asset_id: asset.asset_id.clone(),
            dispute_id: dispute_id.to_string(),
            status: asset.status,
            timestamp: now,
        });
        self.finish(staged, now)?;

        info!(asset_id = %asset.asset_id, dispute_id, status = %asset.status, "Dispute resolved");
        Ok(asset.status)
    }

    #[instrument(skip(self, spec), fields(unit_id = %spec.unit_id, parent_id = %spec.parent_id))]
    fn create_strata_unit(&self, spec: UnitSpec) -> Result<Asset, RegistryError> {
        let now = self.clock.now();
        let mut staged = self.stage();

        if staged.exists(&spec.unit_id)? {
            return Err(RegistryError::AssetExists(spec.unit_id));
        }
        let parent = staged.load_asset(&spec.parent_id)?;
        let unit = registry_ops::mint_unit(&parent, &spec, &self.config)?;

        staged.stage_asset(&unit)?;
        staged.emit(RegistryEvent::StrataUnitCreated {
            asset_id: unit.asset_id.clone(),
            parent_id: parent.asset_id.clone(),
            timestamp: now,
        });
        self.finish(staged, now)?;

        info!(unit_id = %unit.asset_id, parent_id = %parent.asset_id, floor = spec.floor, "Strata unit created");
        Ok(unit)
    }

    fn get_strata_unit(&self, unit_id: &str) -> Result<Asset, RegistryError> {
        match self.stage().find_asset(unit_id)? {
            Some(asset) if asset.is_unit() => Ok(asset),
            _ => Err(RegistryError::UnitNotFound(unit_id.to_string())),
        }
    }

    #[instrument(skip(self, children), fields(children = children.len()))]
    fn subdivide_parcel(
        &self,
        parent_id: &str,
        children: Vec<ChildParcelSpec>,
    ) -> Result<Vec<Asset>, RegistryError> {
        let now = self.clock.now();
        let mut staged = self.stage();
        let mut parent = staged.load_asset(parent_id)?;
        for child in &children {
            if staged.exists(&child.parcel_id)? {
                return Err(RegistryError::AssetExists(child.parcel_id.clone()));
            }
        }

        let minted = registry_ops::subdivide(&mut parent, children, &self.config)?;

        staged.stage_asset(&parent)?;
        for child in &minted {
            staged.stage_asset(child)?;
        }
        let child_ids: Vec<String> = minted.iter().map(|c| c.asset_id.clone()).collect();
        staged.emit(RegistryEvent::ParcelSubdivided {
            asset_id: parent.asset_id.clone(),
            child_ids: child_ids.clone(),
            timestamp: now,
        });
        self.finish(staged, now)?;

        info!(asset_id = %parent.asset_id, ?child_ids, "Parcel subdivided");
        Ok(minted)
    }

    #[instrument(skip(self))]
    fn convert_land_use(&self, parcel_id: &str, new_use: LandUse) -> Result<Asset, RegistryError> {
        let now = self.clock.now();
        let mut staged = self.stage();
        let request = TransactionRequest {
            asset_id: Some(parcel_id.to_string()),
            approval_ref: None,
            evidence_ref: String::new(),
            workflow: Workflow::Conversion(ConversionPayload { new_use }),
        };
        dispatch::execute(&mut staged, request, now, &self.config)?;
        let asset = staged.load_asset(parcel_id)?;
        self.finish(staged, now)?;
        Ok(asset)
    }

    #[instrument(skip(self))]
    fn finalize_title(&self, parcel_id: &str) -> Result<Title, RegistryError> {
        let now = self.clock.now();
        let mut staged = self.stage();
        let mut asset = staged.load_asset(parcel_id)?;
        lifecycle::ensure_mutable(&asset)?;
        if asset.pending_dispute_count() > 0 {
            return Err(RegistryError::PendingDisputes(asset.asset_id));
        }

        asset.title.is_conclusive = true;
        asset.title.published_at = Some(now);

        staged.stage_asset(&asset)?;
        staged.emit(RegistryEvent::TitleFinalized {
            asset_id: asset.asset_id.clone(),
            title_id: asset.title.title_id.clone(),
            timestamp: now,
        });
        self.finish(staged, now)?;

        info!(asset_id = %asset.asset_id, title_id = %asset.title.title_id, "Title finalized");
        Ok(asset.title)
    }

    #[instrument(skip(self, payload_json, evidence_ref))]
    fn execute_transaction(
        &self,
        tx_type: &str,
        payload_json: &str,
        evidence_ref: &str,
    ) -> Result<ExecutionReceipt, RegistryError> {
        let request = TransactionRequest::parse(tx_type, payload_json, evidence_ref)?;
        let tag = request.workflow.tag();

        let now = self.clock.now();
        let mut staged = self.stage();
        let asset_ids = dispatch::execute(&mut staged, request, now, &self.config)?;
        let tx_id = self.finish(staged, now)?;

        Ok(ExecutionReceipt {
            tx_id,
            tx_type: tag.to_string(),
            asset_ids,
        })
    }

    fn get_payment_details(&self, utr: &str) -> Result<PaymentRecord, RegistryError> {
        self.stage()
            .find_payment(utr)?
            .ok_or_else(|| RegistryError::PaymentNotFound(utr.to_string()))
    }

    fn query_pending_mutations(&self) -> Result<Vec<Asset>, RegistryError> {
        let selector = Selector::new().where_in(
            "status",
            [
                AssetStatus::PendingMutation.as_str(),
                AssetStatus::PendingScrutiny.as_str(),
            ],
        );
        self.ledger
            .query(&selector)?
            .into_iter()
            .map(|(_, bytes)| shared_types::decode::<Asset>(&bytes).map_err(RegistryError::from))
            .collect()
    }

    fn get_parcel_history(&self, parcel_id: &str) -> Result<Vec<ParcelHistoryEntry>, RegistryError> {
        let history = self.ledger.history(parcel_id)?;
        if history.is_empty() {
            return Err(RegistryError::AssetNotFound(parcel_id.to_string()));
        }
        history
            .into_iter()
            .map(|entry| -> Result<ParcelHistoryEntry, RegistryError> {
                let asset = match entry.value.as_deref() {
                    Some(bytes) => Some(shared_types::decode(bytes)?),
                    None => None,
                };
                Ok(ParcelHistoryEntry {
                    tx_id: entry.tx_id,
                    timestamp: entry.timestamp,
                    is_delete: entry.is_delete,
                    asset,
                })
            })
            .collect()
    }
}
