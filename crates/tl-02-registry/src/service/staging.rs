//! # Staged Ledger
//!
//! Read-your-writes overlay over a [`LedgerStore`] for one invocation.
//!
//! ```text
//! get ──→ staged write? ──yes──→ staged bytes
//!              │ no
//!              └──→ ledger.get ──→ version recorded in the read set
//!
//! commit ──→ WriteBatch { read set, writes } ──→ ledger.commit ──→ events enveloped
//! ```
//!
//! Nothing reaches the ledger before [`StagedLedger::commit`], so an error
//! returned earlier leaves no persisted state and no event.

use crate::domain::errors::RegistryError;
use crate::events::{EventEnvelope, RegistryEvent};
use crate::ports::outbound::{LedgerStore, TxId, WriteBatch};
use shared_types::{payment_key, Asset, PaymentRecord, PaymentStatus, Timestamp};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

pub struct StagedLedger<'a, L: LedgerStore + ?Sized> {
    ledger: &'a L,
    reads: HashMap<String, Option<u64>>,
    writes: BTreeMap<String, Vec<u8>>,
    events: Vec<RegistryEvent>,
}

impl<'a, L: LedgerStore + ?Sized> StagedLedger<'a, L> {
    pub fn new(ledger: &'a L) -> Self {
        Self {
            ledger,
            reads: HashMap::new(),
            writes: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    /// Current bytes of `key`, staged writes first.
    pub fn get_raw(&mut self, key: &str) -> Result<Option<Vec<u8>>, RegistryError> {
        if let Some(bytes) = self.writes.get(key) {
            return Ok(Some(bytes.clone()));
        }
        let value = self.ledger.get(key)?;
        self.reads
            .entry(key.to_string())
            .or_insert(value.as_ref().map(|v| v.version));
        Ok(value.map(|v| v.bytes))
    }

    /// Returns true if `key` holds a value, staged or persisted.
    pub fn exists(&mut self, key: &str) -> Result<bool, RegistryError> {
        Ok(self.get_raw(key)?.is_some())
    }

    pub fn find_asset(&mut self, asset_id: &str) -> Result<Option<Asset>, RegistryError> {
        match self.get_raw(asset_id)? {
            Some(bytes) => Ok(Some(shared_types::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn load_asset(&mut self, asset_id: &str) -> Result<Asset, RegistryError> {
        self.find_asset(asset_id)?
            .ok_or_else(|| RegistryError::AssetNotFound(asset_id.to_string()))
    }

    pub fn stage_asset(&mut self, asset: &Asset) -> Result<(), RegistryError> {
        self.writes
            .insert(asset.asset_id.clone(), shared_types::encode(asset)?);
        Ok(())
    }

    pub fn find_payment(&mut self, utr: &str) -> Result<Option<PaymentRecord>, RegistryError> {
        match self.get_raw(&payment_key(utr))? {
            Some(bytes) => Ok(Some(shared_types::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn stage_payment(&mut self, payment: &PaymentRecord) -> Result<(), RegistryError> {
        self.writes
            .insert(payment_key(&payment.utr), shared_types::encode(payment)?);
        Ok(())
    }

    /// Moves an escrow-locked payment to `status`. Settled or unknown
    /// payments are left alone.
    pub fn settle_escrow(
        &mut self,
        utr: &str,
        status: PaymentStatus,
    ) -> Result<Option<PaymentRecord>, RegistryError> {
        let Some(mut payment) = self.find_payment(utr)? else {
            return Ok(None);
        };
        if payment.status != PaymentStatus::EscrowLocked {
            return Ok(None);
        }
        payment.status = status;
        self.stage_payment(&payment)?;
        Ok(Some(payment))
    }

    pub fn emit(&mut self, event: RegistryEvent) {
        self.events.push(event);
    }

    /// Commits every staged write in one batch guarded by the read set.
    pub fn commit(self, now: Timestamp) -> Result<(TxId, Vec<EventEnvelope>), RegistryError> {
        let mut batch = WriteBatch::new(now);
        for (key, version) in self.reads {
            batch.expect_version(key, version);
        }
        for (key, bytes) in self.writes {
            batch.put(key, bytes);
        }

        let writes = batch.len();
        let tx_id = self.ledger.commit(batch)?;
        debug!(tx_id = %tx_id, writes, events = self.events.len(), "Invocation committed");

        let envelopes = self
            .events
            .into_iter()
            .map(|event| EventEnvelope::new(tx_id.clone(), event))
            .collect();
        Ok((tx_id, envelopes))
    }
}
