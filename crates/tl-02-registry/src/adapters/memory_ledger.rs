//! # In-Memory Ledger
//!
//! [`LedgerStore`] kept in process memory. Commits are batch-atomic under a
//! single write lock and rejected when any key in the batch's read set has
//! moved to another version since it was read.
//!
//! Keys are held in a `BTreeMap` so queries return records in key order.

use crate::ports::outbound::{
    HistoryEntry, LedgerError, LedgerStore, Selector, TxId, VersionedValue, WriteBatch,
};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

#[derive(Debug, Default)]
struct Slot {
    current: Option<Vec<u8>>,
    version: u64,
    history: Vec<HistoryEntry>,
}

impl Slot {
    /// Version visible to readers; a deleted key reads as absent.
    fn visible_version(&self) -> Option<u64> {
        self.current.as_ref().map(|_| self.version)
    }
}

/// In-memory ledger with per-key versions and history.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    slots: RwLock<BTreeMap<String, Slot>>,
    unavailable: AtomicBool,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent commit fail with `Unavailable` (or recover).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of keys currently holding a value.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter(|s| s.current.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LedgerStore for InMemoryLedger {
    fn get(&self, key: &str) -> Result<Option<VersionedValue>, LedgerError> {
        let slots = self.slots.read();
        Ok(slots.get(key).and_then(|slot| {
            slot.current.as_ref().map(|bytes| VersionedValue {
                bytes: bytes.clone(),
                version: slot.version,
            })
        }))
    }

    fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), LedgerError> {
        let mut batch = WriteBatch::new(0);
        batch.put(key, bytes);
        self.commit(batch).map(|_| ())
    }

    fn query(&self, selector: &Selector) -> Result<Vec<(String, Vec<u8>)>, LedgerError> {
        let slots = self.slots.read();
        let mut matches = Vec::new();
        for (key, slot) in slots.iter() {
            let Some(bytes) = slot.current.as_ref() else {
                continue;
            };
            let doc: serde_json::Value = serde_json::from_slice(bytes)
                .map_err(|e| LedgerError::Corrupted(format!("{key}: {e}")))?;
            if selector.matches(&doc) {
                matches.push((key.clone(), bytes.clone()));
            }
        }
        Ok(matches)
    }

    fn history(&self, key: &str) -> Result<Vec<HistoryEntry>, LedgerError> {
        Ok(self
            .slots
            .read()
            .get(key)
            .map(|slot| slot.history.clone())
            .unwrap_or_default())
    }

    fn commit(&self, batch: WriteBatch) -> Result<TxId, LedgerError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("ledger offline".into()));
        }

        let mut slots = self.slots.write();
        for (key, expected) in batch.read_set() {
            let found = slots.get(key).and_then(Slot::visible_version);
            if found != *expected {
                return Err(LedgerError::Conflict {
                    key: key.clone(),
                    expected: *expected,
                    found,
                });
            }
        }

        let tx_id = batch.tx_id();
        for (key, value) in batch.entries() {
            let slot = slots.entry(key.to_string()).or_default();
            slot.version += 1;
            slot.current = value.map(<[u8]>::to_vec);
            slot.history.push(HistoryEntry {
                tx_id: tx_id.clone(),
                timestamp: batch.timestamp(),
                is_delete: value.is_none(),
                value: value.map(<[u8]>::to_vec),
            });
        }
        debug!(tx_id = %tx_id, writes = batch.len(), "Committed write batch");
        Ok(tx_id)
    }
}
