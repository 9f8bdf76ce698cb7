//! # Outbound Ports (Driven Ports)
//!
//! Dependencies the registry requires from its host:
//!
//! | Port | Purpose |
//! |------|---------|
//! | [`LedgerStore`] | Key/value persistence, selector query, per-key history |
//! | [`TimeSource`] | Current time for timers and record stamps |
//! | [`RegistryEventPublisher`] | Delivery of committed domain events |

use crate::events::EventEnvelope;
use serde_json::Value;
use sha2::{Digest, Sha256};
use shared_types::Timestamp;
use std::sync::Arc;
use thiserror::Error;

// =============================================================================
// LEDGER STORE
// =============================================================================

/// Identifier of a committed write batch.
pub type TxId = String;

/// Stored bytes together with the per-key version they were written at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedValue {
    pub bytes: Vec<u8>,
    pub version: u64,
}

/// One change in a key's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub tx_id: TxId,
    pub timestamp: Timestamp,
    pub is_delete: bool,
    pub value: Option<Vec<u8>>,
}

/// A single predicate over a dotted JSON path.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq { path: String, value: Value },
    In { path: String, values: Vec<Value> },
}

/// Conjunction of predicates, evaluated against each stored JSON document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selector {
    predicates: Vec<Predicate>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the value at `path` to equal `value`.
    pub fn where_eq(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate::Eq {
            path: path.into(),
            value: value.into(),
        });
        self
    }

    /// Requires the value at `path` to be one of `values`.
    pub fn where_in<V: Into<Value>>(
        mut self,
        path: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.predicates.push(Predicate::In {
            path: path.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Evaluates the selector against a decoded document.
    pub fn matches(&self, doc: &Value) -> bool {
        self.predicates.iter().all(|p| match p {
            Predicate::Eq { path, value } => lookup(doc, path) == Some(value),
            Predicate::In { path, values } => {
                lookup(doc, path).is_some_and(|found| values.contains(found))
            }
        })
    }
}

fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |node, segment| node.get(segment))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum WriteOp {
    Put(Vec<u8>),
    Delete,
}

/// All writes of one invocation, applied as a unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    timestamp: Timestamp,
    writes: Vec<(String, WriteOp)>,
    read_set: Vec<(String, Option<u64>)>,
}

impl WriteBatch {
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            ..Default::default()
        }
    }

    pub fn put(&mut self, key: impl Into<String>, bytes: Vec<u8>) {
        self.writes.push((key.into(), WriteOp::Put(bytes)));
    }

    pub fn delete(&mut self, key: impl Into<String>) {
        self.writes.push((key.into(), WriteOp::Delete));
    }

    /// Records the version a key had when it was read (`None` = absent).
    pub fn expect_version(&mut self, key: impl Into<String>, version: Option<u64>) {
        self.read_set.push((key.into(), version));
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Keys written, in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.writes.iter().map(|(k, _)| k.as_str())
    }

    /// Written values in order; `None` for deletions.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Option<&[u8]>)> {
        self.writes.iter().map(|(k, op)| match op {
            WriteOp::Put(bytes) => (k.as_str(), Some(bytes.as_slice())),
            WriteOp::Delete => (k.as_str(), None),
        })
    }

    /// Versions observed during the invocation.
    pub fn read_set(&self) -> &[(String, Option<u64>)] {
        &self.read_set
    }

    /// Content-derived transaction id (sha256 over timestamp and writes).
    pub fn tx_id(&self) -> TxId {
        let mut hasher = Sha256::new();
        hasher.update(self.timestamp.to_be_bytes());
        for (key, value) in self.entries() {
            hasher.update((key.len() as u64).to_be_bytes());
            hasher.update(key.as_bytes());
            match value {
                Some(bytes) => {
                    hasher.update([1u8]);
                    hasher.update((bytes.len() as u64).to_be_bytes());
                    hasher.update(bytes);
                }
                None => hasher.update([0u8]),
            }
        }
        hex::encode(hasher.finalize())
    }
}

/// Ledger errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// A key read during the invocation changed before commit.
    #[error("Write conflict on key {key}: read version {expected:?}, found {found:?}")]
    Conflict {
        key: String,
        expected: Option<u64>,
        found: Option<u64>,
    },

    #[error("Ledger unavailable: {0}")]
    Unavailable(String),

    #[error("Stored record is not a JSON document: {0}")]
    Corrupted(String),
}

/// Key/value persistence provided by the host ledger.
pub trait LedgerStore: Send + Sync {
    /// Reads the current value of `key`.
    fn get(&self, key: &str) -> Result<Option<VersionedValue>, LedgerError>;

    /// Writes a single key outside any batch.
    fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), LedgerError>;

    /// Returns every `(key, value)` whose JSON document matches `selector`.
    fn query(&self, selector: &Selector) -> Result<Vec<(String, Vec<u8>)>, LedgerError>;

    /// Full change log of `key`, oldest first.
    fn history(&self, key: &str) -> Result<Vec<HistoryEntry>, LedgerError>;

    /// Applies a batch. The default applies puts in order and ignores the
    /// read set; hosts with native transactions override it.
    fn commit(&self, batch: WriteBatch) -> Result<TxId, LedgerError> {
        let tx_id = batch.tx_id();
        for (key, value) in batch.entries() {
            match value {
                Some(bytes) => self.put(key, bytes.to_vec())?,
                None => {
                    return Err(LedgerError::Unavailable(
                        "deletes require a transactional ledger".into(),
                    ))
                }
            }
        }
        Ok(tx_id)
    }
}

impl<L: LedgerStore + ?Sized> LedgerStore for Arc<L> {
    fn get(&self, key: &str) -> Result<Option<VersionedValue>, LedgerError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), LedgerError> {
        (**self).put(key, bytes)
    }

    fn query(&self, selector: &Selector) -> Result<Vec<(String, Vec<u8>)>, LedgerError> {
        (**self).query(selector)
    }

    fn history(&self, key: &str) -> Result<Vec<HistoryEntry>, LedgerError> {
        (**self).history(key)
    }

    fn commit(&self, batch: WriteBatch) -> Result<TxId, LedgerError> {
        (**self).commit(batch)
    }
}

// =============================================================================
// TIME SOURCE
// =============================================================================

/// Time source for consistent timestamp handling.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp in milliseconds.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

// =============================================================================
// EVENT PUBLISHER
// =============================================================================

/// Error type for publish operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PublishError {
    #[error("Event sink not connected")]
    NotConnected,
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Delivers committed domain events to subscribers.
///
/// Called only after the ledger accepted the invocation's writes.
pub trait RegistryEventPublisher: Send + Sync {
    fn publish(&self, event: &EventEnvelope) -> Result<(), PublishError>;
}

impl<P: RegistryEventPublisher + ?Sized> RegistryEventPublisher for Arc<P> {
    fn publish(&self, event: &EventEnvelope) -> Result<(), PublishError> {
        (**self).publish(event)
    }
}
