//! Register of Disputes and Register of Charges.
//!
//! Both are append-only: entries are never removed, only flipped inactive or
//! resolved, so the scoped sequence `len + 1` never hands out an id twice.

use crate::entities::Timestamp;
use serde::{Deserialize, Serialize};

/// Entries addressable by their scoped id.
pub trait RegisterEntry {
    fn entry_id(&self) -> &str;
}

/// Append-only sequence of entries with monotonically increasing ids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Register<T> {
    entries: Vec<T>,
}

impl<T> Default for Register<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: RegisterEntry> Register<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence number the next entry will receive (1-based).
    pub fn next_seq(&self) -> u64 {
        self.entries.len() as u64 + 1
    }

    /// Appends the entry built for the next sequence number and returns it.
    pub fn append(&mut self, build: impl FnOnce(u64) -> T) -> &T {
        let entry = build(self.next_seq());
        let index = self.entries.len();
        self.entries.push(entry);
        &self.entries[index]
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.iter().find(|e| e.entry_id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.entries.iter_mut().find(|e| e.entry_id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// CHARGES
// =============================================================================

/// Kind of encumbrance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargeType {
    Mortgage,
    Lease,
    Easement,
    TaxDefault,
    GovernmentCharge,
}

wire_names!(ChargeType, "charge type", {
    Mortgage => "MORTGAGE",
    Lease => "LEASE",
    Easement => "EASEMENT",
    TaxDefault => "TAX_DEFAULT",
    GovernmentCharge => "GOVERNMENT_CHARGE",
});

impl ChargeType {
    /// Mortgages and tax defaults lock the asset while active.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Mortgage | Self::TaxDefault)
    }
}

/// Entry in the Register of Charges.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Charge {
    pub charge_id: String,
    pub asset_id: String,
    pub charge_type: ChargeType,
    pub holder: String,
    pub amount: f64,
    pub active: bool,
    pub recorded_at: Timestamp,
}

impl RegisterEntry for Charge {
    fn entry_id(&self) -> &str {
        &self.charge_id
    }
}

/// Scoped charge id for sequence `seq`.
pub fn charge_id(seq: u64) -> String {
    format!("CHG_{seq}")
}

// =============================================================================
// DISPUTES
// =============================================================================

/// Kind of legal claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeType {
    CivilSuit,
    StatutoryAttachment,
    RevenueAppeal,
}

wire_names!(DisputeType, "dispute type", {
    CivilSuit => "CIVIL_SUIT",
    StatutoryAttachment => "STATUTORY_ATTACHMENT",
    RevenueAppeal => "REVENUE_APPEAL",
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeStatus {
    Pending,
    Resolved,
}

/// Entry in the Register of Disputes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dispute {
    pub dispute_id: String,
    pub asset_id: String,
    pub court_id: String,
    pub dispute_type: DisputeType,
    /// e-Courts case record number.
    pub case_number: Option<String>,
    pub status: DisputeStatus,
    pub recorded_at: Timestamp,
    pub resolution: Option<String>,
}

impl RegisterEntry for Dispute {
    fn entry_id(&self) -> &str {
        &self.dispute_id
    }
}

/// Scoped dispute id for sequence `seq`.
pub fn dispute_id(seq: u64) -> String {
    format!("DSP_{seq}")
}
