//! Payment records, keyed by unique transaction reference (UTR).

use crate::entities::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Confirmed,
    Failed,
    EscrowLocked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentType {
    SalePrice,
    StampDuty,
}

/// A settled or escrowed payment. Its presence makes the UTR unusable again.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub utr: String,
    pub asset_id: String,
    pub amount: f64,
    pub payer_id: String,
    pub payee_id: String,
    pub recorded_at: Timestamp,
    pub status: PaymentStatus,
    pub payment_type: PaymentType,
}

/// Ledger key of the payment with reference `utr`.
pub fn payment_key(utr: &str) -> String {
    format!("PAY_{utr}")
}
