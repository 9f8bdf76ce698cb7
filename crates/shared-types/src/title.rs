//! Record of Title: who owns an asset and in what shares.

use crate::entities::Timestamp;
use serde::{Deserialize, Serialize};

/// Legal nature of an owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnerKind {
    #[default]
    Individual,
    Corporate,
    Government,
}

/// One owner's fractional holding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerShare {
    pub owner_id: String,
    pub share_percentage: f64,
    #[serde(default)]
    pub owner_kind: OwnerKind,
}

impl OwnerShare {
    pub fn new(owner_id: impl Into<String>, share_percentage: f64) -> Self {
        Self {
            owner_id: owner_id.into(),
            share_percentage,
            owner_kind: OwnerKind::Individual,
        }
    }
}

/// Summary of the instrument that last changed the title.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastTransaction {
    pub tx_type: String,
    pub executed_at: Timestamp,
    pub consideration: f64,
    pub duty_amount: Option<f64>,
    pub duty_reference: Option<String>,
    #[serde(default)]
    pub witnesses: Vec<String>,
}

/// Title record embedded in every asset.
///
/// The owner shares sum to 100 within the registry's share tolerance at
/// every point between invocations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Title {
    pub title_id: String,
    pub asset_id: String,
    pub owners: Vec<OwnerShare>,
    pub is_conclusive: bool,
    pub published_at: Option<Timestamp>,
    pub last_transaction: Option<LastTransaction>,
}

/// Title id derived from an asset key.
pub fn title_id(asset_id: &str) -> String {
    format!("TITLE_{asset_id}")
}

/// Rounding slack on top of the share tolerance; decimal percentages such
/// as 33.33 + 66.66 do not sum exactly in binary floating point.
pub const SHARE_SUM_SLACK: f64 = 1e-9;

/// Returns true if `total` lies in `[100 - tolerance, 100 + tolerance]`.
pub fn share_total_within(total: f64, tolerance: f64) -> bool {
    (total - 100.0).abs() <= tolerance + SHARE_SUM_SLACK
}

impl Title {
    /// A non-conclusive title with a single 100% owner.
    pub fn sole(asset_id: &str, owner_id: impl Into<String>) -> Self {
        Self {
            title_id: title_id(asset_id),
            asset_id: asset_id.to_string(),
            owners: vec![OwnerShare::new(owner_id, 100.0)],
            is_conclusive: false,
            published_at: None,
            last_transaction: None,
        }
    }

    /// Sum of all owner percentages.
    pub fn total_share(&self) -> f64 {
        self.owners.iter().map(|o| o.share_percentage).sum()
    }

    /// Returns true if the shares sum to 100 within `tolerance`.
    pub fn is_balanced(&self, tolerance: f64) -> bool {
        share_total_within(self.total_share(), tolerance)
    }

    /// Share held by `owner_id`, if they are an owner.
    pub fn share_of(&self, owner_id: &str) -> Option<f64> {
        self.owners
            .iter()
            .find(|o| o.owner_id == owner_id)
            .map(|o| o.share_percentage)
    }

    /// First listed owner.
    pub fn primary_owner(&self) -> Option<&str> {
        self.owners.first().map(|o| o.owner_id.as_str())
    }

    /// Re-points a cloned title at another asset.
    pub fn rekey(mut self, asset_id: &str) -> Self {
        self.title_id = title_id(asset_id);
        self.asset_id = asset_id.to_string();
        self
    }
}
