//! Core record types of the land registry.
//!
//! An [`Asset`] is either a land Parcel or a strata Unit. Both share the same
//! composite record: descriptive attributes, an embedded [`Title`], the
//! Dispute and Charge registers and an optional [`PendingTransfer`].

use crate::registers::{Charge, Dispute, DisputeStatus, Register};
use crate::title::Title;
use serde::{Deserialize, Serialize};

/// Timestamp in milliseconds since UNIX epoch.
pub type Timestamp = u64;

/// Ledger key of an asset (ULPIN or legacy identifier).
pub type AssetId = String;

/// Lifecycle status of an asset.
///
/// ```text
///                 ┌── recordIntimation(charge) ──→ [LOCKED] ─┐
///                 ├── recordIntimation(dispute) ─→ [LITIGATION]
///  [FREE] ────────┼── REGISTER_ATS ──────────────→ [PENDING_ATS]
///    ↑            ├── INTIMATE_DEATH ────────────→ [LOCKED_FOR_SUCCESSION] ── INHERITANCE ──→ [FREE]
///    │            ├── SALE / GIFT ───────────────→ [PENDING_SCRUTINY] ── APPROVE_MUTATION ─→ [FREE]
///    │            ├── initiateTransfer ──────────→ [PENDING_MUTATION] ── approveMutation ──→ [FREE]
///    │            └── subdivide / amalgamate ────→ [RETIRED] (terminal)
///    └──── release / resolve (nothing blocking left) ───────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetStatus {
    #[default]
    Free,
    Locked,
    Litigation,
    Retired,
    PendingScrutiny,
    PendingAts,
    LockedForSuccession,
    PendingMutation,
}

wire_names!(AssetStatus, "status", {
    Free => "FREE",
    Locked => "LOCKED",
    Litigation => "LITIGATION",
    Retired => "RETIRED",
    PendingScrutiny => "PENDING_SCRUTINY",
    PendingAts => "PENDING_ATS",
    LockedForSuccession => "LOCKED_FOR_SUCCESSION",
    PendingMutation => "PENDING_MUTATION",
});

impl AssetStatus {
    /// Returns true for the terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Retired)
    }
}

/// Land-use category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LandUse {
    #[default]
    Agricultural,
    NonAgricultural,
    Residential,
    Commercial,
    Industrial,
    Forest,
    Reserved,
}

wire_names!(LandUse, "land use", {
    Agricultural => "AGRICULTURAL",
    NonAgricultural => "NON_AGRICULTURAL",
    Residential => "RESIDENTIAL",
    Commercial => "COMMERCIAL",
    Industrial => "INDUSTRIAL",
    Forest => "FOREST",
    Reserved => "RESERVED",
});

/// Administrative land category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LandCategory {
    #[default]
    General,
    TribalScheduled,
}

wire_names!(LandCategory, "land category", {
    General => "GENERAL",
    TribalScheduled => "TRIBAL_SCHEDULED",
});

/// Locale display unit for areas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocalUnit {
    Hectare,
    Acre,
    #[default]
    Guntha,
    Cent,
    Bigha,
}

wire_names!(LocalUnit, "local unit", {
    Hectare => "HECTARE",
    Acre => "ACRE",
    Guntha => "GUNTHA",
    Cent => "CENT",
    Bigha => "BIGHA",
});

/// Area expressed in a locale display unit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LocalMeasure {
    pub unit: LocalUnit,
    pub value: f64,
}

/// How a boundary was surveyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SurveyMethod {
    Ets,
    Gps,
    Drone,
    #[default]
    LegacyDigitized,
}

/// Structured boundary with derived measurements.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpatialRecord {
    /// Exterior ring as `[lon, lat]` pairs; first and last vertex coincide.
    pub ring: Vec<[f64; 2]>,
    /// Shoelace area in square metres.
    pub calculated_area_sqm: f64,
    /// `[lon, lat]`.
    pub centroid: [f64; 2],
    #[serde(default)]
    pub survey_method: SurveyMethod,
    #[serde(default)]
    pub accuracy_margin_m: f64,
}

/// Asset boundary: either an opaque polygon string or a structured record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Geometry {
    Raw { wkt: String },
    Spatial(SpatialRecord),
}

impl Default for Geometry {
    fn default() -> Self {
        Geometry::Raw { wkt: String::new() }
    }
}

impl Geometry {
    /// Returns the structured record, if any.
    pub fn spatial(&self) -> Option<&SpatialRecord> {
        match self {
            Geometry::Spatial(record) => Some(record),
            Geometry::Raw { .. } => None,
        }
    }
}

/// Statutory protection flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionFlags {
    /// Scheduled-area tribal land.
    pub tribal_protected: bool,
    /// Religious endowment; inalienable.
    pub religious_endowment: bool,
    /// Forest or coastal conservation zone.
    pub forest_conservation: bool,
}

impl ProtectionFlags {
    /// Union of two flag sets.
    pub fn merge(self, other: ProtectionFlags) -> ProtectionFlags {
        ProtectionFlags {
            tribal_protected: self.tribal_protected || other.tribal_protected,
            religious_endowment: self.religious_endowment || other.religious_endowment,
            forest_conservation: self.forest_conservation || other.forest_conservation,
        }
    }
}

/// Legal form of a strata building.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegalEntity {
    #[default]
    HousingSociety,
    Condominium,
}

/// Attributes carried only by strata Units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDetails {
    pub parent_id: AssetId,
    pub floor: i32,
    /// Carpet area in square metres.
    pub carpet_area: f64,
    /// Undivided share of the parent land, in percent.
    pub uds_percent: f64,
    pub occupancy_certificate_hash: Option<String>,
    pub rera_registration: Option<String>,
    #[serde(default)]
    pub legal_entity: LegalEntity,
}

/// Parcel or Unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "assetType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetKind {
    #[default]
    Parcel,
    Unit(UnitDetails),
}

/// Stamp duty paid on a transfer instrument.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StampDuty {
    pub challan_no: String,
    pub amount: f64,
    pub paid_at: Option<Timestamp>,
}

/// First phase of a two-phase transfer, awaiting officer approval.
///
/// Exists if and only if the owning asset is `PENDING_MUTATION`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTransfer {
    pub buyer_id: String,
    pub seller_id: String,
    pub share_percentage: f64,
    pub consideration: f64,
    #[serde(default)]
    pub witnesses: Vec<String>,
    pub duty: Option<StampDuty>,
    pub utr: String,
    pub requested_at: Timestamp,
    #[serde(default)]
    pub officer_approved: bool,
}

/// The composite registry record stored under an asset key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub asset_id: AssetId,
    #[serde(flatten)]
    pub kind: AssetKind,
    pub survey_no: String,
    pub sub_division: String,
    pub land_use: LandUse,
    pub land_category: LandCategory,
    pub tenure_type: String,
    /// Canonical area in hectares.
    pub area_hectares: f64,
    pub local_measure: LocalMeasure,
    pub geometry: Geometry,
    pub status: AssetStatus,
    pub protection: ProtectionFlags,
    pub doc_hash: String,
    /// Official 14-digit identifier when the key is a legacy id.
    pub ulpin: Option<String>,
    #[serde(default)]
    pub legacy_refs: Vec<String>,
    pub last_survey_ref: Option<String>,
    pub title: Title,
    pub disputes: Register<Dispute>,
    pub charges: Register<Charge>,
    pub pending_transfer: Option<PendingTransfer>,
    /// Start of the single-phase scrutiny timer.
    pub mutation_requested_at: Option<Timestamp>,
}

impl Asset {
    /// Creates a FREE parcel solely owned by `owner_id`, with empty registers.
    pub fn new_parcel(asset_id: impl Into<AssetId>, owner_id: impl Into<String>) -> Self {
        let asset_id = asset_id.into();
        let title = Title::sole(&asset_id, owner_id);
        Self {
            asset_id,
            kind: AssetKind::Parcel,
            survey_no: String::new(),
            sub_division: "0".to_string(),
            land_use: LandUse::default(),
            land_category: LandCategory::default(),
            tenure_type: "OCCUPANCY_CLASS_1".to_string(),
            area_hectares: 0.0,
            local_measure: LocalMeasure::default(),
            geometry: Geometry::default(),
            status: AssetStatus::Free,
            protection: ProtectionFlags::default(),
            doc_hash: String::new(),
            ulpin: None,
            legacy_refs: Vec::new(),
            last_survey_ref: None,
            title,
            disputes: Register::new(),
            charges: Register::new(),
            pending_transfer: None,
            mutation_requested_at: None,
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self.kind, AssetKind::Unit(_))
    }

    /// Returns the Unit attributes, if this is a Unit.
    pub fn unit(&self) -> Option<&UnitDetails> {
        match &self.kind {
            AssetKind::Unit(details) => Some(details),
            AssetKind::Parcel => None,
        }
    }

    /// Parent Parcel key for Units.
    pub fn parent_id(&self) -> Option<&str> {
        self.unit().map(|u| u.parent_id.as_str())
    }

    pub fn is_free(&self) -> bool {
        self.status == AssetStatus::Free
    }

    pub fn is_retired(&self) -> bool {
        self.status.is_terminal()
    }

    /// Number of disputes still pending.
    pub fn pending_dispute_count(&self) -> usize {
        self.disputes
            .iter()
            .filter(|d| d.status == DisputeStatus::Pending)
            .count()
    }

    /// Number of active charges that lock the asset.
    pub fn blocking_charge_count(&self) -> usize {
        self.charges
            .iter()
            .filter(|c| c.active && c.charge_type.is_blocking())
            .count()
    }

    /// Returns true if the land may not be developed or converted.
    pub fn is_conservation_land(&self) -> bool {
        self.land_use == LandUse::Forest || self.protection.forest_conservation
    }

    /// Returns true if the asset falls under tribal protection rules.
    pub fn is_tribal(&self) -> bool {
        self.protection.tribal_protected || self.land_category == LandCategory::TribalScheduled
    }
}
