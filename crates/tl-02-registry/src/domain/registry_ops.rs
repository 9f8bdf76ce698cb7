//! # Registry Operations
//!
//! Operations that create or retire assets. Every function validates all of
//! its inputs before touching the source asset(s), so a returned error leaves
//! them exactly as they were loaded.
//!
//! | Operation | Sources | Outputs |
//! |-----------|---------|---------|
//! | [`subdivide`] | 1 FREE parcel → RETIRED | N FREE children, cloned title |
//! | [`partition`] | 1 FREE parcel → RETIRED | N FREE children, sole-owner titles |
//! | [`amalgamate`] | ≥ 2 FREE parcels → RETIRED | 1 FREE parcel, non-conclusive title |
//! | [`mint_unit`] | FREE parent (read only) | 1 FREE strata unit |
//! | [`rectify_boundary`] | 1 asset (in place) | - |

use crate::config::RegistryConfig;
use crate::domain::boundary::{self, BoundaryInput, GeoInput};
use crate::domain::errors::RegistryError;
use crate::domain::lifecycle;
use serde::{Deserialize, Serialize};
use shared_types::{
    Asset, AssetKind, AssetStatus, Geometry, LegalEntity, LocalMeasure, ProtectionFlags, Register,
    Timestamp, Title, UnitDetails,
};
use std::collections::HashSet;
use tl_01_validators::format;

/// A child to mint from a subdivided parent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildParcelSpec {
    pub parcel_id: String,
    pub sub_division: String,
    #[serde(alias = "area")]
    pub area_hectares: f64,
    #[serde(default, alias = "geoJson")]
    pub boundary: Option<GeoInput>,
}

/// A child of a partition, owned solely by `owner`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubParcel {
    pub id: String,
    pub area: f64,
    pub owner: String,
    pub survey_suffix: String,
}

/// A strata unit to mint on top of a parcel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSpec {
    pub unit_id: String,
    #[serde(alias = "parentParcelId")]
    pub parent_id: String,
    pub floor: i32,
    /// Square metres.
    pub carpet_area: f64,
    pub owner_id: String,
    #[serde(default)]
    pub occupancy_certificate_hash: Option<String>,
    #[serde(default)]
    pub rera_registration: Option<String>,
    #[serde(default)]
    pub legal_entity: LegalEntity,
}

/// Undivided land share assigned to a new unit.
pub const DEFAULT_UDS_PERCENT: f64 = 1.0;

fn local_measure(hectares: f64, like: &LocalMeasure) -> LocalMeasure {
    LocalMeasure {
        unit: like.unit,
        value: format::calculate_local_unit(hectares, like.unit),
    }
}

fn ensure_parcel(asset: &Asset, operation: &str) -> Result<(), RegistryError> {
    if asset.is_unit() {
        return Err(RegistryError::InvalidRequest(format!(
            "{operation} applies to parcels; {} is a strata unit",
            asset.asset_id
        )));
    }
    Ok(())
}

/// Checks child ids and areas against the parent before anything is minted.
fn validate_children<'a>(
    parent: &Asset,
    children: impl IntoIterator<Item = (&'a str, f64)>,
    config: &RegistryConfig,
) -> Result<(), RegistryError> {
    let mut seen = HashSet::new();
    let mut total = 0.0;
    for (id, area) in children {
        format::validate_asset_id(id, config.allow_legacy_ids)?;
        if id == parent.asset_id || !seen.insert(id) {
            return Err(RegistryError::InvalidRequest(format!(
                "child id {id} is not unique"
            )));
        }
        if !(area.is_finite() && area > 0.0) {
            return Err(RegistryError::InvalidRequest(format!(
                "child {id} has invalid area {area}"
            )));
        }
        total += area;
    }
    if seen.is_empty() {
        return Err(RegistryError::InvalidRequest(
            "at least one child is required".into(),
        ));
    }
    if (total - parent.area_hectares).abs() > config.area_tolerance_hectares {
        return Err(RegistryError::AreaSumMismatch {
            children: total,
            parent: parent.area_hectares,
        });
    }
    Ok(())
}

/// Clones `parent` into a fresh FREE child with empty registers.
fn mint_child(parent: &Asset, child_id: &str, area_hectares: f64) -> Asset {
    let mut child = parent.clone();
    child.asset_id = child_id.to_string();
    child.kind = AssetKind::Parcel;
    child.area_hectares = area_hectares;
    child.local_measure = local_measure(area_hectares, &parent.local_measure);
    child.geometry = Geometry::default();
    child.status = AssetStatus::Free;
    child.ulpin = None;
    child.legacy_refs = vec![parent.asset_id.clone()];
    child.last_survey_ref = None;
    child.title = parent.title.clone().rekey(child_id);
    child.disputes = Register::new();
    child.charges = Register::new();
    child.pending_transfer = None;
    child.mutation_requested_at = None;
    child
}

/// Splits a FREE parcel into children that inherit its title.
pub fn subdivide(
    parent: &mut Asset,
    specs: Vec<ChildParcelSpec>,
    config: &RegistryConfig,
) -> Result<Vec<Asset>, RegistryError> {
    ensure_parcel(parent, "subdivideParcel")?;
    lifecycle::ensure_free(parent, "subdivideParcel")?;
    validate_children(
        parent,
        specs.iter().map(|s| (s.parcel_id.as_str(), s.area_hectares)),
        config,
    )?;

    let mut children = Vec::with_capacity(specs.len());
    for spec in specs {
        let mut child = mint_child(parent, &spec.parcel_id, spec.area_hectares);
        child.sub_division = spec.sub_division;
        if let Some(input) = spec.boundary {
            child.geometry =
                boundary::resolve(input.into(), Some(spec.area_hectares), config)?.geometry;
        }
        children.push(child);
    }

    parent.status = AssetStatus::Retired;
    Ok(children)
}

/// Splits a FREE parcel among co-owners, each child held solely.
pub fn partition(
    parent: &mut Asset,
    sub_parcels: &[SubParcel],
    now: Timestamp,
    config: &RegistryConfig,
) -> Result<Vec<Asset>, RegistryError> {
    ensure_parcel(parent, "PARTITION")?;
    lifecycle::ensure_free(parent, "PARTITION")?;
    validate_children(
        parent,
        sub_parcels.iter().map(|s| (s.id.as_str(), s.area)),
        config,
    )?;
    if let Some(blank) = sub_parcels.iter().find(|s| s.owner.trim().is_empty()) {
        return Err(RegistryError::InvalidRequest(format!(
            "sub-parcel {} has no owner",
            blank.id
        )));
    }

    let children = sub_parcels
        .iter()
        .map(|sub| {
            let mut child = mint_child(parent, &sub.id, sub.area);
            child.sub_division = format!("{}/{}", parent.sub_division, sub.survey_suffix);
            child.title = Title::sole(&sub.id, sub.owner.as_str());
            child.title.published_at = Some(now);
            child
        })
        .collect();

    parent.status = AssetStatus::Retired;
    Ok(children)
}

/// Merges FREE parcels of one primary owner into `new_id`.
///
/// The caller has already checked that `new_id` is unused.
pub fn amalgamate(
    constituents: &mut [Asset],
    new_id: &str,
    new_boundary: Option<BoundaryInput>,
    config: &RegistryConfig,
) -> Result<Asset, RegistryError> {
    if constituents.len() < 2 {
        return Err(RegistryError::InvalidRequest(
            "Amalgamation requires at least two parcels.".into(),
        ));
    }
    format::validate_asset_id(new_id, config.allow_legacy_ids)?;

    let mut seen = HashSet::new();
    let mut expected_owner: Option<String> = None;
    for asset in constituents.iter() {
        if asset.asset_id == new_id || !seen.insert(asset.asset_id.as_str()) {
            return Err(RegistryError::InvalidRequest(format!(
                "parcel {} is listed more than once",
                asset.asset_id
            )));
        }
        ensure_parcel(asset, "AMALGAMATE_PARCELS")?;
        if !asset.is_free() {
            return Err(RegistryError::NotFree {
                asset_id: asset.asset_id.clone(),
                status: asset.status,
            });
        }
        let owner = asset.title.primary_owner().unwrap_or_default();
        match &expected_owner {
            None => expected_owner = Some(owner.to_string()),
            Some(expected) if expected != owner => {
                return Err(RegistryError::OwnershipMismatch {
                    expected: expected.clone(),
                    found: owner.to_string(),
                    asset_id: asset.asset_id.clone(),
                })
            }
            Some(_) => {}
        }
    }

    let first = &constituents[0];
    let area: f64 = constituents.iter().map(|a| a.area_hectares).sum();
    let protection = constituents
        .iter()
        .fold(ProtectionFlags::default(), |acc, a| acc.merge(a.protection));

    let mut merged = Asset::new_parcel(new_id, expected_owner.unwrap_or_default());
    merged.survey_no = first.survey_no.clone();
    merged.land_use = first.land_use;
    merged.land_category = first.land_category;
    merged.tenure_type = first.tenure_type.clone();
    merged.area_hectares = area;
    merged.local_measure = local_measure(area, &first.local_measure);
    merged.protection = protection;
    merged.doc_hash = first.doc_hash.clone();
    merged.legacy_refs = constituents.iter().map(|a| a.asset_id.clone()).collect();
    if let Some(input) = new_boundary {
        merged.geometry = boundary::resolve(input, Some(area), config)?.geometry;
    }

    for asset in constituents.iter_mut() {
        asset.status = AssetStatus::Retired;
    }
    Ok(merged)
}

/// Mints a strata unit on a FREE parent parcel.
///
/// The caller has already checked that the unit id is unused.
pub fn mint_unit(
    parent: &Asset,
    spec: &UnitSpec,
    config: &RegistryConfig,
) -> Result<Asset, RegistryError> {
    ensure_parcel(parent, "createStrataUnit")?;
    if !parent.is_free() {
        return Err(RegistryError::ParentNotFree {
            parent_id: parent.asset_id.clone(),
            status: parent.status,
        });
    }
    format::validate_asset_id(&spec.unit_id, config.allow_legacy_ids)?;
    if !(spec.carpet_area.is_finite() && spec.carpet_area > 0.0) {
        return Err(RegistryError::InvalidRequest(format!(
            "invalid carpet area {}",
            spec.carpet_area
        )));
    }
    if spec.owner_id.trim().is_empty() {
        return Err(RegistryError::InvalidRequest("ownerId is required".into()));
    }
    if let Some(rera) = spec.rera_registration.as_deref() {
        format::validate_rera(rera)?;
    }
    if let Some(oc) = spec.occupancy_certificate_hash.as_deref() {
        format::validate_doc_hash(oc)?;
    }

    let area_hectares = spec.carpet_area / 10_000.0;
    let mut unit = Asset::new_parcel(spec.unit_id.as_str(), spec.owner_id.as_str());
    unit.kind = AssetKind::Unit(UnitDetails {
        parent_id: parent.asset_id.clone(),
        floor: spec.floor,
        carpet_area: spec.carpet_area,
        uds_percent: DEFAULT_UDS_PERCENT,
        occupancy_certificate_hash: spec.occupancy_certificate_hash.clone(),
        rera_registration: spec.rera_registration.clone(),
        legal_entity: spec.legal_entity,
    });
    unit.survey_no = parent.survey_no.clone();
    unit.sub_division = parent.sub_division.clone();
    unit.land_use = parent.land_use;
    unit.land_category = parent.land_category;
    unit.protection = parent.protection;
    unit.area_hectares = area_hectares;
    unit.local_measure = local_measure(area_hectares, &parent.local_measure);
    Ok(unit)
}

/// Replaces an asset's boundary, optionally assigning a new ULPIN.
pub fn rectify_boundary(
    asset: &mut Asset,
    new_boundary: BoundaryInput,
    survey_ref: Option<String>,
    new_ulpin: Option<&str>,
    config: &RegistryConfig,
) -> Result<(), RegistryError> {
    lifecycle::ensure_mutable(asset)?;
    if let Some(ulpin) = new_ulpin {
        format::validate_ulpin(ulpin)?;
    }
    let resolved = boundary::resolve(new_boundary, None, config)?;

    asset.geometry = resolved.geometry;
    if let Some(hectares) = resolved.computed_hectares {
        asset.area_hectares = hectares;
        asset.local_measure = local_measure(hectares, &asset.local_measure);
    }
    if let Some(ulpin) = new_ulpin {
        asset.ulpin = Some(ulpin.to_string());
    }
    if survey_ref.is_some() {
        asset.last_survey_ref = survey_ref;
    }
    Ok(())
}
