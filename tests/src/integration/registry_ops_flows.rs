//! # Registry Operation Flows
//!
//! Subdivision, amalgamation, strata units and boundary rectification.
//! Each writes several assets (or none) in one commit.

#[cfg(test)]
mod tests {
    use crate::fixtures::{transfer, Harness, DOC_HASH};
    use serde_json::json;
    use shared_types::{AssetKind, AssetStatus, ChargeType, LegalEntity};
    use tl_02_registry::{
        BoundaryInput, ChildParcelSpec, ErrorKind, GeoInput, IntimationRequest, LandRegistryApi,
        RegistryError, UnitSpec,
    };

    fn child(id: &str, area: f64) -> ChildParcelSpec {
        ChildParcelSpec {
            parcel_id: id.into(),
            sub_division: id.rsplit('_').next().unwrap_or("1").into(),
            area_hectares: area,
            boundary: None,
        }
    }

    fn unit(unit_id: &str, parent: &str, oc: Option<&str>) -> UnitSpec {
        UnitSpec {
            unit_id: unit_id.into(),
            parent_id: parent.into(),
            floor: 3,
            carpet_area: 85.0,
            owner_id: "FLAT_OWNER".into(),
            occupancy_certificate_hash: oc.map(str::to_string),
            rera_registration: Some("P52100012345".into()),
            legal_entity: LegalEntity::default(),
        }
    }

    fn mortgage(parcel: &str) -> IntimationRequest {
        IntimationRequest::Charge {
            parcel_id: parcel.into(),
            charge_type: ChargeType::Mortgage,
            holder: "HDFC".into(),
            amount: 1_000_000.0,
        }
    }

    // =========================================================================
    // SUBDIVISION
    // =========================================================================

    #[test]
    fn test_subdivision_area_mismatch_writes_nothing() {
        let h = Harness::new();
        h.parcel("PARCEL_100", "A", 10.0);

        let err = h
            .service
            .subdivide_parcel("PARCEL_100", vec![child("PARCEL_100_1", 4.0), child("PARCEL_100_2", 5.0)])
            .unwrap_err();
        assert!(matches!(err, RegistryError::AreaSumMismatch { .. }));
        assert_eq!(err.kind(), ErrorKind::ValidationFailure);

        assert_eq!(h.asset("PARCEL_100").status, AssetStatus::Free);
        assert!(h.service.get_parcel("PARCEL_100_1").is_err());
        assert_eq!(h.ledger.len(), 1);
    }

    #[test]
    fn test_subdivision_retires_parent() {
        let h = Harness::new();
        h.parcel("PARCEL_100", "A", 10.0);

        let children = h
            .service
            .subdivide_parcel("PARCEL_100", vec![child("PARCEL_100_1", 4.0), child("PARCEL_100_2", 6.0)])
            .unwrap();
        assert_eq!(children.len(), 2);

        let parent = h.asset("PARCEL_100");
        assert_eq!(parent.status, AssetStatus::Retired);
        for id in ["PARCEL_100_1", "PARCEL_100_2"] {
            let child = h.asset(id);
            assert_eq!(child.status, AssetStatus::Free);
            assert_eq!(child.title.primary_owner(), Some("A"));
            assert_eq!(child.legacy_refs, vec!["PARCEL_100"]);
        }
        assert_eq!(h.asset("PARCEL_100_2").area_hectares, 6.0);

        // retired assets reject every workflow
        let err = h
            .execute("SALE", json!({"parcelId": "PARCEL_100", "buyerId": "B"}))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Retired(_)));
    }

    #[test]
    fn test_subdivision_requires_free_parent() {
        let h = Harness::new();
        h.parcel("PARCEL_100", "A", 10.0);
        h.service.record_intimation(mortgage("PARCEL_100")).unwrap();

        let err = h
            .service
            .subdivide_parcel("PARCEL_100", vec![child("PARCEL_100_1", 10.0)])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
    }

    #[test]
    fn test_partition_among_co_owners() {
        let h = Harness::new();
        h.parcel("PARCEL_200", "A", 2.0);
        h.execute(
            "PARTITION",
            json!({
                "parcelId": "PARCEL_200",
                "subParcels": [
                    {"id": "PARCEL_200_A", "area": 1.2, "owner": "A", "surveySuffix": "1"},
                    {"id": "PARCEL_200_B", "area": 0.8, "owner": "B", "surveySuffix": "2"},
                ],
            }),
        )
        .unwrap();

        assert_eq!(h.asset("PARCEL_200").status, AssetStatus::Retired);
        let b = h.asset("PARCEL_200_B");
        assert_eq!(b.title.primary_owner(), Some("B"));
        assert_eq!(b.title.share_of("B"), Some(100.0));
    }

    // =========================================================================
    // AMALGAMATION
    // =========================================================================

    #[test]
    fn test_amalgamation_merges_areas() {
        let h = Harness::new();
        h.parcel("PARCEL_301", "FARMER", 10.0);
        h.parcel("PARCEL_302", "FARMER", 15.0);

        let receipt = h
            .execute(
                "AMALGAMATE_PARCELS",
                json!({"constituentParcelIds": ["PARCEL_301", "PARCEL_302"], "newParcelId": "PARCEL_303"}),
            )
            .unwrap();
        assert_eq!(receipt.asset_ids, vec!["PARCEL_303", "PARCEL_301", "PARCEL_302"]);

        let merged = h.asset("PARCEL_303");
        assert_eq!(merged.area_hectares, 25.0);
        assert_eq!(merged.title.primary_owner(), Some("FARMER"));
        assert_eq!(merged.title.owners.len(), 1);
        assert!(!merged.title.is_conclusive);
        assert_eq!(merged.status, AssetStatus::Free);
        assert_eq!(h.asset("PARCEL_301").status, AssetStatus::Retired);
        assert_eq!(h.asset("PARCEL_302").status, AssetStatus::Retired);
    }

    #[test]
    fn test_amalgamation_requires_one_owner() {
        let h = Harness::new();
        h.parcel("PARCEL_301", "A", 1.0);
        h.parcel("PARCEL_302", "B", 1.0);

        let err = h
            .execute(
                "AMALGAMATE_PARCELS",
                json!({"constituentParcelIds": ["PARCEL_301", "PARCEL_302"], "newParcelId": "PARCEL_303"}),
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::OwnershipMismatch { .. }));
        assert_eq!(h.asset("PARCEL_301").status, AssetStatus::Free);
        assert!(h.service.get_parcel("PARCEL_303").is_err());
    }

    #[test]
    fn test_amalgamation_requires_free_constituents() {
        let h = Harness::new();
        h.parcel("PARCEL_301", "A", 1.0);
        h.parcel("PARCEL_302", "A", 1.0);
        h.service.record_intimation(mortgage("PARCEL_302")).unwrap();

        let err = h
            .execute(
                "AMALGAMATE_PARCELS",
                json!({"constituentParcelIds": ["PARCEL_301", "PARCEL_302"], "newParcelId": "PARCEL_303"}),
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFree { ref asset_id, .. } if asset_id == "PARCEL_302"));
        assert_eq!(h.asset("PARCEL_301").status, AssetStatus::Free);
    }

    // =========================================================================
    // STRATA UNITS
    // =========================================================================

    #[test]
    fn test_strata_unit_needs_free_parent() {
        let h = Harness::new();
        h.parcel("PARCEL_400", "BUILDER", 1.0);
        h.service.record_intimation(mortgage("PARCEL_400")).unwrap();

        let err = h
            .service
            .create_strata_unit(unit("PARCEL_400_U1", "PARCEL_400", None))
            .unwrap_err();
        assert!(matches!(err, RegistryError::ParentNotFree { .. }));
        assert!(matches!(
            h.service.get_strata_unit("PARCEL_400_U1"),
            Err(RegistryError::UnitNotFound(_))
        ));
    }

    #[test]
    fn test_strata_unit_details() {
        let h = Harness::new();
        h.parcel("PARCEL_400", "BUILDER", 1.0);
        h.service
            .create_strata_unit(unit("PARCEL_400_U1", "PARCEL_400", Some(DOC_HASH)))
            .unwrap();

        let flat = h.service.get_strata_unit("PARCEL_400_U1").unwrap();
        assert_eq!(flat.title.primary_owner(), Some("FLAT_OWNER"));
        match &flat.kind {
            AssetKind::Unit(details) => {
                assert_eq!(details.parent_id, "PARCEL_400");
                assert_eq!(details.floor, 3);
                assert_eq!(details.carpet_area, 85.0);
            }
            other => panic!("expected a unit, got {other:?}"),
        }
        // parcels are not units
        assert!(h.service.get_strata_unit("PARCEL_400").is_err());
    }

    #[test]
    fn test_unit_transfer_needs_occupancy_certificate() {
        let h = Harness::new();
        h.parcel("PARCEL_400", "BUILDER", 1.0);
        h.service
            .create_strata_unit(unit("PARCEL_400_U1", "PARCEL_400", None))
            .unwrap();
        h.service
            .create_strata_unit(unit("PARCEL_400_U2", "PARCEL_400", Some(DOC_HASH)))
            .unwrap();

        let err = h
            .service
            .initiate_transfer(transfer("PARCEL_400_U1", "FLAT_OWNER", "B", 100.0, "UTR_U1"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthorizationDenied);
        assert_eq!(h.asset("PARCEL_400_U1").status, AssetStatus::Free);

        h.service
            .initiate_transfer(transfer("PARCEL_400_U2", "FLAT_OWNER", "B", 100.0, "UTR_U2"))
            .unwrap();
        assert_eq!(h.asset("PARCEL_400_U2").status, AssetStatus::PendingMutation);
    }

    #[test]
    fn test_parent_lock_blocks_unit_workflows() {
        let h = Harness::new();
        h.parcel("PARCEL_400", "BUILDER", 1.0);
        h.service
            .create_strata_unit(unit("PARCEL_400_U1", "PARCEL_400", Some(DOC_HASH)))
            .unwrap();
        h.service.record_intimation(mortgage("PARCEL_400")).unwrap();

        let err = h
            .execute("GIFT", json!({"parcelId": "PARCEL_400_U1", "doneeId": "B"}))
            .unwrap_err();
        assert!(matches!(err, RegistryError::ParentNotFree { .. }));
    }

    // =========================================================================
    // BOUNDARY RECTIFICATION
    // =========================================================================

    #[test]
    fn test_rectify_boundary_validates_ulpin() {
        let h = Harness::new();
        h.parcel("PARCEL_500", "A", 1.0);

        let err = h
            .execute(
                "RECTIFY_BOUNDARY",
                json!({"parcelId": "PARCEL_500", "newGeoJson": "POLYGON((0 0, 0 5, 5 5, 5 0, 0 0))", "newUlpin": "1234"}),
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::Format(_)));
        assert!(h.asset("PARCEL_500").ulpin.is_none());

        h.execute(
            "RECTIFY_BOUNDARY",
            json!({
                "parcelId": "PARCEL_500",
                "newGeoJson": "POLYGON((0 0, 0 5, 5 5, 5 0, 0 0))",
                "newUlpin": "12345678901234",
                "surveyRef": "SURVEY_2024_17",
            }),
        )
        .unwrap();
        let asset = h.asset("PARCEL_500");
        assert_eq!(asset.ulpin.as_deref(), Some("12345678901234"));
        assert_eq!(asset.last_survey_ref.as_deref(), Some("SURVEY_2024_17"));
    }

    #[test]
    fn test_rectify_boundary_recomputes_area() {
        let h = Harness::new();
        h.parcel("PARCEL_501", "A", 5.0);

        let ring = GeoInput::from(BoundaryInput::Ring {
            ring: vec![
                [73.800, 18.500],
                [73.801, 18.500],
                [73.801, 18.501],
                [73.800, 18.501],
                [73.800, 18.500],
            ],
            claimed_area_sqm: None,
            survey_method: Default::default(),
            accuracy_margin_m: 0.0,
        });
        h.execute(
            "RECTIFY_BOUNDARY",
            json!({"parcelId": "PARCEL_501", "newGeoJson": ring}),
        )
        .unwrap();

        let area = h.asset("PARCEL_501").area_hectares;
        assert!((1.0..1.4).contains(&area), "area {area}");
    }
}
