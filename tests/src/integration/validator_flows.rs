//! # Validator Flows
//!
//! Spatial, zoning and protected-land rules as they surface through the
//! registry: a failed check writes nothing and reports a stable kind.

#[cfg(test)]
mod tests {
    use crate::fixtures::{transfer, Harness, DOC_HASH};
    use serde_json::json;
    use shared_types::{AssetStatus, LandCategory, LandUse, ProtectionFlags};
    use tl_01_validators::zoning::{RestrictedZone, ZoneSeverity};
    use tl_01_validators::{spatial, ComplianceError, SpatialError};
    use tl_02_registry::{
        BoundaryInput, CreateParcelRequest, ErrorKind, LandRegistryApi, RegistryConfig,
        RegistryError,
    };

    fn ring() -> Vec<[f64; 2]> {
        vec![
            [73.800, 18.500],
            [73.801, 18.500],
            [73.801, 18.501],
            [73.800, 18.501],
            [73.800, 18.500],
        ]
    }

    fn ring_request(id: &str, ring: Vec<[f64; 2]>, claimed_sqm: Option<f64>) -> CreateParcelRequest {
        CreateParcelRequest::new(
            id,
            "SURVEYED_OWNER",
            BoundaryInput::Ring {
                ring,
                claimed_area_sqm: claimed_sqm,
                survey_method: Default::default(),
                accuracy_margin_m: 0.5,
            },
            DOC_HASH,
        )
    }

    fn zone(severity: ZoneSeverity) -> RestrictedZone {
        RestrictedZone {
            name: "MILITARY_CANTONMENT".into(),
            bbox: [73.79, 18.49, 73.81, 18.51],
            severity,
        }
    }

    fn with_zone(severity: ZoneSeverity) -> Harness {
        Harness::with_config(RegistryConfig {
            restricted_zones: vec![zone(severity)],
            ..RegistryConfig::for_testing()
        })
    }

    // =========================================================================
    // SPATIAL
    // =========================================================================

    #[test]
    fn test_unclosed_ring() {
        let mut open = ring();
        open.pop();
        open.push([73.8005, 18.5012]);

        assert!(matches!(
            spatial::validate_topology(&open),
            Err(SpatialError::NotClosed { .. })
        ));

        let h = Harness::new();
        let err = h
            .service
            .create_parcel(ring_request("PARCEL_600", open, None))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Spatial(SpatialError::NotClosed { .. })));
        assert_eq!(err.kind(), ErrorKind::ValidationFailure);
        assert!(h.ledger.is_empty());
    }

    #[test]
    fn test_claimed_area_must_match() {
        let h = Harness::new();
        let calculated = spatial::calculate_area_sqm(&ring());

        let err = h
            .service
            .create_parcel(ring_request("PARCEL_601", ring(), Some(calculated * 10.0)))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Spatial(SpatialError::AreaMismatch { .. })));

        let asset = h
            .service
            .create_parcel(ring_request("PARCEL_601", ring(), Some(calculated * 1.03)))
            .unwrap();
        assert!((asset.area_hectares - calculated / 10_000.0).abs() < 1e-9);
        assert!(asset.geometry.spatial().is_some());
    }

    // =========================================================================
    // ZONING
    // =========================================================================

    #[test]
    fn test_block_zone_rejects_parcel() {
        let h = with_zone(ZoneSeverity::Block);
        let err = h
            .service
            .create_parcel(ring_request("PARCEL_602", ring(), None))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Compliance(ComplianceError::Encroachment { ref zone }) if zone == "MILITARY_CANTONMENT"
        ));
        assert_eq!(err.kind(), ErrorKind::AuthorizationDenied);
    }

    #[test]
    fn test_warn_zone_allows_parcel() {
        let h = with_zone(ZoneSeverity::Warn);
        let asset = h
            .service
            .create_parcel(ring_request("PARCEL_603", ring(), None))
            .unwrap();
        assert_eq!(asset.status, AssetStatus::Free);
    }

    #[test]
    fn test_shipped_zones() {
        let h = Harness::with_config(RegistryConfig::default());
        let forest: Vec<[f64; 2]> = ring().iter().map(|[x, y]| [x - 0.798, y - 0.498]).collect();
        let err = h
            .service
            .create_parcel(ring_request("PARCEL_605", forest, None))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Compliance(ComplianceError::Encroachment { ref zone }) if zone == "FOREST_DEPT_PUNE"
        ));

        // the highway buffer only warns
        let asset = h
            .service
            .create_parcel(ring_request("PARCEL_606", ring(), None))
            .unwrap();
        assert_eq!(asset.status, AssetStatus::Free);
    }

    #[test]
    fn test_raw_boundaries_skip_zoning() {
        let h = with_zone(ZoneSeverity::Block);
        let asset = h.parcel("PARCEL_604", "A", 2.0);
        assert_eq!(asset.area_hectares, 2.0);
    }

    // =========================================================================
    // PROTECTED LAND
    // =========================================================================

    #[test]
    fn test_endowment_land_is_inalienable() {
        let h = Harness::new();
        let mut request =
            CreateParcelRequest::new("PARCEL_700", "TEMPLE_TRUST", crate::fixtures::POLYGON, DOC_HASH);
        request.protection = ProtectionFlags {
            religious_endowment: true,
            ..ProtectionFlags::default()
        };
        h.service.create_parcel(request).unwrap();

        let err = h
            .execute("SALE", json!({"parcelId": "PARCEL_700", "buyerId": "B"}))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Compliance(ComplianceError::EndowmentLocked { .. })
        ));
        let err = h
            .service
            .initiate_transfer(transfer("PARCEL_700", "TEMPLE_TRUST", "B", 100.0, "UTR_E1"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthorizationDenied);
        assert_eq!(h.asset("PARCEL_700").status, AssetStatus::Free);
    }

    #[test]
    fn test_forest_land_cannot_be_converted() {
        let h = Harness::new();
        h.parcel_with_use("PARCEL_701", "A", LandUse::Forest);
        h.parcel("PARCEL_702", "A", 1.0);

        let err = h
            .service
            .convert_land_use("PARCEL_701", LandUse::Residential)
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Compliance(ComplianceError::ProtectedConversion { .. })
        ));

        // nothing may be converted into forest either
        let err = h
            .execute("CONVERSION", json!({"parcelId": "PARCEL_702", "newUse": "FOREST"}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthorizationDenied);
        assert_eq!(h.asset("PARCEL_702").land_use, LandUse::default());
    }

    #[test]
    fn test_tribal_land_needs_approval() {
        let h = Harness::new();
        let mut request =
            CreateParcelRequest::new("PARCEL_703", "ADIVASI_A", crate::fixtures::POLYGON, DOC_HASH);
        request.land_category = LandCategory::TribalScheduled;
        h.service.create_parcel(request).unwrap();

        let err = h
            .execute("SALE", json!({"parcelId": "PARCEL_703", "buyerId": "ADIVASI_B"}))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Compliance(ComplianceError::TribalApprovalRequired { .. })
        ));

        h.execute(
            "SALE",
            json!({"parcelId": "PARCEL_703", "buyerId": "ADIVASI_B", "approvalRef": "DC_ORDER_2024_55"}),
        )
        .unwrap();
        assert_eq!(h.asset("PARCEL_703").status, AssetStatus::PendingScrutiny);
    }

    #[test]
    fn test_tribal_two_phase_transfer_with_approval() {
        let h = Harness::new();
        let mut request =
            CreateParcelRequest::new("PARCEL_704", "ADIVASI_A", crate::fixtures::POLYGON, DOC_HASH);
        request.protection.tribal_protected = true;
        h.service.create_parcel(request).unwrap();

        let mut transfer_request = transfer("PARCEL_704", "ADIVASI_A", "ADIVASI_B", 100.0, "UTR_T1");
        assert!(h.service.initiate_transfer(transfer_request.clone()).is_err());

        transfer_request.approval_ref = Some("DC_ORDER_2024_56".into());
        h.service.initiate_transfer(transfer_request).unwrap();
        assert_eq!(h.asset("PARCEL_704").status, AssetStatus::PendingMutation);
    }

    #[test]
    fn test_protected_land_cannot_pass_by_inheritance() {
        let h = Harness::new();
        let mut request =
            CreateParcelRequest::new("PARCEL_706", "WAKF_BOARD", crate::fixtures::POLYGON, DOC_HASH);
        request.land_category = LandCategory::TribalScheduled;
        request.protection.religious_endowment = true;
        h.service.create_parcel(request).unwrap();
        let before = h.events.events().len();

        let err = h
            .execute(
                "INHERITANCE",
                json!({"parcelId": "PARCEL_706", "heirs": [{"id": "OUTSIDER", "share": 100}]}),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthorizationDenied);

        let err = h
            .execute(
                "INHERITANCE",
                json!({
                    "parcelId": "PARCEL_706",
                    "heirs": [{"id": "OUTSIDER", "share": 100}],
                    "dcApprovalHash": "DC_ORDER_2024_57",
                }),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Compliance(ComplianceError::EndowmentLocked { .. })
        ));

        let asset = h.asset("PARCEL_706");
        assert_eq!(asset.title.primary_owner(), Some("WAKF_BOARD"));
        assert_eq!(asset.status, AssetStatus::Free);
        assert_eq!(h.events.events().len(), before);
    }

    #[test]
    fn test_malformed_identifiers() {
        let h = Harness::new();
        let err = h
            .service
            .create_parcel(CreateParcelRequest::new("bad id", "A", crate::fixtures::POLYGON, DOC_HASH))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Format(_)));

        let err = h
            .service
            .create_parcel(CreateParcelRequest::new("PARCEL_705", "A", crate::fixtures::POLYGON, "QmTooShort"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailure);
    }
}
