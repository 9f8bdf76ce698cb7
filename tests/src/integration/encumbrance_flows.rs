//! # Encumbrance Flows
//!
//! Charges and disputes drive the lock status:
//!
//! | Register change | From | To |
//! |-----------------|------|----|
//! | blocking charge added | any live status | `LOCKED` |
//! | dispute added | any live status | `LITIGATION` |
//! | last blocker released | `LOCKED` / `LITIGATION` | `FREE`, or `PENDING_SCRUTINY` mid-mutation |
//! | charge released, dispute pending | `LITIGATION` | unchanged |

#[cfg(test)]
mod tests {
    use crate::fixtures::{transfer, Harness};
    use serde_json::json;
    use shared_types::{AssetStatus, ChargeType, DisputeStatus, DisputeType, PaymentStatus};
    use tl_02_registry::{ErrorKind, IntimationRequest, LandRegistryApi, RegistryError};

    fn charge(parcel: &str, charge_type: ChargeType) -> IntimationRequest {
        IntimationRequest::Charge {
            parcel_id: parcel.into(),
            charge_type,
            holder: "STATE_BANK".into(),
            amount: 2_500_000.0,
        }
    }

    fn dispute(parcel: &str) -> IntimationRequest {
        IntimationRequest::Dispute {
            parcel_id: parcel.into(),
            dispute_type: DisputeType::CivilSuit,
            court_id: "PUNE_DISTRICT_COURT".into(),
            case_number: Some("MHPU010012342024".into()),
        }
    }

    #[test]
    fn test_blocking_charges_lock() {
        for charge_type in [ChargeType::Mortgage, ChargeType::TaxDefault] {
            let h = Harness::new();
            h.parcel("PARCEL_001", "A", 1.0);
            let receipt = h.service.record_intimation(charge("PARCEL_001", charge_type)).unwrap();
            assert_eq!(receipt.status, AssetStatus::Locked, "{charge_type}");
            assert_eq!(h.asset("PARCEL_001").status, AssetStatus::Locked);
        }
    }

    #[test]
    fn test_non_blocking_charge_keeps_free() {
        let h = Harness::new();
        h.parcel("PARCEL_001", "A", 1.0);
        let receipt = h
            .service
            .record_intimation(charge("PARCEL_001", ChargeType::Easement))
            .unwrap();
        assert_eq!(receipt.status, AssetStatus::Free);
        assert_eq!(h.asset("PARCEL_001").charges.len(), 1);
    }

    #[test]
    fn test_release_only_charge_restores_free() {
        let h = Harness::new();
        h.parcel("PARCEL_001", "A", 1.0);
        let receipt = h
            .service
            .record_intimation(charge("PARCEL_001", ChargeType::Mortgage))
            .unwrap();

        h.execute(
            "UNLOCK_CHARGE",
            json!({"parcelId": "PARCEL_001", "chargeId": receipt.record_id}),
        )
        .unwrap();

        let asset = h.asset("PARCEL_001");
        assert_eq!(asset.status, AssetStatus::Free);
        assert!(!asset.charges.get("CHG_1").unwrap().active);
    }

    #[test]
    fn test_lock_during_scrutiny_keeps_the_timer() {
        let h = Harness::new();
        h.parcel("PARCEL_001", "A", 1.0);
        h.execute("SALE", json!({"parcelId": "PARCEL_001", "buyerId": "B", "price": 900000}))
            .unwrap();
        assert_eq!(h.asset("PARCEL_001").status, AssetStatus::PendingScrutiny);

        h.clock.advance_days(10);
        h.service
            .record_intimation(charge("PARCEL_001", ChargeType::Mortgage))
            .unwrap();
        h.execute("UNLOCK_CHARGE", json!({"parcelId": "PARCEL_001", "chargeId": "CHG_1"}))
            .unwrap();
        h.service.record_intimation(dispute("PARCEL_001")).unwrap();
        let status = h.service.resolve_dispute("PARCEL_001", "DSP_1", None).unwrap();
        assert_eq!(status, AssetStatus::PendingScrutiny);

        // still counted from the sale, not from the release
        let err = h
            .execute("SALE", json!({"parcelId": "PARCEL_001", "buyerId": "C"}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        h.clock.advance_days(20);
        h.execute("APPROVE_MUTATION", json!({"parcelId": "PARCEL_001"}))
            .unwrap();

        let asset = h.asset("PARCEL_001");
        assert_eq!(asset.status, AssetStatus::Free);
        assert!(asset.title.is_conclusive);
        assert_eq!(asset.title.primary_owner(), Some("B"));
    }

    #[test]
    fn test_release_with_pending_dispute_leaves_status() {
        let h = Harness::new();
        h.parcel("PARCEL_001", "A", 1.0);
        h.service
            .record_intimation(charge("PARCEL_001", ChargeType::Mortgage))
            .unwrap();
        h.service.record_intimation(dispute("PARCEL_001")).unwrap();
        assert_eq!(h.asset("PARCEL_001").status, AssetStatus::Litigation);

        h.execute("UNLOCK_CHARGE", json!({"parcelId": "PARCEL_001", "chargeId": "CHG_1"}))
            .unwrap();
        assert_eq!(h.asset("PARCEL_001").status, AssetStatus::Litigation);

        // resolving the last blocker frees the asset
        let status = h
            .service
            .resolve_dispute("PARCEL_001", "DSP_1", Some("Settled out of court".into()))
            .unwrap();
        assert_eq!(status, AssetStatus::Free);
        let asset = h.asset("PARCEL_001");
        let resolved = asset.disputes.get("DSP_1").unwrap();
        assert_eq!(resolved.status, DisputeStatus::Resolved);
        assert_eq!(resolved.resolution.as_deref(), Some("Settled out of court"));
    }

    #[test]
    fn test_resolving_dispute_with_active_mortgage_locks() {
        let h = Harness::new();
        h.parcel("PARCEL_001", "A", 1.0);
        h.service.record_intimation(dispute("PARCEL_001")).unwrap();
        h.service
            .record_intimation(charge("PARCEL_001", ChargeType::Mortgage))
            .unwrap();

        let receipt = h
            .execute("RESOLVE_DISPUTE", json!({"parcelId": "PARCEL_001", "disputeId": "DSP_1"}))
            .unwrap();
        assert_eq!(receipt.asset_ids, vec!["PARCEL_001"]);
        assert_eq!(h.asset("PARCEL_001").status, AssetStatus::Locked);
    }

    #[test]
    fn test_register_ids_are_never_reused() {
        let h = Harness::new();
        h.parcel("PARCEL_001", "A", 1.0);
        let first = h
            .service
            .record_intimation(charge("PARCEL_001", ChargeType::Mortgage))
            .unwrap();
        h.execute("UNLOCK_CHARGE", json!({"parcelId": "PARCEL_001", "chargeId": "CHG_1"}))
            .unwrap();
        let second = h
            .service
            .record_intimation(charge("PARCEL_001", ChargeType::Mortgage))
            .unwrap();
        assert_eq!(first.record_id, "CHG_1");
        assert_eq!(second.record_id, "CHG_2");

        let err = h
            .execute("UNLOCK_CHARGE", json!({"parcelId": "PARCEL_001", "chargeId": "CHG_1"}))
            .unwrap_err();
        assert!(matches!(err, RegistryError::ChargeInactive(_)));
    }

    #[test]
    fn test_locked_asset_rejects_non_allowed_workflows() {
        let h = Harness::new();
        h.parcel("PARCEL_001", "A", 1.0);
        h.service
            .record_intimation(charge("PARCEL_001", ChargeType::Mortgage))
            .unwrap();

        for (tag, payload) in [
            ("SALE", json!({"parcelId": "PARCEL_001", "buyerId": "B"})),
            ("GIFT", json!({"parcelId": "PARCEL_001", "doneeId": "B"})),
            ("CONVERSION", json!({"parcelId": "PARCEL_001", "newUse": "RESIDENTIAL"})),
            ("REGISTER_ATS", json!({"parcelId": "PARCEL_001", "buyerId": "B"})),
        ] {
            let err = h.execute(tag, payload).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::StateConflict, "{tag}");
            assert!(err.to_string().contains("LOCKED"), "{tag}: {err}");
        }
        assert!(matches!(
            h.service
                .initiate_transfer(transfer("PARCEL_001", "A", "B", 100.0, "UTR_L1")),
            Err(RegistryError::NotFree { .. }) | Err(RegistryError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_dispute_aborts_pending_transfer() {
        let h = Harness::new();
        h.parcel("PARCEL_001", "A", 1.0);
        h.service
            .initiate_transfer(transfer("PARCEL_001", "A", "B", 100.0, "UTR_X1"))
            .unwrap();

        let receipt = h.service.record_intimation(dispute("PARCEL_001")).unwrap();
        assert_eq!(receipt.status, AssetStatus::Litigation);
        assert_eq!(receipt.aborted_transfer_utr.as_deref(), Some("UTR_X1"));

        let asset = h.asset("PARCEL_001");
        assert!(asset.pending_transfer.is_none());
        assert_eq!(
            h.service.get_payment_details("UTR_X1").unwrap().status,
            PaymentStatus::Failed
        );
        h.clock.advance_days(31);
        assert!(matches!(
            h.service.approve_mutation("PARCEL_001"),
            Err(RegistryError::NoPendingTransfer { .. })
        ));
    }

    // =========================================================================
    // SUCCESSION
    // =========================================================================

    #[test]
    fn test_death_then_inheritance() {
        let h = Harness::new();
        h.parcel("PARCEL_002", "PATRIARCH", 1.0);
        h.execute(
            "INTIMATE_DEATH",
            json!({"parcelId": "PARCEL_002", "deceasedOwnerId": "PATRIARCH"}),
        )
        .unwrap();
        assert_eq!(h.asset("PARCEL_002").status, AssetStatus::LockedForSuccession);

        // heirs must account for the whole title
        let err = h
            .execute(
                "INHERITANCE",
                json!({"parcelId": "PARCEL_002", "heirs": [{"id": "SON", "share": 50}, {"id": "DAUGHTER", "share": 40}]}),
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::ShareSumViolation { .. }));
        assert_eq!(h.asset("PARCEL_002").title.primary_owner(), Some("PATRIARCH"));

        h.execute(
            "INHERITANCE",
            json!({"parcelId": "PARCEL_002", "heirs": [{"id": "SON", "share": 50}, {"id": "DAUGHTER", "share": 50}]}),
        )
        .unwrap();
        let asset = h.asset("PARCEL_002");
        assert_eq!(asset.status, AssetStatus::Free);
        assert_eq!(asset.title.share_of("SON"), Some(50.0));
        assert_eq!(asset.title.share_of("DAUGHTER"), Some(50.0));
        assert!(!asset.title.is_conclusive);
    }

    #[test]
    fn test_succession_lock_only_admits_inheritance() {
        let h = Harness::new();
        h.parcel("PARCEL_003", "A", 1.0);
        h.execute(
            "INTIMATE_DEATH",
            json!({"parcelId": "PARCEL_003", "deceasedOwnerId": "A"}),
        )
        .unwrap();
        let err = h
            .execute("SALE", json!({"parcelId": "PARCEL_003", "buyerId": "B"}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
    }

    #[test]
    fn test_finalize_title() {
        let h = Harness::new();
        h.parcel("PARCEL_004", "A", 1.0);
        h.service.record_intimation(dispute("PARCEL_004")).unwrap();
        let err = h.service.finalize_title("PARCEL_004").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);

        h.service.resolve_dispute("PARCEL_004", "DSP_1", None).unwrap();
        let title = h.service.finalize_title("PARCEL_004").unwrap();
        assert!(title.is_conclusive);
        assert!(h.events.names().contains(&"TitleFinalized"));
    }
}
