//! # Transfer Flows
//!
//! Both transfer paths of the registry:
//!
//! ```text
//! initiateTransfer ──→ PENDING_MUTATION ──(≥ 30 days)──→ approveMutation ──→ FREE
//! SALE / GIFT      ──→ PENDING_SCRUTINY ──(≥ 30 days)──→ APPROVE_MUTATION ──→ FREE
//! ```
//!
//! plus the owner-share invariant under arbitrary partial transfers.

#[cfg(test)]
mod tests {
    use crate::fixtures::{share_total, transfer, Harness};
    use proptest::prelude::*;
    use serde_json::json;
    use shared_types::{AssetStatus, PaymentStatus, StampDuty};
    use tl_02_registry::{ErrorKind, LandRegistryApi, RegistryError, RegistryEvent};

    // =========================================================================
    // TWO-PHASE TRANSFER
    // =========================================================================

    #[test]
    fn test_approval_before_scrutiny_reports_remaining_days() {
        let h = Harness::new();
        h.parcel("PARCEL_001", "SELLER", 1.0);
        h.service
            .initiate_transfer(transfer("PARCEL_001", "SELLER", "BUYER", 100.0, "UTR_A1"))
            .unwrap();

        for (elapsed, remaining) in [(0, 30), (1, 29), (15, 15), (29, 1)] {
            h.clock.set(crate::fixtures::GENESIS_TIME);
            h.clock.advance_days(elapsed);
            let err = h.service.approve_mutation("PARCEL_001").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::StateConflict);
            assert!(
                matches!(err, RegistryError::ScrutinyActive { remaining_days } if remaining_days == remaining),
                "after {elapsed} days: {err}"
            );
        }

        let asset = h.asset("PARCEL_001");
        assert_eq!(asset.status, AssetStatus::PendingMutation);
        assert!(asset.pending_transfer.is_some());
    }

    #[test]
    fn test_approval_after_scrutiny_moves_ownership() {
        let h = Harness::new();
        h.parcel("PARCEL_001", "SELLER", 1.0);
        let mut request = transfer("PARCEL_001", "SELLER", "BUYER", 100.0, "UTR_A2");
        request.terms.stamp_duty = Some(StampDuty {
            challan_no: "CHALLAN_77".into(),
            amount: 50_000.0,
            paid_at: None,
        });
        h.service.initiate_transfer(request).unwrap();

        h.clock.advance_days(30);
        let title = h.service.approve_mutation("PARCEL_001").unwrap();
        assert!(title.is_conclusive);
        assert_eq!(title.primary_owner(), Some("BUYER"));
        assert_eq!(title.share_of("SELLER"), None);

        let summary = title.last_transaction.unwrap();
        assert_eq!(summary.duty_reference.as_deref(), Some("CHALLAN_77"));
        assert_eq!(summary.witnesses.len(), 2);

        let asset = h.asset("PARCEL_001");
        assert_eq!(asset.status, AssetStatus::Free);
        assert!(asset.pending_transfer.is_none());
        assert!(h.service.query_pending_mutations().unwrap().is_empty());
        assert_eq!(
            h.service.get_payment_details("UTR_A2").unwrap().status,
            PaymentStatus::Confirmed
        );
        assert_eq!(
            h.events.names(),
            vec!["ParcelCreated", "MutationRequest", "MutationApproved"]
        );
    }

    #[test]
    fn test_partial_transfer_creates_joint_title() {
        let h = Harness::new();
        h.parcel("PARCEL_001", "A", 1.0);
        h.service
            .initiate_transfer(transfer("PARCEL_001", "A", "B", 40.0, "UTR_P1"))
            .unwrap();
        h.clock.advance_days(30);
        let title = h.service.approve_mutation("PARCEL_001").unwrap();
        assert_eq!(title.share_of("A"), Some(60.0));
        assert_eq!(title.share_of("B"), Some(40.0));

        let err = h
            .service
            .initiate_transfer(transfer("PARCEL_001", "A", "C", 100.0, "UTR_P2"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::InsufficientShare { .. }));

        let err = h
            .service
            .initiate_transfer(transfer("PARCEL_001", "A", "C", 75.0, "UTR_P3"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::InsufficientShare { owned, .. } if owned == 60.0));
        assert_eq!(h.asset("PARCEL_001").status, AssetStatus::Free);
    }

    #[test]
    fn test_second_initiation_is_state_conflict() {
        let h = Harness::new();
        h.parcel("PARCEL_001", "A", 1.0);
        h.service
            .initiate_transfer(transfer("PARCEL_001", "A", "B", 100.0, "UTR_D1"))
            .unwrap();
        let err = h
            .service
            .initiate_transfer(transfer("PARCEL_001", "A", "C", 100.0, "UTR_D2"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        assert!(matches!(
            h.service.get_payment_details("UTR_D2"),
            Err(RegistryError::PaymentNotFound(_))
        ));
    }

    #[test]
    fn test_approve_without_pending_transfer() {
        let h = Harness::new();
        h.parcel("PARCEL_001", "A", 1.0);
        let err = h.service.approve_mutation("PARCEL_001").unwrap_err();
        assert!(matches!(err, RegistryError::NoPendingTransfer { .. }));
    }

    #[test]
    fn test_replayed_utr_is_already_exists() {
        let h = Harness::new();
        h.parcel("PARCEL_001", "A", 1.0);
        h.parcel("PARCEL_002", "A", 1.0);
        h.service
            .initiate_transfer(transfer("PARCEL_001", "A", "B", 100.0, "UTR_R1"))
            .unwrap();
        let err = h
            .service
            .initiate_transfer(transfer("PARCEL_002", "A", "B", 100.0, "UTR_R1"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(h.asset("PARCEL_002").status, AssetStatus::Free);
    }

    // =========================================================================
    // SINGLE-PHASE TRANSFER (executeTransaction)
    // =========================================================================

    #[test]
    fn test_sale_then_legacy_approval() {
        let h = Harness::new();
        h.parcel("PARCEL_010", "SELLER", 1.0);

        h.execute(
            "SALE",
            json!({"parcelId": "PARCEL_010", "sellerId": "SELLER", "buyerId": "BUYER", "price": 900000}),
        )
        .unwrap();
        let asset = h.asset("PARCEL_010");
        assert_eq!(asset.status, AssetStatus::PendingScrutiny);
        assert_eq!(asset.title.primary_owner(), Some("BUYER"));
        assert!(!asset.title.is_conclusive);
        assert_eq!(h.service.query_pending_mutations().unwrap().len(), 1);

        h.clock.advance_days(10);
        let err = h
            .execute("APPROVE_MUTATION", json!({"parcelId": "PARCEL_010"}))
            .unwrap_err();
        assert!(matches!(err, RegistryError::ScrutinyActive { remaining_days: 20 }));

        h.clock.advance_days(20);
        h.execute("APPROVE_MUTATION", json!({"parcelId": "PARCEL_010"}))
            .unwrap();
        let asset = h.asset("PARCEL_010");
        assert_eq!(asset.status, AssetStatus::Free);
        assert!(asset.title.is_conclusive);
    }

    #[test]
    fn test_gift_uses_scrutiny_path() {
        let h = Harness::new();
        h.parcel("PARCEL_011", "DONOR", 1.0);
        h.execute("GIFT", json!({"parcelId": "PARCEL_011", "doneeId": "DONEE"}))
            .unwrap();

        let asset = h.asset("PARCEL_011");
        assert_eq!(asset.status, AssetStatus::PendingScrutiny);
        assert_eq!(asset.title.owners.len(), 1);
        assert_eq!(asset.title.primary_owner(), Some("DONEE"));
        assert!(asset.mutation_requested_at.is_some());
    }

    #[test]
    fn test_sale_rejects_non_positive_duty() {
        let h = Harness::new();
        h.parcel("PARCEL_012", "A", 1.0);
        let err = h
            .execute(
                "SALE",
                json!({
                    "parcelId": "PARCEL_012",
                    "buyerId": "B",
                    "stampDuty": {"challanNo": "C1", "amount": 0.0},
                }),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailure);
        assert_eq!(h.asset("PARCEL_012").status, AssetStatus::Free);
    }

    #[test]
    fn test_executed_event_carries_tag_and_asset() {
        let h = Harness::new();
        h.parcel("PARCEL_013", "A", 1.0);
        h.events.clear();
        h.execute("SALE", json!({"parcelId": "PARCEL_013", "buyerId": "B"}))
            .unwrap();

        let events = h.events.events();
        let executed = events
            .iter()
            .find_map(|e| match &e.event {
                RegistryEvent::TransactionExecuted {
                    tx_type,
                    asset_id,
                    timestamp,
                    ..
                } => Some((tx_type.clone(), asset_id.clone(), *timestamp)),
                _ => None,
            })
            .unwrap();
        assert_eq!(executed.0, "SALE");
        assert_eq!(executed.1, "PARCEL_013");
        assert_eq!(executed.2, crate::fixtures::GENESIS_TIME);
    }

    // =========================================================================
    // SHARE INVARIANT
    // =========================================================================

    const BUYERS: [&str; 4] = ["B1", "B2", "B3", "B4"];

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        /// Shares stay at 100 ± 0.01 whatever partial transfers are attempted.
        #[test]
        fn prop_share_sum_invariant(
            steps in proptest::collection::vec((0usize..8, 0usize..4, 0.5f64..100.0), 1..12)
        ) {
            let h = Harness::new();
            h.parcel("PARCEL_900", "ORIGIN", 1.0);

            for (i, (seller_pick, buyer_pick, pct)) in steps.into_iter().enumerate() {
                let before = h.asset("PARCEL_900");
                let seller = before.title.owners[seller_pick % before.title.owners.len()]
                    .owner_id
                    .clone();
                let buyer = BUYERS[buyer_pick];
                let utr = format!("UTR_PROP_{i}");

                if h.service
                    .initiate_transfer(transfer("PARCEL_900", &seller, buyer, pct, &utr))
                    .is_ok()
                {
                    h.clock.advance_days(30);
                    prop_assert!(h.service.approve_mutation("PARCEL_900").is_ok());
                }

                let after = h.asset("PARCEL_900");
                let total = share_total(&after);
                prop_assert!((99.99..=100.01).contains(&total), "total {}", total);
                prop_assert!(after.title.owners.iter().all(|o| o.share_percentage > 0.0));
                prop_assert_eq!(after.status, AssetStatus::Free);
            }
        }
    }
}
