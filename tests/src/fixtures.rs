//! Shared test fixtures.

use shared_types::{Asset, LandUse};
use std::sync::{Arc, Once};
use tl_02_registry::{
    CreateParcelRequest, InMemoryLedger, LandRegistryApi, ManualTimeSource, RecordingPublisher,
    RegistryConfig, RegistryService, TransferRequest, TransferTerms,
};

/// Content hash accepted by the document-hash check.
pub const DOC_HASH: &str = "QmXoypizjW3WknFiJnKLwHCnL72vedxjQkDDP1mXWo6uco";

/// Opaque boundary stored as-is.
pub const POLYGON: &str = "POLYGON((0 0, 0 10, 10 10, 10 0, 0 0))";

/// 2023-11-14T22:13:20Z.
pub const GENESIS_TIME: u64 = 1_700_000_000_000;

pub type TestService =
    RegistryService<Arc<InMemoryLedger>, Arc<ManualTimeSource>, Arc<RecordingPublisher>>;

static LOGGING: Once = Once::new();

/// Routes registry logs to the test harness; `RUST_LOG` selects the level.
pub fn init_test_logging() {
    LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Service wired to inspectable adapters.
pub struct Harness {
    pub service: TestService,
    pub ledger: Arc<InMemoryLedger>,
    pub clock: Arc<ManualTimeSource>,
    pub events: Arc<RecordingPublisher>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::for_testing())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        init_test_logging();
        let ledger = Arc::new(InMemoryLedger::new());
        let clock = Arc::new(ManualTimeSource::new(GENESIS_TIME));
        let events = Arc::new(RecordingPublisher::new());
        let service = RegistryService::new(ledger.clone(), clock.clone(), events.clone(), config);
        Self {
            service,
            ledger,
            clock,
            events,
        }
    }

    /// Creates a FREE parcel owned solely by `owner`.
    pub fn parcel(&self, id: &str, owner: &str, hectares: f64) -> Asset {
        self.service
            .create_parcel(CreateParcelRequest::new(id, owner, POLYGON, DOC_HASH).with_area(hectares))
            .unwrap_or_else(|e| panic!("create {id}: {e}"))
    }

    /// Creates a parcel with a specific land use.
    pub fn parcel_with_use(&self, id: &str, owner: &str, land_use: LandUse) -> Asset {
        let mut request = CreateParcelRequest::new(id, owner, POLYGON, DOC_HASH).with_area(1.0);
        request.land_use = land_use;
        self.service
            .create_parcel(request)
            .unwrap_or_else(|e| panic!("create {id}: {e}"))
    }

    pub fn asset(&self, id: &str) -> Asset {
        self.service
            .get_parcel(id)
            .unwrap_or_else(|e| panic!("get {id}: {e}"))
    }

    /// Runs `executeTransaction` with a JSON payload.
    pub fn execute(
        &self,
        tx_type: &str,
        payload: serde_json::Value,
    ) -> Result<tl_02_registry::ExecutionReceipt, tl_02_registry::RegistryError> {
        self.service
            .execute_transaction(tx_type, &payload.to_string(), "QmEvidenceRef")
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// A two-phase transfer request with default consideration.
pub fn transfer(parcel: &str, seller: &str, buyer: &str, pct: f64, utr: &str) -> TransferRequest {
    TransferRequest {
        parcel_id: parcel.into(),
        approval_ref: None,
        terms: TransferTerms {
            seller_id: seller.into(),
            buyer_id: buyer.into(),
            share_percentage: pct,
            price: 1_000_000.0,
            utr: utr.into(),
            witnesses: vec!["WITNESS_1".into(), "WITNESS_2".into()],
            stamp_duty: None,
        },
    }
}

/// Sum of all owner shares of `asset`.
pub fn share_total(asset: &Asset) -> f64 {
    asset.title.owners.iter().map(|o| o.share_percentage).sum()
}
