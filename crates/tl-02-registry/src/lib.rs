//! # Land Registry Subsystem (TL-02)
//!
//! Per-asset record of ownership, encumbrances, disputes and pending
//! transactions, mutated only under the registry's legal invariants.
//!
//! ## Asset Lifecycle
//!
//! ```text
//!            ┌── blocking charge ──→ [LOCKED] ──── release ────┐
//!            ├── dispute ─────────→ [LITIGATION] ── resolve ───┤
//!  [FREE] ───┼── initiateTransfer → [PENDING_MUTATION] ── approveMutation (≥ 30 days)
//!            ├── SALE / GIFT ─────→ [PENDING_SCRUTINY] ── APPROVE_MUTATION (≥ 30 days)
//!            ├── REGISTER_ATS ────→ [PENDING_ATS]
//!            ├── INTIMATE_DEATH ──→ [LOCKED_FOR_SUCCESSION] ── INHERITANCE
//!            └── subdivide / partition / amalgamate ──→ [RETIRED] (terminal)
//! ```
//!
//! ## Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Owner shares sum to 100 ± 0.01 | `domain/title_ops.rs` computes on a copy, then replaces |
//! | Non-FREE assets admit only the allow-list | `domain/lifecycle.rs` - `admit()` |
//! | Pending transfer iff `PENDING_MUTATION` | `domain/transfer.rs` - `begin()`, `complete()`, `abort()` |
//! | RETIRED is terminal | `lifecycle::admit()`, `lifecycle::ensure_mutable()` |
//! | No partial writes | `service/staging.rs` - one batch per invocation |
//! | UTRs are single-use | `RegistryService::initiate_transfer` |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  adapters/ - in-memory ledger, event publishers, manual clock   │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ports/inbound.rs  - LandRegistryApi                            │
//! │  ports/outbound.rs - LedgerStore, TimeSource, event publisher   │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  service/ - RegistryService, dispatch, staged ledger            │
//! │  domain/  - lifecycle, titles, transfers, registry operations   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tl_02_registry::{InMemoryLedger, LandRegistryApi, RegistryConfig, RegistryService};
//!
//! let service = RegistryService::with_defaults(InMemoryLedger::new(), RegistryConfig::default());
//! tl_02_registry::genesis::seed(&service, &Default::default())?;
//! let receipt = service.execute_transaction(
//!     "SALE",
//!     r#"{"parcelId":"PARCEL_001","buyerId":"BUYER_1","price":500000}"#,
//!     "QmEvidence",
//! )?;
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod events;
pub mod genesis;
pub mod ports;
pub mod service;

pub use adapters::{
    InMemoryLedger, LoggingPublisher, ManualTimeSource, NoOpPublisher, RecordingPublisher,
};
pub use config::{ConfigError, RegistryConfig, DAY_MS};
pub use domain::boundary::{BoundaryInput, GeoInput};
pub use domain::errors::{ErrorKind, RegistryError};
pub use domain::registry_ops::{ChildParcelSpec, SubParcel, UnitSpec};
pub use domain::title_ops::HeirShare;
pub use domain::transfer::TransferTerms;
pub use domain::workflows::{TransactionRequest, Workflow, WorkflowTag};
pub use events::{EventEnvelope, IntimationCategory, RegistryEvent};
pub use genesis::{GenesisConfig, GenesisError, GenesisReport};
pub use ports::inbound::{
    CreateParcelRequest, DisputeIndicator, ExecutionReceipt, IntimationReceipt,
    IntimationRequest, LandRegistryApi, MortgageIndicator, ParcelHistoryEntry, PublicParcelView,
    TransferRequest,
};
pub use ports::outbound::{
    HistoryEntry, LedgerError, LedgerStore, PublishError, RegistryEventPublisher, Selector,
    SystemTimeSource, TimeSource, TxId, VersionedValue, WriteBatch,
};
pub use service::RegistryService;
