//! Adapters layer for the Land Registry subsystem.
//!
//! In-process implementations of the outbound ports, used by the runtime
//! binary and by tests.

pub mod clock;
pub mod memory_ledger;
pub mod publisher;

pub use clock::ManualTimeSource;
pub use memory_ledger::InMemoryLedger;
pub use publisher::{LoggingPublisher, NoOpPublisher, RecordingPublisher};
