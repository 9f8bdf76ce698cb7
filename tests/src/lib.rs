//! # Terra-Ledger Test Suite
//!
//! Unified test crate for flows that cross crate boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs          # Harness: service over in-memory ledger, manual clock
//! └── integration/
//!     ├── transfer_flows.rs      # Two-phase and single-phase transfers, share invariant
//!     ├── encumbrance_flows.rs   # Charges, disputes, succession
//!     ├── registry_ops_flows.rs  # Subdivision, amalgamation, strata, rectification
//!     ├── validator_flows.rs     # Spatial, zoning and compliance gates
//!     └── node_flows.rs          # JSON-lines runtime harness
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lr-tests
//! cargo test -p lr-tests integration::transfer_flows
//! cargo bench -p lr-tests
//! ```

pub mod fixtures;
