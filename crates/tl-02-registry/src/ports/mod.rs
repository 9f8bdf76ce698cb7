//! # Ports Layer
//!
//! Defines the port traits for the Land Registry subsystem.
//!
//! ## Hexagonal Architecture
//!
//! - `inbound.rs` - Driving port (operations exposed to the gateway layer)
//! - `outbound.rs` - Driven ports (ledger store, clock, event publisher)

pub mod inbound;
pub mod outbound;
