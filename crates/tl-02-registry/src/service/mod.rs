//! # Service Layer
//!
//! - `staging` - per-invocation read-your-writes overlay and single commit
//! - `dispatch` - `executeTransaction` routing, admission and gating
//! - `registry` - [`RegistryService`], the [`LandRegistryApi`] implementation
//!
//! [`LandRegistryApi`]: crate::ports::inbound::LandRegistryApi

pub mod dispatch;
pub mod registry;
pub mod staging;

pub use registry::RegistryService;
pub use staging::StagedLedger;
