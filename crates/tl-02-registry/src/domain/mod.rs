//! # Domain Layer
//!
//! Pure domain logic for the Land Registry subsystem. Nothing here performs
//! I/O or reads the clock; the service passes `now` and the configuration in.
//!
//! ## Modules
//!
//! - `errors` - `RegistryError` and its stable `ErrorKind`
//! - `lifecycle` - status admission and register-driven status derivations
//! - `title_ops` - owner-share arithmetic under the 100% invariant
//! - `transfer` - two-phase transfer and scrutiny timer
//! - `boundary` - boundary inputs validated into stored geometry
//! - `registry_ops` - subdivision, partition, amalgamation, strata minting, rectification
//! - `workflows` - `executeTransaction` tags, payloads and single-asset handlers

pub mod boundary;
pub mod errors;
pub mod lifecycle;
pub mod registry_ops;
pub mod title_ops;
pub mod transfer;
pub mod workflows;
