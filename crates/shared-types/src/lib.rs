//! # Shared Types Crate
//!
//! This crate contains the persisted record shapes of the land-title registry
//! and the codec used to write them to the Ledger Store.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Every record written under a ledger key is
//!   defined here (`Asset`, `PaymentRecord`).
//! - **Self-describing records**: All records encode as JSON with camelCase
//!   fields and SCREAMING_SNAKE_CASE enum values.
//! - **Append-only registers**: Charges and Disputes live in a [`Register`]
//!   that never removes entries, so scoped ids are never reused.
//!
//! ## Record Map
//!
//! ```text
//! Asset (key = ULPIN or legacy id)
//! ├── kind: PARCEL | UNIT { parentId, occupancy certificate, RERA no. }
//! ├── Title ── owners: [OwnerShare]  (Σ share = 100 ± 0.01)
//! ├── disputes: Register<Dispute>
//! ├── charges:  Register<Charge>
//! └── pendingTransfer: Option<PendingTransfer>  (iff status = PENDING_MUTATION)
//!
//! PaymentRecord (key = PAY_<utr>)
//! ```

/// Implements `as_str`, `Display` and `FromStr` over the wire names of a
/// fieldless enum so they stay identical to the serde representation.
macro_rules! wire_names {
    ($ty:ident, $label:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Returns the wire name of this value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = $crate::errors::ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Self::$variant),)+
                    other => Err($crate::errors::ParseEnumError::new($label, other)),
                }
            }
        }
    };
}

pub mod codec;
pub mod entities;
pub mod errors;
pub mod payments;
pub mod registers;
pub mod title;

pub use codec::{decode, encode};
pub use entities::*;
pub use errors::*;
pub use payments::*;
pub use registers::*;
pub use title::*;
