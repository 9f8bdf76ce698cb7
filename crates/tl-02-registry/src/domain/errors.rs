//! Error types for the Land Registry subsystem.

use crate::ports::outbound::LedgerError;
use shared_types::{AssetStatus, CodecError};
use thiserror::Error;
use tl_01_validators::{ComplianceError, FormatError, SpatialError};

/// Stable, machine-checkable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    StateConflict,
    ValidationFailure,
    AuthorizationDenied,
    UnsupportedOperation,
    Storage,
    Codec,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::StateConflict => "STATE_CONFLICT",
            Self::ValidationFailure => "VALIDATION_FAILURE",
            Self::AuthorizationDenied => "AUTHORIZATION_DENIED",
            Self::UnsupportedOperation => "UNSUPPORTED_OPERATION",
            Self::Storage => "STORAGE",
            Self::Codec => "CODEC",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur in the Land Registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    // -------------------------------------------------------------------------
    // Not found
    // -------------------------------------------------------------------------
    #[error("The asset {0} does not exist")]
    AssetNotFound(String),

    #[error("Strata Unit {0} does not exist")]
    UnitNotFound(String),

    #[error("Payment with UTR {0} not found")]
    PaymentNotFound(String),

    #[error("Dispute {dispute_id} not found on {asset_id}")]
    DisputeNotFound { asset_id: String, dispute_id: String },

    #[error("Charge {charge_id} not found on {asset_id}.")]
    ChargeNotFound { asset_id: String, charge_id: String },

    // -------------------------------------------------------------------------
    // Already exists
    // -------------------------------------------------------------------------
    #[error("The asset {0} already exists")]
    AssetExists(String),

    #[error("Payment UTR {0} already used.")]
    PaymentReplay(String),

    // -------------------------------------------------------------------------
    // State conflict
    // -------------------------------------------------------------------------
    #[error("Asset {asset_id} is {status}. Cannot execute {operation}.")]
    InvalidState {
        asset_id: String,
        status: AssetStatus,
        operation: String,
    },

    #[error("Asset {0} is RETIRED and can no longer be modified.")]
    Retired(String),

    #[error("Parcel {asset_id} is not FREE (Status: {status}).")]
    NotFree { asset_id: String, status: AssetStatus },

    #[error("Operation Blocked: Parent Land ({parent_id}) is NOT Free (Status: {status}). Litigation/Locks extend to all units.")]
    ParentNotFree { parent_id: String, status: AssetStatus },

    #[error("Scrutiny Period Active. Cannot approve mutation yet. Try again in {remaining_days} days.")]
    ScrutinyActive { remaining_days: u64 },

    #[error("Asset {asset_id} is not pending scrutiny (Status: {status}).")]
    NotPendingScrutiny { asset_id: String, status: AssetStatus },

    #[error("Asset {asset_id} has no pending transfer awaiting mutation (Status: {status}).")]
    NoPendingTransfer { asset_id: String, status: AssetStatus },

    #[error("Dispute {0} is already RESOLVED")]
    DisputeAlreadyResolved(String),

    #[error("Charge {0} is already inactive.")]
    ChargeInactive(String),

    #[error("Cannot finalize title of {0} with pending disputes")]
    PendingDisputes(String),

    // -------------------------------------------------------------------------
    // Validation failure
    // -------------------------------------------------------------------------
    #[error("Ownership mismatch. All parcels must belong to {expected} ({asset_id} belongs to {found}).")]
    OwnershipMismatch {
        expected: String,
        found: String,
        asset_id: String,
    },

    #[error("{owner_id} is not an owner of {asset_id}")]
    NotAnOwner { asset_id: String, owner_id: String },

    #[error("Seller only owns {owned}%, cannot sell {requested}%")]
    InsufficientShare { owned: f64, requested: f64 },

    #[error("Multi-Sig Required: Cannot sell 100% of a Jointly Held property. Sell your share ({owned}%) instead.")]
    MultiSigRequired { owned: f64 },

    #[error("Owner shares must sum to 100% (got {total}%)")]
    ShareSumViolation { total: f64 },

    #[error("Invalid share percentage: {0}")]
    InvalidShare(f64),

    #[error("Sum of child areas ({children}) must equal parent area ({parent})")]
    AreaSumMismatch { children: f64, parent: f64 },

    #[error("Stamp Duty Amount must be positive (got {0})")]
    NonPositiveDuty(f64),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Spatial(#[from] SpatialError),

    // -------------------------------------------------------------------------
    // Authorization denied
    // -------------------------------------------------------------------------
    #[error(transparent)]
    Compliance(#[from] ComplianceError),

    // -------------------------------------------------------------------------
    // Unsupported operation
    // -------------------------------------------------------------------------
    #[error("Unknown Transaction Type: {0}")]
    UnsupportedWorkflow(String),

    // -------------------------------------------------------------------------
    // Collaborators
    // -------------------------------------------------------------------------
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl RegistryError {
    /// Stable category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AssetNotFound(_)
            | Self::UnitNotFound(_)
            | Self::PaymentNotFound(_)
            | Self::DisputeNotFound { .. }
            | Self::ChargeNotFound { .. } => ErrorKind::NotFound,

            Self::AssetExists(_) | Self::PaymentReplay(_) => ErrorKind::AlreadyExists,

            Self::InvalidState { .. }
            | Self::Retired(_)
            | Self::NotFree { .. }
            | Self::ParentNotFree { .. }
            | Self::ScrutinyActive { .. }
            | Self::NotPendingScrutiny { .. }
            | Self::NoPendingTransfer { .. }
            | Self::DisputeAlreadyResolved(_)
            | Self::ChargeInactive(_)
            | Self::PendingDisputes(_) => ErrorKind::StateConflict,

            Self::OwnershipMismatch { .. }
            | Self::NotAnOwner { .. }
            | Self::InsufficientShare { .. }
            | Self::MultiSigRequired { .. }
            | Self::ShareSumViolation { .. }
            | Self::InvalidShare(_)
            | Self::AreaSumMismatch { .. }
            | Self::NonPositiveDuty(_)
            | Self::InvalidRequest(_)
            | Self::Format(_)
            | Self::Spatial(_)
            | Self::Compliance(ComplianceError::Format(_)) => ErrorKind::ValidationFailure,

            Self::Compliance(_) => ErrorKind::AuthorizationDenied,

            Self::UnsupportedWorkflow(_) => ErrorKind::UnsupportedOperation,

            Self::Ledger(_) => ErrorKind::Storage,
            Self::Codec(_) => ErrorKind::Codec,
        }
    }
}
