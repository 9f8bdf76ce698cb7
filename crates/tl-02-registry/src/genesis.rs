//! # Genesis Seeding
//!
//! Creates the configured seed parcels when a node starts on an empty (or
//! partially seeded) ledger. Seeding is idempotent: parcels that already
//! exist are skipped, never overwritten.

use crate::domain::errors::RegistryError;
use crate::ports::inbound::{CreateParcelRequest, LandRegistryApi};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Owner of the default seed parcel.
pub const GENESIS_OWNER: &str = "GOV_INDIA_TREASURY";

/// Genesis errors.
#[derive(Debug, Error)]
pub enum GenesisError {
    /// Invalid genesis configuration.
    #[error("Invalid genesis configuration: {0}")]
    InvalidConfig(String),

    /// Genesis file could not be read.
    #[error("Failed to read genesis file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A seed parcel was rejected by the registry.
    #[error("Failed to seed parcel {parcel_id}: {source}")]
    Seed {
        parcel_id: String,
        #[source]
        source: RegistryError,
    },
}

/// Seed parcels created at node start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenesisConfig {
    pub parcels: Vec<CreateParcelRequest>,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            parcels: vec![CreateParcelRequest::new(
                "PARCEL_001",
                GENESIS_OWNER,
                "POLYGON((0 0, 0 10, 10 10, 10 0, 0 0))",
                "QmXoypizjW3WknFiJnKLwHCnL72vedxjQkDDP1mXWo6uco",
            )],
        }
    }
}

impl GenesisConfig {
    /// No seed parcels.
    pub fn empty() -> Self {
        Self {
            parcels: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, GenesisError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| GenesisError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, GenesisError> {
        let json = std::fs::read_to_string(path).map_err(|source| GenesisError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Rejects duplicate parcel ids.
    pub fn validate(&self) -> Result<(), GenesisError> {
        let mut seen = HashSet::new();
        for parcel in &self.parcels {
            if !seen.insert(parcel.parcel_id.as_str()) {
                return Err(GenesisError::InvalidConfig(format!(
                    "parcel {} is listed more than once",
                    parcel.parcel_id
                )));
            }
        }
        Ok(())
    }
}

/// Outcome of a seeding run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenesisReport {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
}

/// Creates every seed parcel that does not exist yet.
pub fn seed<A: LandRegistryApi + ?Sized>(
    api: &A,
    config: &GenesisConfig,
) -> Result<GenesisReport, GenesisError> {
    config.validate()?;
    let mut report = GenesisReport::default();

    for parcel in &config.parcels {
        let parcel_id = parcel.parcel_id.clone();
        match api.create_parcel(parcel.clone()) {
            Ok(_) => report.created.push(parcel_id),
            Err(RegistryError::AssetExists(_)) => {
                warn!(asset_id = %parcel_id, "Genesis parcel already exists; skipped");
                report.skipped.push(parcel_id);
            }
            Err(source) => return Err(GenesisError::Seed { parcel_id, source }),
        }
    }

    info!(
        created = report.created.len(),
        skipped = report.skipped.len(),
        "Genesis seeding complete"
    );
    Ok(report)
}
