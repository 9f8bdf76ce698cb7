//! Node configuration.

use registry_telemetry::TelemetryConfig;
use std::path::PathBuf;
use thiserror::Error;
use tl_02_registry::{ConfigError as RegistryConfigError, GenesisConfig, GenesisError, RegistryConfig};

/// Top-level configuration for the registry node.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Registry rules (scrutiny period, tolerances, restricted zones).
    pub registry: RegistryConfig,
    /// Logging configuration.
    pub telemetry: TelemetryConfig,
    /// JSON file with seed parcels; the built-in genesis is used when unset.
    pub genesis_file: Option<PathBuf>,
    /// Skip genesis seeding entirely.
    pub skip_genesis: bool,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Registry(#[from] RegistryConfigError),

    #[error(transparent)]
    Genesis(#[from] GenesisError),
}

impl NodeConfig {
    /// Load configuration from environment variables.
    ///
    /// Registry variables are read by [`RegistryConfig::from_env`], logging
    /// variables by [`TelemetryConfig::from_env`]. Node-level variables:
    ///
    /// - `LR_GENESIS_FILE`: path of a genesis JSON document
    /// - `LR_SKIP_GENESIS`: `true`/`1` to start on an empty ledger
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            registry: RegistryConfig::from_env()?,
            telemetry: TelemetryConfig::for_component("node"),
            genesis_file: std::env::var_os("LR_GENESIS_FILE").map(PathBuf::from),
            skip_genesis: std::env::var("LR_SKIP_GENESIS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),
        })
    }

    /// Configuration for tests: default rules, empty genesis.
    pub fn for_testing() -> Self {
        Self {
            registry: RegistryConfig::for_testing(),
            telemetry: TelemetryConfig::default(),
            genesis_file: None,
            skip_genesis: true,
        }
    }

    /// The genesis document this node seeds on start.
    pub fn genesis(&self) -> Result<GenesisConfig, ConfigError> {
        if self.skip_genesis {
            return Ok(GenesisConfig::empty());
        }
        match &self.genesis_file {
            Some(path) => Ok(GenesisConfig::from_file(path)?),
            None => Ok(GenesisConfig::default()),
        }
    }
}
