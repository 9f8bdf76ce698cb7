//! Registry configuration.
//!
//! Defaults reproduce the statutory values; every field can be overridden from
//! the environment for local runs.

use shared_types::LocalUnit;
use std::env;
use thiserror::Error;
use tl_01_validators::spatial::DEFAULT_TOLERANCE_PERCENT;
use tl_01_validators::zoning::{self, RestrictedZone};

/// Milliseconds in one day.
pub const DAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Statutory scrutiny period before a mutation may be approved.
pub const DEFAULT_SCRUTINY_DAYS: u64 = 30;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Land Registry configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryConfig {
    /// Minimum wait between a transfer request and its approval (ms).
    pub scrutiny_period_ms: u64,
    /// Allowed deviation of the owner-share total from 100.
    pub share_tolerance: f64,
    /// Allowed deviation between child and parent areas (hectares).
    pub area_tolerance_hectares: f64,
    /// Allowed claimed-vs-computed area deviation (percent).
    pub spatial_tolerance_percent: f64,
    /// Display unit for newly created assets.
    pub default_local_unit: LocalUnit,
    /// Encroachment zones checked against structured boundaries.
    pub restricted_zones: Vec<RestrictedZone>,
    /// Accept pre-ULPIN keys for new assets.
    pub allow_legacy_ids: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            scrutiny_period_ms: DEFAULT_SCRUTINY_DAYS * DAY_MS,
            share_tolerance: 0.01,
            area_tolerance_hectares: 0.01,
            spatial_tolerance_percent: DEFAULT_TOLERANCE_PERCENT,
            default_local_unit: LocalUnit::Guntha,
            restricted_zones: zoning::default_zones(),
            allow_legacy_ids: true,
        }
    }
}

impl RegistryConfig {
    /// Statutory values with no restricted zones, so fixtures may sit anywhere.
    pub fn for_testing() -> Self {
        Self {
            restricted_zones: Vec::new(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `LR_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(days) = parse_var::<u64, _>(&lookup, "LR_SCRUTINY_DAYS")? {
            config.scrutiny_period_ms = days.saturating_mul(DAY_MS);
        }
        if let Some(pct) = parse_var::<f64, _>(&lookup, "LR_SPATIAL_TOLERANCE_PERCENT")? {
            config.spatial_tolerance_percent = non_negative("LR_SPATIAL_TOLERANCE_PERCENT", pct)?;
        }
        if let Some(ha) = parse_var::<f64, _>(&lookup, "LR_AREA_TOLERANCE_HECTARES")? {
            config.area_tolerance_hectares = non_negative("LR_AREA_TOLERANCE_HECTARES", ha)?;
        }
        if let Some(raw) = lookup("LR_RESTRICTED_ZONES") {
            config.restricted_zones =
                serde_json::from_str(&raw).map_err(|e| ConfigError::InvalidValue {
                    var: "LR_RESTRICTED_ZONES",
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
        }
        if let Some(raw) = lookup("LR_ALLOW_LEGACY_IDS") {
            config.allow_legacy_ids = match raw.to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "LR_ALLOW_LEGACY_IDS",
                        value: raw,
                        reason: "expected true or false".into(),
                    })
                }
            };
        }

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                var,
                value: raw,
                reason: e.to_string(),
            }),
    }
}

fn non_negative(var: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
            reason: "must be a non-negative number".into(),
        })
    }
}
