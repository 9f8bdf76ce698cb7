//! # Registry Telemetry
//!
//! Structured logging bootstrap for Terra-Ledger binaries and test harnesses.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use registry_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::for_component("node"))?;
//!     // Registry code logs through `tracing` from here on
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LR_SERVICE_NAME` | `terra-ledger` | Service name in log lines |
//! | `LR_LOG_LEVEL` | `RUST_LOG`, then `info` | Filter directive |
//! | `LR_JSON_LOGS` | `false` (`true` in containers) | JSON instead of pretty output |
//! | `LR_CONSOLE_OUTPUT` | `true` | Write log lines to stderr |
//! | `LR_ENVIRONMENT` | `dev` | Deployment environment |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{build_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter {0}")]
    Filter(String),

    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Initialize logging.
///
/// Returns a guard held for the lifetime of the application; dropping it
/// logs the shutdown.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    logging::init_logging(&config)?;
    Ok(TelemetryGuard {
        service: config.full_service_name(),
    })
}

/// Guard that marks the telemetry lifetime.
pub struct TelemetryGuard {
    service: String,
}

impl TelemetryGuard {
    pub fn service(&self) -> &str {
        &self.service
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service, "Shutting down telemetry");
    }
}

/// Convenience macro for creating a span with asset context.
///
/// ```rust,ignore
/// let _span = registry_span!("approve_mutation", asset_id = "PARCEL_001").entered();
/// ```
#[macro_export]
macro_rules! registry_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
