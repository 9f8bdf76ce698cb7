//! Subscriber setup and asset-scoped logging helpers.
//!
//! JSON lines carry consistent fields a log shipper can index:
//! - `timestamp`, `level`, `target`
//! - `asset_id`, `workflow`, `status` when logged through [`log_asset_event!`]
//! - span fields from `#[instrument]` on the service entry points

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Build the env filter, preferring `RUST_LOG`-style directives in `log_level`.
pub fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Filter(format!("{}: {}", config.log_level, e)))
}

/// Install the global subscriber.
///
/// Logs go to stderr so stdout stays free for command output.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = build_filter(config)?;

    if !config.console_output {
        tracing_subscriber::registry()
            .with(env_filter)
            .try_init()
            .map_err(|e| TelemetryError::SubscriberInit(e.to_string()))?;
        return Ok(());
    }

    if config.json_logs {
        let json_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError::SubscriberInit(e.to_string()))?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::SubscriberInit(e.to_string()))?;
    }

    tracing::info!(
        service = %config.full_service_name(),
        environment = %config.environment,
        json_logs = config.json_logs,
        "Logging initialized"
    );

    Ok(())
}

/// Log an asset-scoped event with the standard fields.
///
/// ```rust,ignore
/// log_asset_event!(info, "PARCEL_001", "SALE", "Transaction executed", status = "PENDING_SCRUTINY");
/// ```
#[macro_export]
macro_rules! log_asset_event {
    ($level:ident, $asset_id:expr, $workflow:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            asset_id = %$asset_id,
            workflow = %$workflow,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a payment-scoped event keyed by UTR.
#[macro_export]
macro_rules! log_payment_event {
    ($level:ident, $utr:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            utr = %$utr,
            $($($field)*,)?
            $msg
        )
    };
}
