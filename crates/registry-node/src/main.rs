//! # Terra-Ledger Node Runtime
//!
//! Reads one JSON command per line on stdin and answers one JSON line per
//! command on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use registry_node::{NodeConfig, NodeRuntime};
use registry_telemetry::init_telemetry;
use tracing::info;

fn main() -> Result<()> {
    let config = NodeConfig::from_env().context("Invalid node configuration")?;
    let _telemetry = init_telemetry(config.telemetry.clone()).context("Failed to init logging")?;

    let runtime = NodeRuntime::new(config);
    runtime.start()?;

    info!("Node is running. Reading commands from stdin.");
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    runtime.serve(stdin.lock(), stdout.lock())?;

    info!("Shutdown complete");
    Ok(())
}
