//! Node runtime: wiring, genesis and the command loop.

use crate::commands::{self, Response};
use crate::config::NodeConfig;
use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tl_02_registry::{
    genesis, GenesisReport, InMemoryLedger, LoggingPublisher, RegistryService, SystemTimeSource,
};
use registry_telemetry::{log_asset_event, registry_span};
use tracing::{info, warn};

/// Registry service as wired by the node.
pub type NodeService = RegistryService<Arc<InMemoryLedger>, SystemTimeSource, LoggingPublisher>;

/// The running node.
pub struct NodeRuntime {
    config: NodeConfig,
    ledger: Arc<InMemoryLedger>,
    service: NodeService,
}

impl NodeRuntime {
    /// Wires the registry over a fresh in-memory ledger.
    pub fn new(config: NodeConfig) -> Self {
        info!("Creating Terra-Ledger node runtime");
        let ledger = Arc::new(InMemoryLedger::new());
        let service = RegistryService::new(
            Arc::clone(&ledger),
            SystemTimeSource,
            LoggingPublisher,
            config.registry.clone(),
        );
        Self {
            config,
            ledger,
            service,
        }
    }

    pub fn service(&self) -> &NodeService {
        &self.service
    }

    /// Seeds genesis parcels.
    pub fn start(&self) -> Result<GenesisReport> {
        info!("===========================================");
        info!("  Terra-Ledger Node v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");
        info!(
            scrutiny_days = self.config.registry.scrutiny_period_ms / tl_02_registry::DAY_MS,
            restricted_zones = self.config.registry.restricted_zones.len(),
            "Registry configured"
        );

        let genesis_config = self
            .config
            .genesis()
            .context("Failed to load genesis configuration")?;
        let report = genesis::seed(&self.service, &genesis_config)
            .context("Failed to seed genesis parcels")?;

        for asset_id in &report.created {
            log_asset_event!(debug, asset_id, "GENESIS", "Seed parcel created");
        }
        info!(
            created = report.created.len(),
            skipped = report.skipped.len(),
            assets = self.ledger.len(),
            "Genesis applied"
        );
        Ok(report)
    }

    /// Serves commands until `input` is exhausted.
    ///
    /// Returns the number of commands handled. Failed commands are answered
    /// with an error line; only I/O failures end the loop early.
    pub fn serve<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<usize> {
        let mut handled = 0;
        for line in input.lines() {
            let line = line.context("Failed to read command")?;
            let _span = registry_span!("command", seq = handled + 1).entered();
            let Some(response) = commands::handle_line(&self.service, &line) else {
                continue;
            };
            if let Some(kind) = response.kind() {
                warn!(kind, "Command failed");
            }
            write_response(&mut output, &response)?;
            handled += 1;
        }
        info!(handled, "Input closed");
        Ok(handled)
    }

    /// Simulated ledger outage, for operator drills.
    pub fn set_ledger_unavailable(&self, unavailable: bool) {
        self.ledger.set_unavailable(unavailable);
    }
}

fn write_response<W: Write>(output: &mut W, response: &Response) -> Result<()> {
    serde_json::to_writer(&mut *output, response).context("Failed to encode response")?;
    output.write_all(b"\n").context("Failed to write response")?;
    output.flush().context("Failed to flush response")?;
    Ok(())
}
