//! # Terra-Ledger Node
//!
//! Runtime harness for the land registry engine.
//!
//! ## Modular Structure
//!
//! - `config` - [`NodeConfig`]: registry rules, logging, genesis source
//! - `commands` - JSON-lines command protocol over [`LandRegistryApi`]
//! - `runtime` - [`NodeRuntime`]: wiring, genesis seeding, serve loop
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Initialise logging
//! 3. Wire the registry service over the in-memory ledger
//! 4. Seed genesis parcels (idempotent)
//! 5. Serve commands from stdin until EOF
//!
//! [`LandRegistryApi`]: tl_02_registry::LandRegistryApi

pub mod commands;
pub mod config;
pub mod runtime;

pub use commands::{handle, handle_line, Command, Response};
pub use config::{ConfigError, NodeConfig};
pub use runtime::{NodeRuntime, NodeService};
