//! # Merkle Runtime
//!
//! Command-line front end of the rebuild pipeline.
//!
//! ## Startup Sequence
//!
//! 1. Parse the command line
//! 2. Load and validate `config.yaml`
//! 3. Build the log dispatch (`RUST_LOG` or `log_level`)
//! 4. Create the ledger and storage clients
//! 5. Run the command; Ctrl+C cancels a `start` run cleanly
//!
//! ## Modules
//!
//! - `cli` - clap argument definitions
//! - `config` - `config.yaml` schema, defaults and validation
//! - `logging` - tracing-subscriber setup
//! - `commands` - `start` and `test`

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;

pub use cli::{Cli, Command, CommonArgs, TestArgs};
pub use config::{ConfigError, RuntimeConfig, CONFIG_FILE};
