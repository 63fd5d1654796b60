//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use shared_types::{BundleId, PoolId};

/// Reconstructs the Merkle roots of already archived bundles.
#[derive(Parser, Debug)]
#[command(name = "merkle-runtime")]
#[command(about = "Reconstructs the Merkle roots of already archived KYVE bundles")]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rebuild the root logs of every configured pool
    Start(CommonArgs),
    /// Compute and print the root of a single finalized bundle
    Test(TestArgs),
}

/// Flags shared by every command.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Directory containing config.yaml
    #[arg(long, default_value = "./")]
    pub config: PathBuf,

    /// Storage endpoint for bundle payloads (empty: provider gateways)
    #[arg(long, default_value = "")]
    pub storage_rest: String,
}

/// Flags of the `test` command.
#[derive(Args, Debug, Clone)]
pub struct TestArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Pool id
    #[arg(long)]
    pub pool_id: PoolId,

    /// Bundle id
    #[arg(long)]
    pub bundle_id: BundleId,
}
