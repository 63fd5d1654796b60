//! # Merkle Runtime
//!
//! Entry point. See the library crate for the startup sequence.

use anyhow::Result;
use clap::Parser;

use merkle_runtime::{commands, Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Start(args) => {
            let report = commands::start(&args).await?;
            tracing::info!(
                run_id = %report.run_id,
                appended = report.total_appended(),
                "Finished"
            );
        }
        Command::Test(args) => {
            let entry = commands::test(&args).await?;
            println!("{}", entry.root_hex());
        }
    }
    Ok(())
}
