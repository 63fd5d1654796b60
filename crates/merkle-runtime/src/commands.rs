//! # Commands
//!
//! `start` runs the rebuild pipeline; `test` probes a single bundle.

use std::sync::Arc;

use anyhow::{Context, Result};
use mr_03_bundle_source::{BundleFetcher, BundleSource, KyveRestClient, StorageFetcher};
use mr_04_pipeline::{probe_bundle, Pipeline, RunLogger, RunReport};
use shared_types::MerkleRootEntry;
use tracing::{info, warn};

use crate::cli::{CommonArgs, TestArgs};
use crate::config::RuntimeConfig;
use crate::logging::build_dispatch;

type Bootstrapped = (
    RuntimeConfig,
    RunLogger,
    Arc<KyveRestClient>,
    Arc<StorageFetcher>,
);

/// Load config, install logging and build the HTTP adapters.
fn bootstrap(args: &CommonArgs) -> Result<Bootstrapped> {
    let config = RuntimeConfig::load(&args.config).context("Failed to load configuration")?;

    let dispatch = build_dispatch(&config.log_level, config.json_logs)?;
    // Already set when embedded; the run still logs through its own dispatch.
    let _ = tracing::dispatcher::set_global_default(dispatch.clone());
    let logger = RunLogger::new(dispatch);

    let chain_rest = config.chain_rest()?;
    let source = KyveRestClient::new(chain_rest).context("Failed to create ledger client")?;
    let fetcher =
        StorageFetcher::new(&args.storage_rest).context("Failed to create storage client")?;

    Ok((config, logger, Arc::new(source), Arc::new(fetcher)))
}

/// `start`: rebuild every configured pool.
pub async fn start(args: &CommonArgs) -> Result<RunReport> {
    let (config, logger, source, fetcher) = bootstrap(args)?;
    logger.in_scope(|| {
        info!(
            chain_rest = %source.base_url(),
            storage_rest = %args.storage_rest,
            "Using upstream endpoints"
        )
    });
    run_pipeline(&config, source, fetcher, logger).await
}

/// Run the pipeline for `config`, cancelling on Ctrl+C.
pub async fn run_pipeline(
    config: &RuntimeConfig,
    source: Arc<dyn BundleSource>,
    fetcher: Arc<dyn BundleFetcher>,
    logger: RunLogger,
) -> Result<RunReport> {
    let pipeline = Pipeline::new(config.pipeline_config(), source, fetcher, logger.clone());
    let run_id = pipeline.run_id();

    let signal = pipeline.shutdown_signal();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            logger.in_scope(|| warn!("Interrupt received, shutting down"));
            signal.trigger();
        }
    });

    let result = pipeline.run().await;
    ctrl_c.abort();

    result.with_context(|| format!("Run {} failed", run_id))
}

/// `test`: compute the root of one bundle with the pool's runtime.
pub async fn test(args: &TestArgs) -> Result<MerkleRootEntry> {
    let (config, logger, source, fetcher) = bootstrap(&args.common)?;

    let probe = probe_bundle(
        source.as_ref(),
        fetcher.as_ref(),
        &config.retry,
        args.pool_id,
        args.bundle_id,
    );
    logger
        .attach(logger.run_span(), probe)
        .await
        .with_context(|| {
            format!(
                "Failed to compute root of pool {} bundle {}",
                args.pool_id, args.bundle_id
            )
        })
}
