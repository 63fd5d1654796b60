//! # Scenario Fixtures
//!
//! Deterministic payloads, an in-memory upstream and a one-call pipeline
//! runner shared by the integration scenarios.

use std::path::Path;
use std::sync::Arc;

use mr_01_merkle_tree::{bundle_root, decode_bundle};
use mr_03_bundle_source::{BundleFetcher, BundleSource, Compression, InMemoryBundleSource};
use mr_04_pipeline::{Pipeline, PipelineConfig, PipelineError, RunLogger, RunReport};
use shared_types::{BundleId, Hash, PoolId, PoolTarget, RuntimeTag};

/// Items per generated bundle.
pub const ITEMS_PER_BUNDLE: u64 = 4;

/// Tendermint bundle `bundle_id` of `pool_id`: four blocks with their results.
pub fn tendermint_payload(pool_id: PoolId, bundle_id: BundleId) -> Vec<u8> {
    let first = bundle_id * ITEMS_PER_BUNDLE + 1;
    let items: Vec<String> = (first..first + ITEMS_PER_BUNDLE)
        .map(|height| {
            format!(
                r#"{{"key":"{height}","value":{{"block":{{"header":{{"chain_id":"pool-{pool_id}","height":"{height}"}},"data":{{"txs":[]}}}},"block_results":{{"height":"{height}","txs_results":null}}}}}}"#
            )
        })
        .collect();
    format!("[{}]", items.join(",")).into_bytes()
}

/// Bsync bundle `bundle_id`: the same four heights as whole items.
pub fn bsync_payload(bundle_id: BundleId) -> Vec<u8> {
    let first = bundle_id * ITEMS_PER_BUNDLE + 1;
    let items: Vec<String> = (first..first + ITEMS_PER_BUNDLE)
        .map(|height| format!(r#"{{"key":"{height}","value":{{"block":{{"height":"{height}"}}}}}}"#))
        .collect();
    format!("[{}]", items.join(",")).into_bytes()
}

/// Root a serial, single-threaded computation gives for `payload`.
pub fn expected_root(payload: &[u8], runtime: RuntimeTag) -> Hash {
    let items = decode_bundle(payload).expect("fixture payload decodes");
    bundle_root(&items, runtime).expect("fixture payload hashes")
}

/// Builder for an in-memory upstream.
#[derive(Default)]
pub struct Upstream {
    source: InMemoryBundleSource,
}

impl Upstream {
    /// Empty upstream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tendermint pool with `bundles` gzip-compressed bundles.
    pub fn tendermint_pool(mut self, pool_id: PoolId, bundles: u64) -> Self {
        self.source.add_pool(pool_id, "@kyvejs/tendermint");
        for bundle_id in 0..bundles {
            self.source.add_bundle(
                pool_id,
                &tendermint_payload(pool_id, bundle_id),
                Compression::Gzip,
            );
        }
        self
    }

    /// Bsync pool with `bundles` uncompressed bundles.
    pub fn bsync_pool(mut self, pool_id: PoolId, bundles: u64) -> Self {
        self.source.add_pool(pool_id, "@kyvejs/tendermint-bsync");
        for bundle_id in 0..bundles {
            self.source
                .add_bundle(pool_id, &bsync_payload(bundle_id), Compression::None);
        }
        self
    }

    /// Adjust the underlying source directly.
    pub fn with(mut self, f: impl FnOnce(&mut InMemoryBundleSource)) -> Self {
        f(&mut self.source);
        self
    }

    /// Finish building.
    pub fn build(self) -> Arc<InMemoryBundleSource> {
        Arc::new(self.source)
    }
}

/// Test configuration writing to `dir`.
pub fn config(dir: &Path, pools: &[(PoolId, BundleId)]) -> PipelineConfig {
    PipelineConfig::for_testing(
        dir,
        pools
            .iter()
            .map(|&(pool_id, target)| PoolTarget::new(pool_id, target))
            .collect(),
    )
}

/// Pipeline reading from and downloading through `upstream`.
pub fn pipeline(config: PipelineConfig, upstream: &Arc<InMemoryBundleSource>) -> Pipeline {
    Pipeline::new(
        config,
        Arc::clone(upstream) as Arc<dyn BundleSource>,
        Arc::clone(upstream) as Arc<dyn BundleFetcher>,
        RunLogger::disabled(),
    )
}

/// Run a pipeline to the end.
pub async fn run(
    config: PipelineConfig,
    upstream: &Arc<InMemoryBundleSource>,
) -> Result<RunReport, PipelineError> {
    pipeline(config, upstream).run().await
}
