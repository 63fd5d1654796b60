//! # Single-Bundle Probe
//!
//! Computes the root of one finalized bundle without touching any log.
//! Used to spot-check a pool before a full run.

use mr_03_bundle_source::{BundleFetcher, BundleSource};
use shared_types::{BundleDescriptor, BundleId, MerkleRootEntry, PoolId, RuntimeTag};
use tracing::info;

use super::collector::compute_root;
use super::retry::with_retry;
use crate::config::RetryPolicy;
use crate::domain::PipelineError;

/// Resolve the pool's runtime, fetch bundle `bundle_id` and compute its
/// root.
pub async fn probe_bundle(
    source: &dyn BundleSource,
    fetcher: &dyn BundleFetcher,
    retry: &RetryPolicy,
    pool_id: PoolId,
    bundle_id: BundleId,
) -> Result<MerkleRootEntry, PipelineError> {
    let runtime = lookup_runtime(source, retry, pool_id).await?;

    let bundle = with_retry(retry, "bundle lookup", || {
        source.finalized_bundle(pool_id, bundle_id)
    })
    .await
    .map_err(|source| PipelineError::Source {
        pool_id,
        bundle_id: Some(bundle_id),
        source,
    })?;

    let descriptor = BundleDescriptor {
        pool_id,
        bundle_id: bundle.id,
        runtime,
        location: bundle.location(),
    };
    let entry = compute_root(fetcher, retry, &descriptor).await?;
    info!(
        pool_id,
        bundle_id = entry.bundle_id,
        root = %entry.root_hex(),
        "Computed Merkle root"
    );
    Ok(entry)
}

/// Look up the pool and parse its runtime tag.
pub async fn lookup_runtime(
    source: &dyn BundleSource,
    retry: &RetryPolicy,
    pool_id: PoolId,
) -> Result<RuntimeTag, PipelineError> {
    let info = with_retry(retry, "pool lookup", || source.pool_info(pool_id))
        .await
        .map_err(|source| PipelineError::Source {
            pool_id,
            bundle_id: None,
            source,
        })?;

    info.runtime
        .parse::<RuntimeTag>()
        .map_err(|_| PipelineError::UnsupportedRuntime {
            pool_id,
            runtime: info.runtime.clone(),
        })
}
