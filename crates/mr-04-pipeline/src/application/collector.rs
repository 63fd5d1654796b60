//! # Bundle Collector
//!
//! Worker stage. Any number of collectors share one work queue; each pulls
//! a descriptor, downloads the payload, hashes it and publishes the root.
//! Completion order across collectors is arbitrary.

use std::sync::Arc;

use mr_01_merkle_tree::{bundle_root, decode_bundle};
use mr_03_bundle_source::BundleFetcher;
use shared_types::{BundleDescriptor, MerkleRootEntry};
use tokio::sync::{mpsc, Mutex};
use tracing::{dispatcher, info};

use super::retry::with_retry;
use super::shutdown::ShutdownListener;
use crate::config::RetryPolicy;
use crate::domain::{PipelineError, WriterMessage};

/// Work queue receiver shared by every collector.
pub type SharedWorkQueue = Arc<Mutex<mpsc::Receiver<BundleDescriptor>>>;

/// One worker of the collector pool.
pub struct BundleCollector {
    fetcher: Arc<dyn BundleFetcher>,
    work_rx: SharedWorkQueue,
    result_tx: mpsc::Sender<WriterMessage>,
    retry: RetryPolicy,
    shutdown: ShutdownListener,
}

impl BundleCollector {
    /// Create a collector.
    pub fn new(
        fetcher: Arc<dyn BundleFetcher>,
        work_rx: SharedWorkQueue,
        result_tx: mpsc::Sender<WriterMessage>,
        retry: RetryPolicy,
        shutdown: ShutdownListener,
    ) -> Self {
        Self {
            fetcher,
            work_rx,
            result_tx,
            retry,
            shutdown,
        }
    }

    /// Process descriptors until the work queue closes or shutdown.
    ///
    /// Stops at the first failure without pulling further work. Returns the
    /// number of roots published.
    pub async fn run(self) -> Result<u64, PipelineError> {
        let mut shutdown = self.shutdown.clone();
        let mut published = 0;

        loop {
            let next = tokio::select! {
                _ = shutdown.wait() => return Ok(published),
                next = async { self.work_rx.lock().await.recv().await } => next,
            };
            // Queue closed: every indexer finished and the queue is drained.
            let Some(descriptor) = next else {
                return Ok(published);
            };

            let entry = tokio::select! {
                _ = shutdown.wait() => return Ok(published),
                entry = self.process(&descriptor) => entry?,
            };

            tokio::select! {
                _ = shutdown.wait() => return Ok(published),
                sent = self.result_tx.send(WriterMessage::Entry(entry)) => {
                    if sent.is_err() {
                        return Ok(published);
                    }
                }
            }

            info!(
                pool_id = entry.pool_id,
                bundle_id = entry.bundle_id,
                root = %entry.root_hex(),
                "Computed Merkle root"
            );
            published += 1;
        }
    }

    async fn process(
        &self,
        descriptor: &BundleDescriptor,
    ) -> Result<MerkleRootEntry, PipelineError> {
        compute_root(self.fetcher.as_ref(), &self.retry, descriptor).await
    }
}

/// Download one bundle and compute its Merkle root.
///
/// Decoding and hashing run on the blocking pool under the caller's
/// dispatch.
pub async fn compute_root(
    fetcher: &dyn BundleFetcher,
    retry: &RetryPolicy,
    descriptor: &BundleDescriptor,
) -> Result<MerkleRootEntry, PipelineError> {
    let pool_id = descriptor.pool_id;
    let bundle_id = descriptor.bundle_id;

    let payload = with_retry(retry, "bundle download", || {
        fetcher.fetch_bundle(&descriptor.location)
    })
    .await
    .map_err(|source| PipelineError::Source {
        pool_id,
        bundle_id: Some(bundle_id),
        source,
    })?;

    let runtime = descriptor.runtime;
    let dispatch = dispatcher::get_default(|d| d.clone());
    let root = tokio::task::spawn_blocking(move || {
        dispatcher::with_default(&dispatch, || {
            let items = decode_bundle(&payload)?;
            bundle_root(&items, runtime)
        })
    })
    .await
    .map_err(|e| PipelineError::TaskFailed(e.to_string()))?
    .map_err(|source| PipelineError::Merkle {
        pool_id,
        bundle_id,
        source,
    })?;

    Ok(MerkleRootEntry::new(pool_id, bundle_id, root))
}
