//! # Bundle Indexer
//!
//! Producer stage: walks one pool's finalized-bundle listing and feeds the
//! work queue in ascending ordinal order.
//!
//! ```text
//! FETCHING_PAGE ──rows──► EMITTING ──► FETCHING_PAGE
//!       │                    │
//!       │                    └── ordinal == target - 1 emitted ──► DONE
//!       └── no next page ──► bounded target: FAILED (TargetBeyondLatest)
//!                            unbounded:      Sealed ──► DONE
//! ```
//!
//! The first page is requested at the resume height by offset, later pages
//! by continuation key. Ordinals below the resume height are still skipped
//! if a provider ignores the offset.

use std::sync::Arc;
use std::time::Duration;

use mr_03_bundle_source::{BundleSource, FinalizedBundle, PageCursor};
use shared_types::{BundleDescriptor, BundleId, PoolTarget, RuntimeTag};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::retry::with_retry;
use super::shutdown::ShutdownListener;
use crate::config::{PipelineConfig, RetryPolicy};
use crate::domain::{PipelineError, WriterMessage};

/// Per-pool producer.
pub struct BundleIndexer {
    pool: PoolTarget,
    runtime: RuntimeTag,
    start: BundleId,
    source: Arc<dyn BundleSource>,
    work_tx: mpsc::Sender<BundleDescriptor>,
    result_tx: mpsc::Sender<WriterMessage>,
    page_size: usize,
    request_interval: Duration,
    retry: RetryPolicy,
    shutdown: ShutdownListener,
}

enum Emit {
    Sent,
    Stopped,
}

impl BundleIndexer {
    /// Create an indexer for `pool` starting at ordinal `start`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PoolTarget,
        runtime: RuntimeTag,
        start: BundleId,
        source: Arc<dyn BundleSource>,
        work_tx: mpsc::Sender<BundleDescriptor>,
        result_tx: mpsc::Sender<WriterMessage>,
        config: &PipelineConfig,
        shutdown: ShutdownListener,
    ) -> Self {
        Self {
            pool,
            runtime,
            start,
            source,
            work_tx,
            result_tx,
            page_size: config.page_size,
            request_interval: config.request_interval,
            retry: config.retry.clone(),
            shutdown,
        }
    }

    /// Run until the target is reached, the listing ends, or shutdown.
    ///
    /// Returns the number of descriptors emitted.
    pub async fn run(mut self) -> Result<u64, PipelineError> {
        let pool_id = self.pool.pool_id;
        let target = self.pool.target();

        if target.is_some_and(|t| self.start >= t) {
            info!(height = self.start, "Pool already at target, nothing to index");
            return Ok(0);
        }

        let mut next = self.start;
        let mut key: Option<String> = None;
        let mut first_page = true;

        loop {
            if !first_page && !self.request_interval.is_zero() {
                tokio::select! {
                    _ = self.shutdown.wait() => return Ok(next - self.start),
                    _ = tokio::time::sleep(self.request_interval) => {}
                }
            }
            first_page = false;

            let page = {
                let source = &self.source;
                let page_size = self.page_size;
                let cursor = key
                    .as_deref()
                    .map_or(PageCursor::Offset(self.start), PageCursor::Key);
                let request = with_retry(&self.retry, "listing page", || {
                    source.finalized_bundles_page(pool_id, page_size, cursor)
                });
                tokio::select! {
                    _ = self.shutdown.wait() => return Ok(next - self.start),
                    page = request => page.map_err(|source| PipelineError::Source {
                        pool_id,
                        bundle_id: None,
                        source,
                    })?,
                }
            };
            debug!(
                rows = page.bundles.len(),
                has_next = page.next_key.is_some(),
                "Fetched listing page"
            );

            for bundle in page.bundles {
                if bundle.id < self.start {
                    continue;
                }
                // `next` is always below the target here, so a jump past it
                // is a gap even when it lands on or beyond the target.
                if bundle.id != next {
                    return Err(PipelineError::NonConsecutive {
                        pool_id,
                        expected: next,
                        found: bundle.id,
                    });
                }

                match self.emit(bundle).await {
                    Emit::Sent => next += 1,
                    Emit::Stopped => return Ok(next - self.start),
                }

                if target == Some(next) {
                    info!(target = next, "Reached target bundle");
                    return Ok(next - self.start);
                }
            }

            match page.next_key {
                Some(next_key) => key = Some(next_key),
                None => break,
            }
        }

        match target {
            Some(target) => Err(PipelineError::TargetBeyondLatest {
                pool_id,
                target,
                latest: next,
            }),
            None => {
                info!(final_height = next, "Reached latest bundle, sealing pool");
                let sealed = WriterMessage::Sealed {
                    pool_id,
                    final_height: next,
                };
                tokio::select! {
                    _ = self.shutdown.wait() => {}
                    _ = self.result_tx.send(sealed) => {}
                }
                Ok(next - self.start)
            }
        }
    }

    async fn emit(&mut self, bundle: FinalizedBundle) -> Emit {
        let descriptor = BundleDescriptor {
            pool_id: self.pool.pool_id,
            bundle_id: bundle.id,
            runtime: self.runtime,
            location: bundle.location(),
        };
        tokio::select! {
            _ = self.shutdown.wait() => Emit::Stopped,
            sent = self.work_tx.send(descriptor) => match sent {
                Ok(()) => {
                    debug!(bundle_id = bundle.id, "Queued bundle");
                    Emit::Sent
                }
                // Every collector is gone; the run is ending.
                Err(_) => Emit::Stopped,
            },
        }
    }
}
