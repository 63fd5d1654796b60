//! # Reordering Writer
//!
//! The only stage that touches the root logs. Roots arrive in completion
//! order from every collector; the writer buffers them per pool in a
//! [`MinQueue`] and appends a root only once it is the pool's next ordinal.
//!
//! ```text
//! arrivals:   3      1          2
//! pending:   {3}   {1,3}->{3}  {2,3}->{}
//! appended:   -      1          2, 3
//! ```
//!
//! After every change it checks whether all pools are complete and, if so,
//! triggers the run's shutdown signal.

use std::collections::HashMap;
use std::path::Path;

use mr_02_root_log::RootLog;
use shared_types::{BundleId, Hash, PoolId, PoolTarget};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::shutdown::{ShutdownListener, ShutdownSignal};
use crate::domain::{MinQueue, PipelineError, PoolReport, RunReport, WriterMessage};

struct PoolLane {
    log: RootLog,
    target: Option<BundleId>,
    sealed_at: Option<u64>,
    start_height: u64,
    pending: MinQueue<BundleId, Hash>,
}

impl PoolLane {
    fn is_complete(&self) -> bool {
        let height = self.log.height();
        match self.target {
            Some(target) => height >= target,
            None => self.sealed_at.is_some_and(|sealed| height >= sealed),
        }
    }

    /// Append every pending root that is next in line.
    fn flush(&mut self) -> Result<u64, PipelineError> {
        let pool_id = self.log.pool_id();
        let mut appended = 0;

        while let Some(&ordinal) = self.pending.peek_key() {
            let height = self.log.height();
            if ordinal > height {
                break;
            }
            let Some((ordinal, root)) = self.pending.pop() else {
                break;
            };
            if ordinal < height {
                warn!(pool_id, bundle_id = ordinal, height, "Discarding duplicate root");
                continue;
            }

            let height = self.log.append(&root)?;
            appended += 1;
            info!(pool_id, height, root = %hex::encode(root), "Appended root");
        }
        Ok(appended)
    }
}

/// Single consumer of the result queue.
pub struct ReorderingWriter {
    lanes: HashMap<PoolId, PoolLane>,
    order: Vec<PoolId>,
    result_rx: mpsc::Receiver<WriterMessage>,
    completion: ShutdownSignal,
    shutdown: ShutdownListener,
    run_id: Uuid,
}

impl ReorderingWriter {
    /// Open the log of every pool in `pools`.
    ///
    /// Fails on a corrupted log before anything is read from the queue.
    pub fn open(
        output_dir: &Path,
        pools: &[PoolTarget],
        result_rx: mpsc::Receiver<WriterMessage>,
        completion: ShutdownSignal,
        run_id: Uuid,
    ) -> Result<Self, PipelineError> {
        let mut lanes = HashMap::with_capacity(pools.len());
        for pool in pools {
            let log = RootLog::open(output_dir, pool.pool_id)?;
            lanes.insert(
                pool.pool_id,
                PoolLane {
                    start_height: log.height(),
                    log,
                    target: pool.target(),
                    sealed_at: None,
                    pending: MinQueue::new(),
                },
            );
        }

        Ok(Self {
            lanes,
            order: pools.iter().map(|p| p.pool_id).collect(),
            result_rx,
            shutdown: completion.subscribe(),
            completion,
            run_id,
        })
    }

    /// Whether every pool has reached its target.
    pub fn is_complete(&self) -> bool {
        self.lanes.values().all(PoolLane::is_complete)
    }

    /// Consume results until every pool is complete.
    ///
    /// # Errors
    ///
    /// - append failures
    /// - `Cancelled` if shutdown is triggered elsewhere first
    /// - `Incomplete` if the queue closes before completion
    pub async fn run(mut self) -> Result<RunReport, PipelineError> {
        if self.is_complete() {
            info!("All pools already at target");
            self.completion.trigger();
            return Ok(self.report());
        }

        loop {
            let message = tokio::select! {
                biased;
                _ = self.shutdown.wait() => return Err(PipelineError::Cancelled),
                message = self.result_rx.recv() => message,
            };
            let Some(message) = message else {
                // Producers stopped because the run was cancelled.
                if self.shutdown.is_triggered() {
                    return Err(PipelineError::Cancelled);
                }
                return Err(self.incomplete());
            };

            self.handle(message)?;

            if self.is_complete() {
                info!(total_appended = self.report().total_appended(), "All pools reached target");
                self.completion.trigger();
                return Ok(self.report());
            }
        }
    }

    fn handle(&mut self, message: WriterMessage) -> Result<(), PipelineError> {
        match message {
            WriterMessage::Entry(entry) => {
                let Some(lane) = self.lanes.get_mut(&entry.pool_id) else {
                    warn!(pool_id = entry.pool_id, "Root for unconfigured pool, ignoring");
                    return Ok(());
                };
                if entry.bundle_id < lane.log.height() {
                    warn!(
                        pool_id = entry.pool_id,
                        bundle_id = entry.bundle_id,
                        height = lane.log.height(),
                        "Discarding root below current height"
                    );
                    return Ok(());
                }
                lane.pending.push(entry.bundle_id, entry.root);
                debug!(
                    pool_id = entry.pool_id,
                    bundle_id = entry.bundle_id,
                    pending = lane.pending.len(),
                    "Buffered root"
                );
                lane.flush()?;
            }
            WriterMessage::Sealed {
                pool_id,
                final_height,
            } => {
                if let Some(lane) = self.lanes.get_mut(&pool_id) {
                    info!(pool_id, final_height, "Pool sealed");
                    lane.sealed_at = Some(final_height);
                }
            }
        }
        Ok(())
    }

    fn incomplete(&self) -> PipelineError {
        let (pool_id, height) = self
            .order
            .iter()
            .filter_map(|id| self.lanes.get(id).map(|lane| (*id, lane)))
            .find(|(_, lane)| !lane.is_complete())
            .map(|(id, lane)| (id, lane.log.height()))
            .unwrap_or_default();
        PipelineError::Incomplete { pool_id, height }
    }

    fn report(&self) -> RunReport {
        RunReport {
            run_id: self.run_id,
            pools: self
                .order
                .iter()
                .filter_map(|id| self.lanes.get(id))
                .map(|lane| PoolReport {
                    pool_id: lane.log.pool_id(),
                    start_height: lane.start_height,
                    final_height: lane.log.height(),
                })
                .collect(),
        }
    }
}
