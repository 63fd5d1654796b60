//! # Stage Messages and Run Report

use serde::Serialize;
use shared_types::{MerkleRootEntry, PoolId};
use uuid::Uuid;

/// What the writer receives on the result queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriterMessage {
    /// A computed root, from a collector.
    Entry(MerkleRootEntry),
    /// From the indexer of an unbounded pool: the listing is exhausted and
    /// `final_height` is the number of bundles the pool has.
    Sealed {
        /// Pool whose listing ended
        pool_id: PoolId,
        /// Height at which the pool is complete
        final_height: u64,
    },
}

/// Outcome of one pool in a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolReport {
    /// Pool
    pub pool_id: PoolId,
    /// Resume height at startup
    pub start_height: u64,
    /// Height when the run finished
    pub final_height: u64,
}

impl PoolReport {
    /// Entries appended during this run.
    pub fn appended(&self) -> u64 {
        self.final_height - self.start_height
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Correlation id carried by every log line of the run
    pub run_id: Uuid,
    /// Per-pool outcome, in configuration order
    pub pools: Vec<PoolReport>,
}

impl RunReport {
    /// Report for `pool_id`, if it was part of the run.
    pub fn pool(&self, pool_id: PoolId) -> Option<&PoolReport> {
        self.pools.iter().find(|p| p.pool_id == pool_id)
    }

    /// Entries appended across all pools.
    pub fn total_appended(&self) -> u64 {
        self.pools.iter().map(PoolReport::appended).sum()
    }
}
