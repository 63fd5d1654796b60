//! # Pipeline Configuration
//!
//! Plain structure consumed by [`Pipeline`](crate::Pipeline). Loading it
//! from disk is the binary's job.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared_types::PoolTarget;

use crate::domain::PipelineError;

/// Default bounded queue depth between stages.
pub const DEFAULT_QUEUE_DEPTH: usize = 16;

/// Default finalized-bundle listing page size.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Retry policy for transient upstream failures.
///
/// `max_attempts == 0` disables retries: the first failure aborts the run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure.
    pub max_attempts: u32,
    /// Backoff before the first retry, doubled for each further one.
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            backoff_ms: 1000,
        }
    }
}

impl RetryPolicy {
    /// No retries.
    pub fn none() -> Self {
        Self::default()
    }

    /// Backoff before retry number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_ms.saturating_mul(factor))
    }
}

/// Pipeline configuration.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Directory holding the per-pool root logs.
    pub output_dir: PathBuf,
    /// Pools to process, in configuration order.
    pub pools: Vec<PoolTarget>,
    /// Number of collector tasks.
    pub workers: usize,
    /// Bounded depth of the work queue (bundle descriptors).
    pub queue_depth: usize,
    /// Bounded depth of the result queue (computed roots).
    pub result_queue_depth: usize,
    /// Listing page size.
    pub page_size: usize,
    /// Wait between two listing pages of one pool.
    pub request_interval: Duration,
    /// Retry policy for transient failures.
    pub retry: RetryPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            pools: Vec::new(),
            workers: 4,
            queue_depth: DEFAULT_QUEUE_DEPTH,
            result_queue_depth: DEFAULT_QUEUE_DEPTH,
            page_size: DEFAULT_PAGE_SIZE,
            request_interval: Duration::from_millis(1000),
            retry: RetryPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a config for testing (no page interval, small queues).
    pub fn for_testing(output_dir: impl Into<PathBuf>, pools: Vec<PoolTarget>) -> Self {
        Self {
            output_dir: output_dir.into(),
            pools,
            workers: 4,
            queue_depth: 4,
            result_queue_depth: 4,
            page_size: DEFAULT_PAGE_SIZE,
            request_interval: Duration::ZERO,
            retry: RetryPolicy {
                max_attempts: 0,
                backoff_ms: 1,
            },
        }
    }

    /// Reject configurations the pipeline cannot run.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.pools.is_empty() {
            return Err(PipelineError::InvalidConfig("no pools configured".into()));
        }
        let mut seen = HashSet::new();
        for pool in &self.pools {
            if !seen.insert(pool.pool_id) {
                return Err(PipelineError::InvalidConfig(format!(
                    "pool {} configured more than once",
                    pool.pool_id
                )));
            }
        }
        let positive = [
            ("worker", self.workers),
            ("queue_depth", self.queue_depth),
            ("result_queue_depth", self.result_queue_depth),
            ("page_size", self.page_size),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(PipelineError::InvalidConfig(format!(
                    "{} must be at least 1",
                    name
                )));
            }
        }
        Ok(())
    }
}
