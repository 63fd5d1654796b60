//! # Resume-Point Tracker
//!
//! Derives, for every configured pool, the next bundle ordinal to process
//! from nothing but the size of its root log.

use std::collections::BTreeMap;
use std::path::Path;

use shared_types::{PoolId, PoolTarget};
use tracing::info;

use crate::adapters::log_file::height_from_size;
use crate::domain::errors::RootLogError;
use crate::domain::naming::log_path;

/// Next ordinal to process for `pool_id`: `size / 32`, or 0 if no log exists.
///
/// # Errors
///
/// `RootLogError::Corrupted` when the size is not a multiple of 32. The
/// caller must refuse to resume such a pool.
pub fn resume_height(dir: &Path, pool_id: PoolId) -> Result<u64, RootLogError> {
    let path = log_path(dir, pool_id);
    match std::fs::metadata(&path) {
        Ok(meta) => height_from_size(&path, meta.len()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(RootLogError::io(&path, e)),
    }
}

/// Resume points of every pool in a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumeState {
    heights: BTreeMap<PoolId, u64>,
}

impl ResumeState {
    /// Resume height of `pool_id`, 0 for pools that were never seen.
    pub fn height(&self, pool_id: PoolId) -> u64 {
        self.heights.get(&pool_id).copied().unwrap_or(0)
    }

    /// Iterate `(pool, height)` pairs in ascending pool order.
    pub fn iter(&self) -> impl Iterator<Item = (PoolId, u64)> + '_ {
        self.heights.iter().map(|(pool, height)| (*pool, *height))
    }

    /// Whether `target` is already reached by the resume point.
    ///
    /// Unbounded targets are never complete.
    pub fn is_complete(&self, target: &PoolTarget) -> bool {
        target
            .target()
            .is_some_and(|t| self.height(target.pool_id) >= t)
    }
}

/// Compute resume points for all configured pools.
pub fn resume_heights(dir: &Path, pools: &[PoolTarget]) -> Result<ResumeState, RootLogError> {
    let mut heights = BTreeMap::new();
    for pool in pools {
        let height = resume_height(dir, pool.pool_id)?;
        info!(
            pool_id = pool.pool_id,
            height,
            target = pool.target_bundle_id,
            "Resuming pool"
        );
        heights.insert(pool.pool_id, height);
    }
    Ok(ResumeState { heights })
}
