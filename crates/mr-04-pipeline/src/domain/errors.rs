//! # Domain Errors
//!
//! Everything that can end a run.
//!
//! | Class | Variants | Retried |
//! |-------|----------|---------|
//! | Configuration | `InvalidConfig`, `UnsupportedRuntime`, `TargetBeyondLatest`, `NonConsecutive` | never |
//! | Corruption | `RootLog` with a corrupted log | never |
//! | Transport / decode / IO | `Source`, `Merkle`, `RootLog`, `Lock` | transient `Source` only |
//! | Lifecycle | `Incomplete`, `Cancelled`, `TaskFailed` | never |

use mr_01_merkle_tree::MerkleError;
use mr_02_root_log::{LockError, RootLogError};
use mr_03_bundle_source::SourceError;
use shared_types::{BundleId, PoolId};
use thiserror::Error;

/// Pipeline error types.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The configuration cannot be run.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The pool's runtime has no leaf hashing scheme.
    #[error("pool {pool_id}: runtime not supported: {runtime}")]
    UnsupportedRuntime {
        /// Pool
        pool_id: PoolId,
        /// Tag reported by the ledger
        runtime: String,
    },

    /// The listing ended before the target ordinal was reached.
    #[error("pool {pool_id}: target bundle {target} is beyond the latest finalized bundle (next would be {latest})")]
    TargetBeyondLatest {
        /// Pool
        pool_id: PoolId,
        /// Configured exclusive target
        target: BundleId,
        /// First ordinal the listing did not provide
        latest: BundleId,
    },

    /// The listing skipped an ordinal.
    #[error("pool {pool_id}: finalized bundles are not consecutive (expected {expected}, got {found})")]
    NonConsecutive {
        /// Pool
        pool_id: PoolId,
        /// Ordinal that should have come next
        expected: BundleId,
        /// Ordinal that came instead
        found: BundleId,
    },

    /// Listing, lookup or download failure.
    #[error("pool {pool_id}{}: {source}", bundle_suffix(.bundle_id))]
    Source {
        /// Pool
        pool_id: PoolId,
        /// Bundle, when the failure concerns one
        bundle_id: Option<BundleId>,
        /// Underlying failure
        #[source]
        source: SourceError,
    },

    /// Payload could not be turned into a root.
    #[error("pool {pool_id} bundle {bundle_id}: {source}")]
    Merkle {
        /// Pool
        pool_id: PoolId,
        /// Bundle
        bundle_id: BundleId,
        /// Underlying failure
        #[source]
        source: MerkleError,
    },

    /// Root log read or append failure.
    #[error(transparent)]
    RootLog(#[from] RootLogError),

    /// Output directory could not be locked.
    #[error(transparent)]
    Lock(#[from] LockError),

    /// Every producer stopped before all pools reached their target.
    #[error("pipeline stopped with pool {pool_id} at height {height}, short of its target")]
    Incomplete {
        /// First pool found short of its target
        pool_id: PoolId,
        /// Its height when the run stopped
        height: u64,
    },

    /// The run was cancelled from outside.
    #[error("pipeline cancelled")]
    Cancelled,

    /// A stage task panicked or was aborted.
    #[error("pipeline task failed: {0}")]
    TaskFailed(String),
}

fn bundle_suffix(bundle_id: &Option<BundleId>) -> String {
    bundle_id
        .map(|id| format!(" bundle {}", id))
        .unwrap_or_default()
}

impl PipelineError {
    /// Whether this error stems from configuration rather than a transient
    /// condition.
    pub fn is_configuration(&self) -> bool {
        match self {
            PipelineError::InvalidConfig(_)
            | PipelineError::UnsupportedRuntime { .. }
            | PipelineError::TargetBeyondLatest { .. }
            | PipelineError::NonConsecutive { .. } => true,
            PipelineError::Source { source, .. } => source.is_configuration(),
            PipelineError::Merkle { source, .. } => source.is_configuration(),
            _ => false,
        }
    }

    /// Whether this error reports an inconsistent root log.
    pub fn is_corruption(&self) -> bool {
        matches!(self, PipelineError::RootLog(e) if e.is_corruption())
    }
}
