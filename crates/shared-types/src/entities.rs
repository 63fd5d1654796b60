//! # Core Pipeline Entities
//!
//! ## Clusters
//!
//! - **Configuration**: `PoolTarget`
//! - **Work items**: `BundleDescriptor`, `BundleLocation`, `RuntimeTag`
//! - **Results**: `MerkleRootEntry`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::UnsupportedRuntime;

/// A 32-byte SHA-256 digest.
pub type Hash = [u8; 32];

/// Size in bytes of every hash in the pipeline and in the persisted log.
pub const HASH_SIZE: usize = 32;

/// Numeric pool identifier on the ledger.
pub type PoolId = u64;

/// Position of a bundle within a pool's archive (the bundle ordinal).
pub type BundleId = u64;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// One configured pool and the ordinal the run should stop at.
///
/// `target_bundle_id` is exclusive: a target of `3` reconstructs bundles
/// `0, 1, 2`. A target of `0` means "run until the latest finalized bundle".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolTarget {
    /// Pool to process.
    pub pool_id: PoolId,
    /// Exclusive stop ordinal, `0` for unbounded.
    #[serde(default)]
    pub target_bundle_id: BundleId,
}

impl PoolTarget {
    /// Create a bounded or unbounded target.
    pub fn new(pool_id: PoolId, target_bundle_id: BundleId) -> Self {
        Self {
            pool_id,
            target_bundle_id,
        }
    }

    /// Whether this pool runs until the latest finalized bundle.
    pub fn is_unbounded(&self) -> bool {
        self.target_bundle_id == 0
    }

    /// The exclusive stop ordinal, or `None` when unbounded.
    pub fn target(&self) -> Option<BundleId> {
        (!self.is_unbounded()).then_some(self.target_bundle_id)
    }
}

// =============================================================================
// WORK ITEMS
// =============================================================================

/// Leaf hashing scheme used for a pool's data items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeTag {
    /// `@kyvejs/tendermint`: items carry `block` and `block_results`.
    Tendermint,
    /// `@kyvejs/tendermint-bsync`: the whole item is hashed canonically.
    TendermintBsync,
}

impl RuntimeTag {
    /// Registry name as reported by the ledger.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeTag::Tendermint => "@kyvejs/tendermint",
            RuntimeTag::TendermintBsync => "@kyvejs/tendermint-bsync",
        }
    }
}

impl FromStr for RuntimeTag {
    type Err = UnsupportedRuntime;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches("@kyvejs/") {
            "tendermint" => Ok(RuntimeTag::Tendermint),
            "tendermint-bsync" => Ok(RuntimeTag::TendermintBsync),
            _ => Err(UnsupportedRuntime(s.to_string())),
        }
    }
}

impl fmt::Display for RuntimeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a bundle's payload lives in the storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleLocation {
    /// Storage-provider specific identifier (e.g. an Arweave transaction id).
    pub storage_id: String,
    /// Which storage provider holds the payload.
    pub storage_provider_id: u32,
    /// How the payload is compressed (`0` none, `1` gzip).
    pub compression_id: u32,
    /// Hex SHA-256 of the stored (compressed) bytes.
    pub data_hash: String,
}

/// One bundle waiting for a collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleDescriptor {
    /// Owning pool.
    pub pool_id: PoolId,
    /// Ordinal of the bundle within the pool.
    pub bundle_id: BundleId,
    /// Leaf hashing scheme for the pool.
    pub runtime: RuntimeTag,
    /// Remote payload location.
    pub location: BundleLocation,
}

// =============================================================================
// RESULTS
// =============================================================================

/// Merkle root computed for one bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MerkleRootEntry {
    /// Owning pool.
    pub pool_id: PoolId,
    /// Ordinal of the bundle within the pool.
    pub bundle_id: BundleId,
    /// Root over the bundle's leaf hashes.
    pub root: Hash,
}

impl MerkleRootEntry {
    /// Create an entry.
    pub fn new(pool_id: PoolId, bundle_id: BundleId, root: Hash) -> Self {
        Self {
            pool_id,
            bundle_id,
            root,
        }
    }

    /// Root as lowercase hex, for logs.
    pub fn root_hex(&self) -> String {
        hex::encode(self.root)
    }
}
