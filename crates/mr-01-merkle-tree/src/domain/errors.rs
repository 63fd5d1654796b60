//! # Domain Errors
//!
//! Error types for Merkle root reconstruction.

use shared_types::UnsupportedRuntime;
use thiserror::Error;

/// Merkle tree error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleError {
    /// A root was requested over zero leaves.
    #[error("cannot build a Merkle root from zero leaves")]
    EmptyLeaves,

    /// No leaf hashing scheme exists for this runtime tag.
    #[error("runtime not supported: {0}")]
    UnsupportedRuntime(String),

    /// The bundle payload is not a JSON array of data items.
    #[error("malformed bundle payload: {0}")]
    MalformedBundle(String),

    /// A data item's value does not have the shape its runtime expects.
    #[error("malformed data item {key}: {reason}")]
    MalformedItem {
        /// Key of the offending item
        key: String,
        /// Parser message
        reason: String,
    },
}

impl MerkleError {
    /// Whether this error stems from configuration rather than data.
    pub fn is_configuration(&self) -> bool {
        matches!(self, MerkleError::UnsupportedRuntime(_))
    }
}

impl From<UnsupportedRuntime> for MerkleError {
    fn from(err: UnsupportedRuntime) -> Self {
        MerkleError::UnsupportedRuntime(err.0)
    }
}
