//! # Domain Errors
//!
//! Failures reported by the ledger and storage collaborators.
//!
//! Only network-level failures and throttling / server errors are
//! transient; the pipeline may retry those and nothing else.

use shared_types::{BundleId, PoolId};
use thiserror::Error;

/// Bundle source error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Connection, timeout or body transfer failure.
    #[error("network error: {0}")]
    Network(String),

    /// Non-success HTTP status.
    #[error("HTTP {status} from {url}")]
    Http {
        /// Status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Response body did not have the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Pool does not exist on the ledger.
    #[error("pool {0} not found")]
    PoolNotFound(PoolId),

    /// No finalized bundle at this ordinal.
    #[error("bundle {bundle_id} of pool {pool_id} not found")]
    BundleNotFound {
        /// Pool queried
        pool_id: PoolId,
        /// Ordinal queried
        bundle_id: BundleId,
    },

    /// Downloaded bytes do not hash to the bundle's `data_hash`.
    #[error("data hash mismatch for {storage_id}: expected {expected}, got {actual}")]
    DataHashMismatch {
        /// Payload id
        storage_id: String,
        /// Hash recorded on the ledger
        expected: String,
        /// Hash of the downloaded bytes
        actual: String,
    },

    /// Unknown storage provider id.
    #[error("storage provider {0} not supported")]
    UnsupportedStorageProvider(u32),

    /// Unknown compression id.
    #[error("compression {0} not supported")]
    UnsupportedCompression(u32),

    /// Payload could not be decompressed.
    #[error("failed to decompress payload {storage_id}: {reason}")]
    Decompress {
        /// Payload id
        storage_id: String,
        /// Decoder message
        reason: String,
    },

    /// HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl SourceError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Network(_) => true,
            SourceError::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Whether this error means the configuration can never work.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SourceError::PoolNotFound(_)
                | SourceError::UnsupportedStorageProvider(_)
                | SourceError::UnsupportedCompression(_)
        )
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return SourceError::Http {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            };
        }
        if err.is_decode() {
            SourceError::Decode(err.to_string())
        } else {
            SourceError::Network(err.to_string())
        }
    }
}
