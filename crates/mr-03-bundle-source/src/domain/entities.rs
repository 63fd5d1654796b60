//! # Domain Entities
//!
//! Ledger records as served by the REST API, and the mapping from
//! provider / compression ids to behaviour.
//!
//! The ledger encodes every integer as a JSON string; `serde_with`'s
//! `DisplayFromStr` parses them on the way in.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use shared_types::{BundleId, BundleLocation, PoolId};

use super::errors::SourceError;

/// A pool as described by the ledger.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolInfo {
    /// Pool id.
    #[serde_as(as = "DisplayFromStr")]
    pub id: PoolId,
    /// Runtime tag, e.g. `@kyvejs/tendermint`.
    pub runtime: String,
}

/// One finalized bundle record.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedBundle {
    /// Owning pool.
    #[serde_as(as = "DisplayFromStr")]
    pub pool_id: PoolId,
    /// Bundle ordinal.
    #[serde_as(as = "DisplayFromStr")]
    pub id: BundleId,
    /// Storage-provider specific payload id.
    pub storage_id: String,
    /// Storage provider holding the payload.
    #[serde_as(as = "DisplayFromStr")]
    pub storage_provider_id: u32,
    /// Payload compression.
    #[serde_as(as = "DisplayFromStr")]
    pub compression_id: u32,
    /// Hex SHA-256 of the stored bytes.
    #[serde(default)]
    pub data_hash: String,
    /// First data item key.
    #[serde(default)]
    pub from_key: String,
    /// Last data item key.
    #[serde(default)]
    pub to_key: String,
}

impl FinalizedBundle {
    /// Where the payload of this bundle can be downloaded.
    pub fn location(&self) -> BundleLocation {
        BundleLocation {
            storage_id: self.storage_id.clone(),
            storage_provider_id: self.storage_provider_id,
            compression_id: self.compression_id,
            data_hash: self.data_hash.clone(),
        }
    }
}

/// One page of a finalized-bundle listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundlePage {
    /// Bundles in ascending ordinal order.
    pub bundles: Vec<FinalizedBundle>,
    /// Opaque cursor for the next page, `None` when the listing is exhausted.
    pub next_key: Option<String>,
}

/// Where a listing page starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCursor<'a> {
    /// Position in the listing. Finalized ordinals are dense, so position
    /// `n` holds ordinal `n`.
    Offset(u64),
    /// Continuation key returned with the previous page.
    Key(&'a str),
}

/// Storage backends a payload may live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageProvider {
    /// Arweave (id 1).
    Arweave,
    /// Bundlr, served through the Arweave gateway (id 2).
    Bundlr,
    /// KYVE storage provider (id 3).
    KyveStorage,
}

impl StorageProvider {
    /// Map a ledger provider id.
    pub fn from_id(id: u32) -> Result<Self, SourceError> {
        match id {
            1 => Ok(StorageProvider::Arweave),
            2 => Ok(StorageProvider::Bundlr),
            3 => Ok(StorageProvider::KyveStorage),
            other => Err(SourceError::UnsupportedStorageProvider(other)),
        }
    }

    /// Public gateway used when no storage endpoint is configured.
    pub fn gateway(&self) -> &'static str {
        match self {
            StorageProvider::Arweave | StorageProvider::Bundlr => "https://arweave.net",
            StorageProvider::KyveStorage => "https://storage.kyve.network",
        }
    }
}

/// Payload compression schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Stored as-is (id 0).
    None,
    /// Gzip (id 1).
    Gzip,
}

impl Compression {
    /// Map a ledger compression id.
    pub fn from_id(id: u32) -> Result<Self, SourceError> {
        match id {
            0 => Ok(Compression::None),
            1 => Ok(Compression::Gzip),
            other => Err(SourceError::UnsupportedCompression(other)),
        }
    }
}
