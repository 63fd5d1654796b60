//! # Outbound Ports
//!
//! Traits for the two external systems a run depends on: the ledger that
//! lists finalized bundles, and the storage that serves their payloads.

use async_trait::async_trait;
use shared_types::{BundleId, BundleLocation, PoolId};

use crate::domain::{BundlePage, FinalizedBundle, PageCursor, PoolInfo, SourceError};

/// Ledger query API - outbound port.
#[async_trait]
pub trait BundleSource: Send + Sync {
    /// Look up a pool's metadata (runtime tag).
    async fn pool_info(&self, pool_id: PoolId) -> Result<PoolInfo, SourceError>;

    /// One page of the pool's finalized bundles in ascending ordinal order.
    ///
    /// The first page of a walk is requested by offset, later ones by the
    /// key the previous page returned.
    async fn finalized_bundles_page(
        &self,
        pool_id: PoolId,
        limit: usize,
        cursor: PageCursor<'_>,
    ) -> Result<BundlePage, SourceError>;

    /// The finalized bundle at a given ordinal.
    async fn finalized_bundle(
        &self,
        pool_id: PoolId,
        bundle_id: BundleId,
    ) -> Result<FinalizedBundle, SourceError>;
}

/// Payload storage - outbound port.
#[async_trait]
pub trait BundleFetcher: Send + Sync {
    /// Download, verify and decompress a bundle payload.
    ///
    /// Returns the JSON array of data items as bytes.
    async fn fetch_bundle(&self, location: &BundleLocation) -> Result<Vec<u8>, SourceError>;
}
