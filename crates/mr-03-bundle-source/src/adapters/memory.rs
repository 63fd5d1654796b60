//! # In-Memory Adapter
//!
//! A ledger and a storage backend in one struct, for tests and dry runs.
//!
//! Payloads are stored exactly as a real backend would hold them (optionally
//! gzip-compressed, with a `data_hash` over the stored bytes), and go through
//! the same verify/decompress path as downloaded ones.
//!
//! Failures can be injected per pool listing or per payload, a fixed number
//! of times, to exercise retry and shutdown paths.

use std::collections::HashMap;
use std::hash::Hash;
use std::io::Write;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use flate2::write::GzEncoder;
use sha2::{Digest, Sha256};
use shared_types::{BundleId, BundleLocation, PoolId};

use crate::domain::{
    open_payload, BundlePage, Compression, FinalizedBundle, PageCursor, PoolInfo, SourceError,
};
use crate::ports::{BundleFetcher, BundleSource};

/// Storage provider id reported for in-memory payloads.
const MEMORY_PROVIDER_ID: u32 = 3;

struct InjectedFailure {
    remaining: AtomicU32,
    error: SourceError,
}

impl InjectedFailure {
    fn new(times: u32, error: SourceError) -> Self {
        Self {
            remaining: AtomicU32::new(times),
            error,
        }
    }

    /// Consume one failure if any are left.
    fn trip(&self) -> Result<(), SourceError> {
        let tripped = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if tripped {
            Err(self.error.clone())
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
struct MemoryPool {
    runtime: String,
    bundles: Vec<FinalizedBundle>,
}

struct StoredPayload {
    bytes: Vec<u8>,
    delay: Duration,
}

/// In-memory `BundleSource` + `BundleFetcher`.
///
/// Build it up with the `&mut self` methods, then share it behind an `Arc`.
#[derive(Default)]
pub struct InMemoryBundleSource {
    pools: HashMap<PoolId, MemoryPool>,
    payloads: HashMap<String, StoredPayload>,
    pool_failures: HashMap<PoolId, InjectedFailure>,
    listing_failures: HashMap<PoolId, InjectedFailure>,
    fetch_failures: HashMap<String, InjectedFailure>,
    page_requests: AtomicUsize,
    fetch_requests: AtomicUsize,
}

impl InMemoryBundleSource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pool with the given runtime tag.
    pub fn add_pool(&mut self, pool_id: PoolId, runtime: &str) -> &mut Self {
        self.pools.entry(pool_id).or_default().runtime = runtime.to_string();
        self
    }

    /// Append a finalized bundle with the given JSON payload.
    ///
    /// Returns the ordinal assigned to it.
    pub fn add_bundle(
        &mut self,
        pool_id: PoolId,
        payload_json: &[u8],
        compression: Compression,
    ) -> BundleId {
        let stored = match compression {
            Compression::None => payload_json.to_vec(),
            Compression::Gzip => gzip(payload_json),
        };
        let compression_id = match compression {
            Compression::None => 0,
            Compression::Gzip => 1,
        };

        let pool = self.pools.entry(pool_id).or_default();
        let bundle_id = pool.bundles.len() as BundleId;
        let storage_id = memory_storage_id(pool_id, bundle_id);

        pool.bundles.push(FinalizedBundle {
            pool_id,
            id: bundle_id,
            storage_id: storage_id.clone(),
            storage_provider_id: MEMORY_PROVIDER_ID,
            compression_id,
            data_hash: hex::encode(Sha256::digest(&stored)),
            from_key: String::new(),
            to_key: String::new(),
        });
        self.payloads.insert(
            storage_id,
            StoredPayload {
                bytes: stored,
                delay: Duration::ZERO,
            },
        );
        bundle_id
    }

    /// Remove a bundle from the listing, leaving a gap in the ordinals.
    pub fn remove_from_listing(&mut self, pool_id: PoolId, bundle_id: BundleId) -> &mut Self {
        if let Some(pool) = self.pools.get_mut(&pool_id) {
            pool.bundles.retain(|b| b.id != bundle_id);
        }
        self
    }

    /// Delay the download of one payload.
    pub fn delay_fetch(
        &mut self,
        pool_id: PoolId,
        bundle_id: BundleId,
        delay: Duration,
    ) -> &mut Self {
        if let Some(payload) = self.payloads.get_mut(&memory_storage_id(pool_id, bundle_id)) {
            payload.delay = delay;
        }
        self
    }

    /// Flip a byte of a stored payload so its `data_hash` no longer matches.
    pub fn tamper_payload(&mut self, pool_id: PoolId, bundle_id: BundleId) -> &mut Self {
        if let Some(byte) = self
            .payloads
            .get_mut(&memory_storage_id(pool_id, bundle_id))
            .and_then(|p| p.bytes.first_mut())
        {
            *byte ^= 0xff;
        }
        self
    }

    /// Fail the next `times` pool lookups for `pool_id`.
    pub fn fail_pool_info(&mut self, pool_id: PoolId, times: u32, error: SourceError) -> &mut Self {
        self.pool_failures
            .insert(pool_id, InjectedFailure::new(times, error));
        self
    }

    /// Fail the next `times` listing pages of `pool_id`.
    pub fn fail_listing(&mut self, pool_id: PoolId, times: u32, error: SourceError) -> &mut Self {
        self.listing_failures
            .insert(pool_id, InjectedFailure::new(times, error));
        self
    }

    /// Fail the next `times` downloads of one payload.
    pub fn fail_fetch(
        &mut self,
        pool_id: PoolId,
        bundle_id: BundleId,
        times: u32,
        error: SourceError,
    ) -> &mut Self {
        self.fetch_failures
            .insert(memory_storage_id(pool_id, bundle_id), InjectedFailure::new(times, error));
        self
    }

    /// Number of listing pages served or failed so far.
    pub fn page_requests(&self) -> usize {
        self.page_requests.load(Ordering::SeqCst)
    }

    /// Number of payload downloads attempted so far.
    pub fn fetch_requests(&self) -> usize {
        self.fetch_requests.load(Ordering::SeqCst)
    }

    fn pool(&self, pool_id: PoolId) -> Result<&MemoryPool, SourceError> {
        self.pools
            .get(&pool_id)
            .ok_or(SourceError::PoolNotFound(pool_id))
    }
}

fn memory_storage_id(pool_id: PoolId, bundle_id: BundleId) -> String {
    format!("mem-{}-{}", pool_id, bundle_id)
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    // Writing into a Vec cannot fail.
    let _ = encoder.write_all(data);
    encoder.finish().unwrap_or_default()
}

fn trip<K: Hash + Eq>(failures: &HashMap<K, InjectedFailure>, key: &K) -> Result<(), SourceError> {
    failures.get(key).map_or(Ok(()), InjectedFailure::trip)
}

#[async_trait]
impl BundleSource for InMemoryBundleSource {
    async fn pool_info(&self, pool_id: PoolId) -> Result<PoolInfo, SourceError> {
        trip(&self.pool_failures, &pool_id)?;
        let pool = self.pool(pool_id)?;
        Ok(PoolInfo {
            id: pool_id,
            runtime: pool.runtime.clone(),
        })
    }

    async fn finalized_bundles_page(
        &self,
        pool_id: PoolId,
        limit: usize,
        cursor: PageCursor<'_>,
    ) -> Result<BundlePage, SourceError> {
        self.page_requests.fetch_add(1, Ordering::SeqCst);
        trip(&self.listing_failures, &pool_id)?;

        let pool = self.pool(pool_id)?;
        let start = match cursor {
            PageCursor::Offset(offset) => usize::try_from(offset).unwrap_or(usize::MAX),
            PageCursor::Key(key) => key
                .parse::<usize>()
                .map_err(|_| SourceError::Decode(format!("invalid pagination key {:?}", key)))?,
        };
        let start = start.min(pool.bundles.len());
        let end = start.saturating_add(limit.max(1)).min(pool.bundles.len());

        Ok(BundlePage {
            bundles: pool.bundles[start..end].to_vec(),
            next_key: (end < pool.bundles.len()).then(|| end.to_string()),
        })
    }

    async fn finalized_bundle(
        &self,
        pool_id: PoolId,
        bundle_id: BundleId,
    ) -> Result<FinalizedBundle, SourceError> {
        self.pool(pool_id)?
            .bundles
            .iter()
            .find(|b| b.id == bundle_id)
            .cloned()
            .ok_or(SourceError::BundleNotFound { pool_id, bundle_id })
    }
}

#[async_trait]
impl BundleFetcher for InMemoryBundleSource {
    async fn fetch_bundle(&self, location: &BundleLocation) -> Result<Vec<u8>, SourceError> {
        self.fetch_requests.fetch_add(1, Ordering::SeqCst);

        let payload = self
            .payloads
            .get(&location.storage_id)
            .ok_or_else(|| SourceError::Http {
                status: 404,
                url: format!("memory://{}", location.storage_id),
            })?;
        if !payload.delay.is_zero() {
            tokio::time::sleep(payload.delay).await;
        }
        trip(&self.fetch_failures, &location.storage_id)?;

        open_payload(location, payload.bytes.clone())
    }
}
