//! # MR-03 Bundle Source
//!
//! The upstream collaborators of a run: the ledger that lists a pool's
//! finalized bundles, and the storage backend that serves their payloads.
//!
//! **Subsystem ID:** 03  
//! **Architecture:** Hexagonal (Ports & Adapters)
//!
//! ## Ports
//!
//! | Port | Used by | Adapters |
//! |------|---------|----------|
//! | [`BundleSource`] | Indexer, pool lookup | [`KyveRestClient`], [`InMemoryBundleSource`] |
//! | [`BundleFetcher`] | Collectors | [`StorageFetcher`], [`InMemoryBundleSource`] |
//!
//! ## Payload Path
//!
//! ```text
//! stored bytes ──► SHA-256 == data_hash? ──► decompress (compression_id) ──► JSON items
//! ```
//!
//! Every fetcher runs downloaded bytes through [`open_payload`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::{chain_rest_for, InMemoryBundleSource, KyveRestClient, StorageFetcher};
pub use domain::{
    decompress, open_payload, verify_data_hash, BundlePage, Compression, FinalizedBundle,
    PageCursor, PoolInfo, SourceError, StorageProvider,
};
pub use ports::{BundleFetcher, BundleSource};
