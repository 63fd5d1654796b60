//! Adapters layer: concrete ledger and storage backends.

pub mod kyve_rest;
pub mod memory;
pub mod storage;

pub use kyve_rest::{chain_rest_for, KyveRestClient};
pub use memory::InMemoryBundleSource;
pub use storage::StorageFetcher;
