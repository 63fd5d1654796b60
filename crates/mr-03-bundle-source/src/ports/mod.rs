//! Ports layer: outbound traits implemented by the adapters.

pub mod outbound;

pub use outbound::{BundleFetcher, BundleSource};
