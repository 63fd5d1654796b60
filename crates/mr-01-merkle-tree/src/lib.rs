//! # MR-01 Merkle Tree
//!
//! Recomputes the Merkle root of one archived bundle.
//!
//! **Subsystem ID:** 01  
//! **Architecture:** Hexagonal (pure domain, no ports)
//!
//! ## Purpose
//!
//! A bundle is an ordered list of data items. Each item is reduced to a
//! 32-byte leaf hash by a runtime-specific scheme, and the leaves are
//! reduced pairwise to a single root:
//!
//! ```text
//!            root
//!          /      \
//!      H(a||b)   H(c||c)      <- odd level: last hash duplicated
//!      /    \     /
//!     a      b   c            <- leaf hashes (one per data item)
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! mr-01-merkle-tree/
//! ├── domain/          # DataItem, MerkleError
//! └── algorithms/      # build_root, leaf hashing per runtime
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod domain;

pub use algorithms::{
    build_root, build_root_in_place, bundle_root, bundle_to_hashes, hash_item, hash_pair,
    resolve_runtime, sha256,
};
pub use domain::{decode_bundle, DataItem, MerkleError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
