//! # Algorithms Module
//!
//! Root reduction and per-runtime leaf hashing.

pub mod leaf_hash;
pub mod merkle_tree;

pub use leaf_hash::{bundle_root, bundle_to_hashes, hash_item, resolve_runtime};
pub use merkle_tree::{build_root, build_root_in_place, hash_pair, sha256};
