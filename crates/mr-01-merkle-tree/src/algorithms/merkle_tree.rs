//! # Merkle Tree Builder
//!
//! Reduces an ordered sequence of hashes to a single root.
//!
//! # Algorithm
//!
//! 1. If the current level has one hash, it is the root
//! 2. If the level has odd length, duplicate the last hash
//! 3. Replace each pair `(h[2i], h[2i+1])` with `SHA256(h[2i] || h[2i+1])`
//! 4. Repeat on the shorter level

use sha2::{Digest, Sha256};
use shared_types::Hash;

use crate::domain::MerkleError;

/// SHA-256 of a byte slice.
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// Hash two nodes together.
pub fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Build the Merkle root of `leaves`.
///
/// Returns [`MerkleError::EmptyLeaves`] for an empty slice. A single leaf is
/// its own root; odd-length padding only applies from two hashes upward.
///
/// # Time Complexity: O(n)
/// # Space Complexity: O(n), one copy of the leaves
pub fn build_root(leaves: &[Hash]) -> Result<Hash, MerkleError> {
    build_root_in_place(leaves.to_vec())
}

/// Build the Merkle root, reusing the leaf buffer for every level.
///
/// Each pass writes the parents into the front of the buffer and truncates
/// it, so stack use stays constant regardless of the leaf count.
pub fn build_root_in_place(mut level: Vec<Hash>) -> Result<Hash, MerkleError> {
    if level.is_empty() {
        return Err(MerkleError::EmptyLeaves);
    }

    while level.len() > 1 {
        if level.len() % 2 == 1 {
            let last = level[level.len() - 1];
            level.push(last);
        }

        let parents = level.len() / 2;
        for i in 0..parents {
            level[i] = hash_pair(&level[2 * i], &level[2 * i + 1]);
        }
        level.truncate(parents);
    }

    Ok(level[0])
}
