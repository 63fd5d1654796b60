//! # Leaf Hash Strategy
//!
//! Maps one data item to its 32-byte leaf hash, per runtime.
//!
//! | Runtime | Leaf |
//! |---------|------|
//! | tendermint | `SHA256(SHA256(key) \|\| root[SHA256(block), SHA256(block_results)])` |
//! | tendermint-bsync | `SHA256({"key":<key>,"value":<raw value>})` |

use std::collections::HashMap;

use serde_json::value::RawValue;
use shared_types::{Hash, RuntimeTag};

use super::merkle_tree::{build_root, build_root_in_place, hash_pair, sha256};
use crate::domain::{DataItem, MerkleError};

/// Resolve a runtime tag as reported by the ledger.
///
/// Unknown tags are a configuration error for the whole pool.
pub fn resolve_runtime(tag: &str) -> Result<RuntimeTag, MerkleError> {
    tag.parse::<RuntimeTag>().map_err(MerkleError::from)
}

/// Compute the leaf hash of one data item.
pub fn hash_item(item: &DataItem, runtime: RuntimeTag) -> Result<Hash, MerkleError> {
    match runtime {
        RuntimeTag::Tendermint => tendermint_leaf(item),
        RuntimeTag::TendermintBsync => bsync_leaf(item),
    }
}

/// Compute the leaf hashes of every item, in bundle order.
pub fn bundle_to_hashes(items: &[DataItem], runtime: RuntimeTag) -> Result<Vec<Hash>, MerkleError> {
    items.iter().map(|item| hash_item(item, runtime)).collect()
}

/// Compute the Merkle root of a whole bundle.
pub fn bundle_root(items: &[DataItem], runtime: RuntimeTag) -> Result<Hash, MerkleError> {
    build_root_in_place(bundle_to_hashes(items, runtime)?)
}

fn tendermint_leaf(item: &DataItem) -> Result<Hash, MerkleError> {
    // A `null` value carries no fields.
    let fields: HashMap<String, &RawValue> =
        serde_json::from_str::<Option<_>>(item.value_json())
            .map_err(|e| MerkleError::MalformedItem {
                key: item.key.clone(),
                reason: e.to_string(),
            })?
            .unwrap_or_default();

    let value_root = build_root(&[
        sha256(field_bytes(&fields, "block")),
        sha256(field_bytes(&fields, "block_results")),
    ])?;
    Ok(hash_pair(&sha256(item.key.as_bytes()), &value_root))
}

// Absent fields hash as empty payloads.
fn field_bytes<'a>(fields: &HashMap<String, &'a RawValue>, name: &str) -> &'a [u8] {
    fields.get(name).map_or(&[][..], |v| v.get().as_bytes())
}

fn bsync_leaf(item: &DataItem) -> Result<Hash, MerkleError> {
    let key = serde_json::to_string(&item.key).map_err(|e| MerkleError::MalformedItem {
        key: item.key.clone(),
        reason: e.to_string(),
    })?;
    let canonical = format!("{{\"key\":{},\"value\":{}}}", key, item.value_json());
    Ok(sha256(canonical.as_bytes()))
}
