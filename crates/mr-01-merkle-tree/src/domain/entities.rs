//! # Domain Entities
//!
//! Data items exactly as they were archived.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use super::errors::MerkleError;

/// One data item of a bundle.
///
/// The value is kept as raw JSON so that hashing sees the archived bytes,
/// not a re-serialised copy with different whitespace or key order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataItem {
    /// Opaque item key (for Tendermint runtimes, the block height).
    pub key: String,
    /// Opaque item value, interpreted only by the leaf hashing scheme.
    pub value: Box<RawValue>,
}

impl DataItem {
    /// Build an item from a key and a JSON value literal.
    pub fn new(key: impl Into<String>, value_json: &str) -> Result<Self, MerkleError> {
        let key = key.into();
        let value = RawValue::from_string(value_json.to_string()).map_err(|e| {
            MerkleError::MalformedItem {
                key: key.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self { key, value })
    }

    /// Raw JSON text of the value.
    pub fn value_json(&self) -> &str {
        self.value.get()
    }
}

/// Decode a decompressed bundle payload into its ordered data items.
pub fn decode_bundle(payload: &[u8]) -> Result<Vec<DataItem>, MerkleError> {
    serde_json::from_slice(payload).map_err(|e| MerkleError::MalformedBundle(e.to_string()))
}
