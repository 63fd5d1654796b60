//! # Payload Handling
//!
//! Integrity check and decompression of downloaded bundle bytes. Shared by
//! every fetcher so they all apply the same rules.

use std::io::Read;

use flate2::read::GzDecoder;
use sha2::{Digest, Sha256};
use shared_types::BundleLocation;

use super::entities::Compression;
use super::errors::SourceError;

/// Check the SHA-256 of the stored bytes against the ledger's `data_hash`.
///
/// An empty `data_hash` carries no claim and is accepted.
pub fn verify_data_hash(location: &BundleLocation, stored: &[u8]) -> Result<(), SourceError> {
    if location.data_hash.is_empty() {
        return Ok(());
    }
    let actual = hex::encode(Sha256::digest(stored));
    if !actual.eq_ignore_ascii_case(location.data_hash.trim()) {
        return Err(SourceError::DataHashMismatch {
            storage_id: location.storage_id.clone(),
            expected: location.data_hash.clone(),
            actual,
        });
    }
    Ok(())
}

/// Undo the bundle's compression.
pub fn decompress(location: &BundleLocation, stored: Vec<u8>) -> Result<Vec<u8>, SourceError> {
    match Compression::from_id(location.compression_id)? {
        Compression::None => Ok(stored),
        Compression::Gzip => {
            let mut out = Vec::with_capacity(stored.len() * 4);
            GzDecoder::new(stored.as_slice())
                .read_to_end(&mut out)
                .map_err(|e| SourceError::Decompress {
                    storage_id: location.storage_id.clone(),
                    reason: e.to_string(),
                })?;
            Ok(out)
        }
    }
}

/// Verify then decompress: the full path from stored bytes to JSON payload.
pub fn open_payload(location: &BundleLocation, stored: Vec<u8>) -> Result<Vec<u8>, SourceError> {
    verify_data_hash(location, &stored)?;
    decompress(location, stored)
}
