//! # Storage Adapter
//!
//! `BundleFetcher` that downloads payloads over HTTP.
//!
//! With a storage endpoint configured every payload is fetched from
//! `{storage_rest}/{storage_id}`; otherwise the provider's public gateway
//! is used.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared_types::BundleLocation;
use tracing::debug;

use crate::domain::{open_payload, SourceError, StorageProvider};
use crate::ports::BundleFetcher;

/// HTTP payload fetcher.
#[derive(Debug, Clone)]
pub struct StorageFetcher {
    client: Client,
    storage_rest: Option<String>,
}

impl StorageFetcher {
    /// Create a fetcher. An empty `storage_rest` selects provider gateways.
    pub fn new(storage_rest: &str) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SourceError::Client(e.to_string()))?;

        let storage_rest = storage_rest.trim().trim_end_matches('/');
        Ok(Self {
            client,
            storage_rest: (!storage_rest.is_empty()).then(|| storage_rest.to_string()),
        })
    }

    /// Download URL for a payload.
    pub fn url_for(&self, location: &BundleLocation) -> Result<String, SourceError> {
        let base = match &self.storage_rest {
            Some(base) => base.as_str(),
            None => StorageProvider::from_id(location.storage_provider_id)?.gateway(),
        };
        Ok(format!("{}/{}", base, location.storage_id))
    }
}

#[async_trait]
impl BundleFetcher for StorageFetcher {
    async fn fetch_bundle(&self, location: &BundleLocation) -> Result<Vec<u8>, SourceError> {
        let url = self.url_for(location)?;
        debug!(%url, "Downloading bundle payload");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                url,
            });
        }
        let stored = response.bytes().await?.to_vec();

        // Decompression is CPU bound; keep it off the async workers.
        let location = location.clone();
        tokio::task::spawn_blocking(move || open_payload(&location, stored))
            .await
            .map_err(|e| SourceError::Decompress {
                storage_id: String::new(),
                reason: e.to_string(),
            })?
    }
}
