//! # Ledger REST Adapter
//!
//! `BundleSource` over the KYVE chain's REST (LCD) API.
//!
//! | Query | Endpoint |
//! |-------|----------|
//! | pool | `GET /kyve/query/v1beta1/pool/{id}` |
//! | finalized bundles | `GET /kyve/v1/bundles/{pool}?pagination.limit=&pagination.offset=` then `&pagination.key=` |
//! | single bundle | `GET /kyve/v1/bundles/{pool}?pagination.limit=1&pagination.offset={id}` |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shared_types::{BundleId, PoolId};
use tracing::debug;

use crate::domain::{BundlePage, FinalizedBundle, PageCursor, PoolInfo, SourceError};
use crate::ports::BundleSource;

/// Well-known REST endpoints per chain id.
const CHAIN_ENDPOINTS: &[(&str, &str)] = &[
    ("kyve-1", "https://api.kyve.network"),
    ("kaon-1", "https://api.kaon.kyve.network"),
    ("korellia-2", "https://api.korellia.kyve.network"),
];

/// REST endpoint of a known chain.
pub fn chain_rest_for(chain_id: &str) -> Option<&'static str> {
    CHAIN_ENDPOINTS
        .iter()
        .find(|(id, _)| *id == chain_id)
        .map(|(_, url)| *url)
}

#[derive(Deserialize)]
struct PoolResponse {
    pool: PoolEnvelope,
}

#[derive(Deserialize)]
struct PoolEnvelope {
    id: String,
    data: PoolData,
}

#[derive(Deserialize)]
struct PoolData {
    runtime: String,
}

#[derive(Deserialize)]
struct BundlesResponse {
    #[serde(default)]
    finalized_bundles: Vec<FinalizedBundle>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Deserialize)]
struct Pagination {
    #[serde(default)]
    next_key: Option<String>,
}

/// Ledger REST client.
#[derive(Debug, Clone)]
pub struct KyveRestClient {
    client: Client,
    base_url: String,
}

impl KyveRestClient {
    /// Create a client for `base_url` (trailing `/` ignored).
    pub fn new(base_url: impl Into<String>) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| SourceError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<R, SourceError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, ?query, "Ledger request");

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| SourceError::Decode(format!("{}: {}", url, e)))
    }

    fn bundles_path(pool_id: PoolId) -> String {
        format!("/kyve/v1/bundles/{}", pool_id)
    }
}

#[async_trait]
impl BundleSource for KyveRestClient {
    async fn pool_info(&self, pool_id: PoolId) -> Result<PoolInfo, SourceError> {
        let path = format!("/kyve/query/v1beta1/pool/{}", pool_id);
        let response: PoolResponse = match self.get(&path, &[]).await {
            Err(SourceError::Http { status: 404, .. }) => {
                return Err(SourceError::PoolNotFound(pool_id))
            }
            other => other?,
        };

        let id = response
            .pool
            .id
            .parse()
            .map_err(|_| SourceError::Decode(format!("invalid pool id {:?}", response.pool.id)))?;
        Ok(PoolInfo {
            id,
            runtime: response.pool.data.runtime,
        })
    }

    async fn finalized_bundles_page(
        &self,
        pool_id: PoolId,
        limit: usize,
        cursor: PageCursor<'_>,
    ) -> Result<BundlePage, SourceError> {
        let mut query = vec![("pagination.limit", limit.to_string())];
        match cursor {
            PageCursor::Offset(0) => {}
            PageCursor::Offset(offset) => query.push(("pagination.offset", offset.to_string())),
            PageCursor::Key(key) => query.push(("pagination.key", key.to_string())),
        }

        let response: BundlesResponse = self.get(&Self::bundles_path(pool_id), &query).await?;
        let next_key = response
            .pagination
            .and_then(|p| p.next_key)
            .filter(|k| !k.is_empty());

        Ok(BundlePage {
            bundles: response.finalized_bundles,
            next_key,
        })
    }

    async fn finalized_bundle(
        &self,
        pool_id: PoolId,
        bundle_id: BundleId,
    ) -> Result<FinalizedBundle, SourceError> {
        let query = [
            ("pagination.limit", "1".to_string()),
            ("pagination.offset", bundle_id.to_string()),
        ];
        let response: BundlesResponse = self.get(&Self::bundles_path(pool_id), &query).await?;

        response
            .finalized_bundles
            .into_iter()
            .find(|b| b.id == bundle_id)
            .ok_or(SourceError::BundleNotFound { pool_id, bundle_id })
    }
}
