use async_trait::async_trait;
use reqwest::{Client, Url};

use miningpoolhub_core::error::{Api, ExporterError, Result};
use miningpoolhub_core::protocol::pool::decode_balances;
use miningpoolhub_core::BalanceRecord;

use super::{as_base, get_body, BalanceSource};

/// MiningPoolHub `getuserallbalances` client.
#[derive(Clone)]
pub struct PoolClient {
    client: Client,
    base: Url,
}

impl PoolClient {
    pub fn new(client: Client, base: Url) -> Self {
        Self { client, base: as_base(base) }
    }

    /// `{base}/index.php?page=api&action=getuserallbalances&api_key=<key>`
    pub fn balances_url(&self, api_key: &str) -> Result<Url> {
        let mut url = self
            .base
            .join("index.php")
            .map_err(|e| ExporterError::Internal(format!("pool url: {e}")))?;
        url.query_pairs_mut()
            .append_pair("page", "api")
            .append_pair("action", "getuserallbalances")
            .append_pair("api_key", api_key);
        Ok(url)
    }
}

#[async_trait]
impl BalanceSource for PoolClient {
    async fn fetch_balances(&self, api_key: &str) -> Result<Vec<BalanceRecord>> {
        let url = self.balances_url(api_key)?;
        let body = get_body(&self.client, Api::Pool, url).await?;
        let records = decode_balances(&body)?;
        tracing::debug!(records = records.len(), "pool balances fetched");
        Ok(records)
    }
}
