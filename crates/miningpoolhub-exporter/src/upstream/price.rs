use async_trait::async_trait;
use reqwest::{Client, Url};

use miningpoolhub_core::error::{Api, ExporterError, Result};
use miningpoolhub_core::protocol::price::decode_prices;
use miningpoolhub_core::PriceTable;

use super::{as_base, get_body, PriceSource};

/// CryptoCompare-style `data/price` client (one batched request per scrape).
#[derive(Clone)]
pub struct PriceClient {
    client: Client,
    base: Url,
}

impl PriceClient {
    pub fn new(client: Client, base: Url) -> Self {
        Self { client, base: as_base(base) }
    }

    /// `{base}/data/price?fsym=<fiat>&tsyms=<a,b,c>`
    pub fn price_url(&self, fiat: &str, symbols: &[String]) -> Result<Url> {
        let mut url = self
            .base
            .join("data/price")
            .map_err(|e| ExporterError::Internal(format!("price url: {e}")))?;
        url.query_pairs_mut()
            .append_pair("fsym", fiat)
            .append_pair("tsyms", &symbols.join(","));
        Ok(url)
    }
}

#[async_trait]
impl PriceSource for PriceClient {
    async fn fetch_prices(&self, fiat: &str, symbols: &[String]) -> Result<PriceTable> {
        let url = self.price_url(fiat, symbols)?;
        let body = get_body(&self.client, Api::Price, url).await?;
        let prices = decode_prices(&body)?;
        if prices.is_empty() {
            tracing::warn!(%fiat, requested = symbols.len(), "price api returned no prices");
        }
        tracing::debug!(%fiat, requested = symbols.len(), returned = prices.len(), "prices fetched");
        Ok(prices)
    }
}
