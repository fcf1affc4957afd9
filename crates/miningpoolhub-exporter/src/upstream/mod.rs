//! Upstream APIs the collector reads from.
//!
//! The collector only sees the `BalanceSource` / `PriceSource` traits; the
//! HTTP implementations share one `reqwest::Client` carrying the request
//! timeout and user agent.

pub mod pool;
pub mod price;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use miningpoolhub_core::error::{Api, ExporterError, Result};
use miningpoolhub_core::{BalanceRecord, PriceTable};

use crate::config::UpstreamSection;

pub use pool::PoolClient;
pub use price::PriceClient;

/// Source of account balances (pool API).
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn fetch_balances(&self, api_key: &str) -> Result<Vec<BalanceRecord>>;
}

/// Source of fiat prices for a batch of symbols.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_prices(&self, fiat: &str, symbols: &[String]) -> Result<PriceTable>;
}

/// Shared HTTP client for both upstreams.
pub fn build_http_client(cfg: &UpstreamSection) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .user_agent(cfg.user_agent.clone())
        .build()
        .map_err(|e| ExporterError::Internal(format!("http client build failed: {e}")))
}

/// Make `base` usable with `Url::join` without dropping its last path segment.
fn as_base(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

fn map_reqwest(api: Api, e: reqwest::Error) -> ExporterError {
    if e.is_timeout() {
        ExporterError::Timeout { api }
    } else {
        // without_url: the pool URL carries the api key
        ExporterError::Upstream { api, msg: e.without_url().to_string() }
    }
}

/// GET `url`, require 200, return the whole body.
async fn get_body(client: &Client, api: Api, url: Url) -> Result<Vec<u8>> {
    let res = client.get(url).send().await.map_err(|e| map_reqwest(api, e))?;

    let status = res.status();
    if status != StatusCode::OK {
        return Err(ExporterError::Upstream { api, msg: status.to_string() });
    }

    let body = res.bytes().await.map_err(|e| map_reqwest(api, e))?;
    Ok(body.to_vec())
}
