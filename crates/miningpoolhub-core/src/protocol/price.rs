//! Price API `data/price` payload and the conversion policy.
//!
//! The API is queried as `fsym=<fiat>&tsyms=<coins>`, so each entry reads
//! "coins per one unit of fiat". A balance is worth `amount / price` in fiat.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Api, ExporterError, Result};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PriceResponse {
    Error {
        #[serde(rename = "Response")]
        response: String,
        #[serde(rename = "Message", default)]
        message: String,
    },
    Prices(HashMap<String, f64>),
}

/// Symbol -> price for one scrape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    prices: HashMap<String, f64>,
}

impl PriceTable {
    pub fn new(prices: HashMap<String, f64>) -> Self {
        Self { prices }
    }

    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.prices.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Fiat value of `amount` coins of `symbol`.
    ///
    /// Returns `None` when the symbol is empty, missing, or its price is not a
    /// positive finite number; callers skip the converted sample in that case.
    pub fn convert(&self, symbol: &str, amount: f64) -> Option<f64> {
        if symbol.is_empty() {
            return None;
        }
        let price = self.get(symbol)?;
        if !price.is_finite() || price <= 0.0 {
            tracing::debug!(%symbol, price, "unusable price, skipping conversion");
            return None;
        }
        Some(amount / price)
    }
}

impl FromIterator<(String, f64)> for PriceTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self { prices: iter.into_iter().collect() }
    }
}

/// Decode a price response body.
///
/// An error envelope (`{"Response":"Error","Message":...}`) is an upstream
/// failure, not a decode failure.
pub fn decode_prices(body: &[u8]) -> Result<PriceTable> {
    let resp: PriceResponse = serde_json::from_slice(body).map_err(|e| ExporterError::Decode {
        api: Api::Price,
        msg: e.to_string(),
    })?;
    match resp {
        PriceResponse::Prices(prices) => Ok(PriceTable::new(prices)),
        PriceResponse::Error { response, message } => Err(ExporterError::Upstream {
            api: Api::Price,
            msg: format!("{response}: {message}"),
        }),
    }
}
