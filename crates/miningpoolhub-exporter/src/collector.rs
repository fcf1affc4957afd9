//! Balance collector: one linear pipeline per scrape.
//!
//! fetch balances -> derive symbols -> fetch prices -> emit gauges.
//!
//! Either fetch failing aborts the whole scrape; the caller gets the error
//! and no partial registry.

use serde::Deserialize;

use miningpoolhub_core::error::{ExporterError, Result};
use miningpoolhub_core::{BalanceRecord, PriceTable, SymbolTable};

use crate::obs::{GaugeVec, Registry};
use crate::upstream::{BalanceSource, PriceSource};

pub const NAMESPACE: &str = "miningpoolhub";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const BALANCE_LABELS: &[&str] = &["coin", "symbol", "wallet", "status"];

/// Raw `/metrics` query string.
#[derive(Debug, Default, Deserialize)]
pub struct ScrapeQuery {
    pub apikey: Option<String>,
    pub fiat: Option<String>,
    /// Older name for `fiat`.
    pub conversion: Option<String>,
}

/// Validated scrape parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeRequest {
    pub api_key: String,
    pub fiat: String,
}

impl ScrapeRequest {
    pub fn from_query(q: ScrapeQuery, default_fiat: &str) -> Result<Self> {
        let api_key = q
            .apikey
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ExporterError::BadRequest("apikey must be provided".into()))?;

        let fiat = q
            .fiat
            .filter(|f| !f.trim().is_empty())
            .or(q.conversion.filter(|f| !f.trim().is_empty()))
            .unwrap_or_else(|| default_fiat.to_string());

        Ok(Self { api_key, fiat: normalize_fiat(&fiat)? })
    }
}

/// Upper-case a fiat code and check it looks like one (2-10 ASCII alphanumerics).
pub fn normalize_fiat(raw: &str) -> Result<String> {
    let code = raw.trim().to_ascii_uppercase();
    let ok = (2..=10).contains(&code.len()) && code.chars().all(|c| c.is_ascii_alphanumeric());
    if !ok {
        return Err(ExporterError::BadRequest(format!("invalid fiat currency: {raw:?}")));
    }
    Ok(code)
}

/// Per-request collector over shared, read-only sources.
pub struct BalanceCollector<'a> {
    symbols: &'a SymbolTable,
    balances: &'a dyn BalanceSource,
    prices: &'a dyn PriceSource,
}

impl<'a> BalanceCollector<'a> {
    pub fn new(symbols: &'a SymbolTable, balances: &'a dyn BalanceSource, prices: &'a dyn PriceSource) -> Self {
        Self { symbols, balances, prices }
    }

    pub async fn collect(&self, req: &ScrapeRequest) -> Result<Registry> {
        let records = self.balances.fetch_balances(&req.api_key).await?;

        let symbols = self.symbols.derive_symbols(&records);
        let prices = if symbols.is_empty() {
            tracing::debug!("no known coins, skipping price lookup");
            PriceTable::default()
        } else {
            self.prices.fetch_prices(&req.fiat, &symbols).await?
        };

        Ok(emit(self.symbols, &records, &prices))
    }
}

/// Build the gauges for one scrape.
///
/// Raw balances are always emitted. Converted balances are skipped when the
/// coin has no symbol or the price table has no usable price for it.
pub fn emit(symbols: &SymbolTable, records: &[BalanceRecord], prices: &PriceTable) -> Registry {
    let mut info = GaugeVec::new(format!("{NAMESPACE}_info"), "Info about this exporter", &[])
        .const_label("version", VERSION);
    let mut balance = GaugeVec::new(
        format!("{NAMESPACE}_balance"),
        "Balances by coin, wallet and confirmation status",
        BALANCE_LABELS,
    );
    let mut converted = GaugeVec::new(
        format!("{NAMESPACE}_balance_converted"),
        "Balances by coin, wallet and confirmation status, converted to fiat",
        BALANCE_LABELS,
    );

    info.set(&[], 1.0);

    for rec in records {
        let symbol = symbols.symbol_or_empty(&rec.coin);
        let mut skipped = 0;

        for (wallet, status, amount) in rec.amounts() {
            let labels = [rec.coin.as_str(), symbol, wallet.as_str(), status.as_str()];
            balance.set(&labels, amount);
            match prices.convert(symbol, amount) {
                Some(v) => converted.set(&labels, v),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::debug!(coin = %rec.coin, %symbol, skipped, "no usable price, converted balances skipped");
        }
    }

    let mut reg = Registry::new();
    reg.register(info);
    reg.register(balance);
    reg.register(converted);
    reg
}
