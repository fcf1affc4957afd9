//! Shared application state for the exporter.
//!
//! Everything in here is read-only after startup: config, symbol table and
//! the upstream sources. Scrapes build their own registries and never write
//! back into the state.

use std::sync::Arc;

use miningpoolhub_core::error::Result;
use miningpoolhub_core::SymbolTable;

use crate::collector::BalanceCollector;
use crate::config::schema::parse_base_url;
use crate::config::ExporterConfig;
use crate::upstream::{self, BalanceSource, PoolClient, PriceClient, PriceSource};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ExporterConfig,
    symbols: SymbolTable,
    balances: Arc<dyn BalanceSource>,
    prices: Arc<dyn PriceSource>,
}

impl AppState {
    /// Build application state with the HTTP upstream clients.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: ExporterConfig) -> Result<Self> {
        let http = upstream::build_http_client(&cfg.upstream)?;
        let pool_url = parse_base_url("upstream.pool_url", &cfg.upstream.pool_url)?;
        let price_url = parse_base_url("upstream.price_url", &cfg.upstream.price_url)?;

        let balances = Arc::new(PoolClient::new(http.clone(), pool_url));
        let prices = Arc::new(PriceClient::new(http, price_url));

        Ok(Self::with_sources(cfg, balances, prices))
    }

    /// Build application state around arbitrary sources.
    pub fn with_sources(
        cfg: ExporterConfig,
        balances: Arc<dyn BalanceSource>,
        prices: Arc<dyn PriceSource>,
    ) -> Self {
        let symbols = SymbolTable::with_overrides(&cfg.symbols);
        if !cfg.symbols.is_empty() {
            tracing::info!(overrides = cfg.symbols.len(), total = symbols.len(), "symbol table loaded");
        }

        Self {
            inner: Arc::new(AppStateInner { cfg, symbols, balances, prices }),
        }
    }

    pub fn cfg(&self) -> &ExporterConfig {
        &self.inner.cfg
    }

    /// Fresh collector for one scrape.
    pub fn collector(&self) -> BalanceCollector<'_> {
        BalanceCollector::new(
            &self.inner.symbols,
            self.inner.balances.as_ref(),
            self.inner.prices.as_ref(),
        )
    }
}
