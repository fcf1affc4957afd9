//! Command-line flags. Every flag is optional and overrides the config file.

use std::path::PathBuf;

use clap::Parser;

use super::schema::ExporterConfig;

#[derive(Parser, Debug, Default)]
#[command(name = "miningpoolhub-exporter")]
#[command(about = "Prometheus exporter for MiningPoolHub balances", version)]
pub struct Args {
    /// Address to listen on for web interface and telemetry
    #[arg(long = "web.listen-address")]
    pub listen_address: Option<String>,

    /// Path under which to expose metrics
    #[arg(long = "web.telemetry-path")]
    pub telemetry_path: Option<String>,

    /// Base URL of the MiningPoolHub API
    #[arg(long = "url")]
    pub pool_url: Option<String>,

    /// Base URL of the price API
    #[arg(long = "price-url")]
    pub price_url: Option<String>,

    /// Timeout for each upstream request, in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Fiat currency used when a scrape does not name one
    #[arg(long)]
    pub default_fiat: Option<String>,

    /// Optional YAML config file
    #[arg(short, long, env = "MININGPOOLHUB_EXPORTER_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Layer flags that were given on top of `cfg`.
    pub fn apply(&self, cfg: &mut ExporterConfig) {
        if let Some(v) = &self.listen_address {
            cfg.web.listen_address = v.clone();
        }
        if let Some(v) = &self.telemetry_path {
            cfg.web.telemetry_path = v.clone();
        }
        if let Some(v) = &self.pool_url {
            cfg.upstream.pool_url = v.clone();
        }
        if let Some(v) = &self.price_url {
            cfg.upstream.price_url = v.clone();
        }
        if let Some(v) = self.timeout_secs {
            cfg.upstream.timeout_secs = v;
        }
        if let Some(v) = &self.default_fiat {
            cfg.scrape.default_fiat = v.clone();
        }
    }
}
