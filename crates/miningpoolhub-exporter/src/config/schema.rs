use std::collections::BTreeMap;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use reqwest::Url;
use serde::Deserialize;
use miningpoolhub_core::error::{ExporterError, Result};

use crate::collector::normalize_fiat;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub version: u32,

    #[serde(default)]
    pub web: WebSection,

    #[serde(default)]
    pub upstream: UpstreamSection,

    #[serde(default)]
    pub scrape: ScrapeSection,

    /// Extra or replacement coin -> symbol entries.
    #[serde(default)]
    pub symbols: BTreeMap<String, String>,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            version: 1,
            web: WebSection::default(),
            upstream: UpstreamSection::default(),
            scrape: ScrapeSection::default(),
            symbols: BTreeMap::new(),
        }
    }
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ExporterError::Config(format!("unsupported config version: {}", self.version)));
        }

        self.web.validate()?;
        self.upstream.validate()?;
        self.scrape.validate()?;

        for (coin, sym) in &self.symbols {
            if coin.trim().is_empty() || sym.trim().is_empty() {
                return Err(ExporterError::Config(format!(
                    "symbols entry must have non-empty coin and symbol (coin={coin:?})"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebSection {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    #[serde(default = "default_telemetry_path")]
    pub telemetry_path: String,
}

impl Default for WebSection {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            telemetry_path: default_telemetry_path(),
        }
    }
}

impl WebSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addrs()?;
        if !self.telemetry_path.starts_with('/') {
            return Err(ExporterError::Config("web.telemetry_path must start with '/'".into()));
        }
        // The path is mounted as a literal route, so router syntax is not allowed.
        if let Some(c) = self
            .telemetry_path
            .chars()
            .find(|c| matches!(c, ':' | '*' | '{' | '}' | '?' | '#') || c.is_whitespace())
        {
            return Err(ExporterError::Config(format!(
                "web.telemetry_path {:?} contains {c:?}",
                self.telemetry_path
            )));
        }
        if matches!(self.telemetry_path.as_str(), "/" | "/healthz") {
            return Err(ExporterError::Config(format!(
                "web.telemetry_path {} collides with a built-in route",
                self.telemetry_path
            )));
        }
        Ok(())
    }

    /// Addresses to try binding, in order.
    ///
    /// `:9401` means all interfaces: the IPv6 wildcard first (dual-stack on
    /// most hosts), then the IPv4 wildcard for hosts without IPv6.
    pub fn listen_addrs(&self) -> Result<Vec<SocketAddr>> {
        let s = self.listen_address.trim();
        let bad = |e: std::net::AddrParseError| {
            ExporterError::Config(format!("web.listen_address {s:?} is not a valid address: {e}"))
        };
        match s.strip_prefix(':') {
            Some(port) => {
                let port: u16 = port.parse().map_err(|e| {
                    ExporterError::Config(format!("web.listen_address {s:?} has a bad port: {e}"))
                })?;
                Ok(vec![
                    SocketAddr::from((Ipv6Addr::UNSPECIFIED, port)),
                    SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
                ])
            }
            None => Ok(vec![s.parse().map_err(bad)?]),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamSection {
    #[serde(default = "default_pool_url")]
    pub pool_url: String,

    #[serde(default = "default_price_url")]
    pub price_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for UpstreamSection {
    fn default() -> Self {
        Self {
            pool_url: default_pool_url(),
            price_url: default_price_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl UpstreamSection {
    pub fn validate(&self) -> Result<()> {
        parse_base_url("upstream.pool_url", &self.pool_url)?;
        parse_base_url("upstream.price_url", &self.price_url)?;
        if !(1..=120).contains(&self.timeout_secs) {
            return Err(ExporterError::Config(
                "upstream.timeout_secs must be between 1 and 120".into(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ExporterError::Config("upstream.user_agent must not be empty".into()));
        }
        Ok(())
    }
}

/// Parse an http(s) base URL.
pub fn parse_base_url(field: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| ExporterError::Config(format!("{field} {raw:?} is not a valid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ExporterError::Config(format!("{field} must use http or https")));
    }
    Ok(url)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScrapeSection {
    #[serde(default = "default_fiat")]
    pub default_fiat: String,
}

impl Default for ScrapeSection {
    fn default() -> Self {
        Self { default_fiat: default_fiat() }
    }
}

impl ScrapeSection {
    pub fn validate(&self) -> Result<()> {
        normalize_fiat(&self.default_fiat)
            .map_err(|e| ExporterError::Config(format!("scrape.default_fiat: {e}")))?;
        Ok(())
    }
}

fn default_listen_address() -> String {
    ":9401".into()
}
fn default_telemetry_path() -> String {
    "/metrics".into()
}
fn default_pool_url() -> String {
    "https://miningpoolhub.com".into()
}
fn default_price_url() -> String {
    "https://min-api.cryptocompare.com".into()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_user_agent() -> String {
    "miningpoolhub-exporter".into()
}
fn default_fiat() -> String {
    "EUR".into()
}
