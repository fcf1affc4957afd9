//! Pool API `getuserallbalances` payload.

use serde::{Deserialize, Deserializer};

use crate::error::{Api, ExporterError, Result};

/// Top-level response: everything lives under `getuserallbalances`.
#[derive(Debug, Deserialize)]
pub struct GetUserAllBalances {
    #[serde(rename = "getuserallbalances")]
    pub data: BalancesData,
}

#[derive(Debug, Deserialize)]
pub struct BalancesData {
    /// API version string reported by the pool.
    #[serde(default)]
    pub version: String,
    /// Server-side runtime in milliseconds.
    #[serde(default, deserialize_with = "null_as_zero")]
    pub runtime: f64,
    #[serde(rename = "data", default)]
    pub balances: Vec<BalanceRecord>,
}

/// Balances of one mined coin.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BalanceRecord {
    pub coin: String,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub confirmed: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub unconfirmed: f64,
    /// Auto-exchange wallet, confirmed.
    #[serde(rename = "ae_confirmed", default, deserialize_with = "null_as_zero")]
    pub ae_confirmed: f64,
    /// Auto-exchange wallet, unconfirmed.
    #[serde(rename = "ae_unconfirmed", default, deserialize_with = "null_as_zero")]
    pub ae_unconfirmed: f64,
    /// Already exchanged amount.
    #[serde(default, deserialize_with = "null_as_zero")]
    pub exchange: f64,
}

/// The pool reports `null` for wallets it has nothing to say about.
fn null_as_zero<'de, D>(d: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(d)?.unwrap_or(0.0))
}

/// Wallet a balance is held in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletKind {
    Normal,
    Auto,
    Exchange,
}

impl WalletKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WalletKind::Normal => "normal",
            WalletKind::Auto => "auto",
            WalletKind::Exchange => "exchange",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Confirmed,
    Unconfirmed,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Confirmed => "confirmed",
            Status::Unconfirmed => "unconfirmed",
        }
    }
}

impl BalanceRecord {
    /// The five (wallet, status, amount) combinations exported per coin.
    /// The exchange wallet only has a confirmed amount.
    pub fn amounts(&self) -> [(WalletKind, Status, f64); 5] {
        [
            (WalletKind::Normal, Status::Confirmed, self.confirmed),
            (WalletKind::Normal, Status::Unconfirmed, self.unconfirmed),
            (WalletKind::Auto, Status::Confirmed, self.ae_confirmed),
            (WalletKind::Auto, Status::Unconfirmed, self.ae_unconfirmed),
            (WalletKind::Exchange, Status::Confirmed, self.exchange),
        ]
    }
}

/// Decode a pool response body into its balance records.
pub fn decode_balances(body: &[u8]) -> Result<Vec<BalanceRecord>> {
    let resp: GetUserAllBalances = serde_json::from_slice(body).map_err(|e| ExporterError::Decode {
        api: Api::Pool,
        msg: e.to_string(),
    })?;
    Ok(resp.data.balances)
}
