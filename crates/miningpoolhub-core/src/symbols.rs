//! Coin identifier -> trading symbol table.
//!
//! Built once at startup (built-in entries plus config overrides) and shared
//! read-only between scrapes.

use std::collections::{BTreeMap, HashSet};

use crate::protocol::pool::BalanceRecord;

/// Coins known to the pool, keyed by the identifier the pool API reports.
const BUILTIN: &[(&str, &str)] = &[
    ("adzcoin", "ADZ"),
    ("auroracoin", "AUR"),
    ("bitcoin", "BTC"),
    ("bitcoin-cash", "BCH"),
    ("bitcoin-gold", "BTG"),
    ("dash", "DSH"),
    ("digibyte", "DGB"),
    ("digibyte-groestl", "DGB"),
    ("digibyte-skein", "DGB"),
    ("digibyte-qubit", "DGB"),
    ("ethereum", "ETH"),
    ("ethereum-classic", "ETC"),
    ("expanse", "EXP"),
    ("feathercoin", "FTC"),
    ("gamecredits", "GAME"),
    ("geocoin", "GEO"),
    ("globalboosty", "BSTY"),
    ("groestlcoin", "GRS"),
    ("litecoin", "LTC"),
    ("maxcoin", "MAX"),
    ("monacoin", "MONA"),
    ("monero", "XMR"),
    ("musicoin", "MUSIC"),
    ("myriadcoin", "XMY"),
    ("myriadcoin-skein", "XMY"),
    ("myriadcoin-groestl", "XMY"),
    ("myriadcoin-yescrypt", "XMY"),
    ("sexcoin", "SXC"),
    ("siacoin", "SC"),
    ("startcoin", "START"),
    ("verge", "XVG"),
    ("vertcoin", "VTC"),
    ("zcash", "ZEC"),
    ("zclassic", "ZCL"),
    ("zcoin", "XZC"),
    ("zencash", "ZEN"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    map: BTreeMap<String, String>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SymbolTable {
    /// Built-in table only.
    pub fn builtin() -> Self {
        Self {
            map: BUILTIN
                .iter()
                .map(|(coin, sym)| (coin.to_string(), sym.to_string()))
                .collect(),
        }
    }

    /// Built-in table with `overrides` layered on top (same coin replaces).
    pub fn with_overrides<'a, I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut table = Self::builtin();
        for (coin, sym) in overrides {
            table.map.insert(coin.clone(), sym.clone());
        }
        table
    }

    pub fn resolve(&self, coin: &str) -> Option<&str> {
        self.map.get(coin).map(String::as_str)
    }

    /// Symbol label for a coin; empty when unknown.
    pub fn symbol_or_empty(&self, coin: &str) -> &str {
        self.resolve(coin).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Symbols to request prices for: first-seen order, no duplicates, no
    /// unknown coins.
    pub fn derive_symbols(&self, records: &[BalanceRecord]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for rec in records {
            match self.resolve(&rec.coin) {
                Some(sym) => {
                    if seen.insert(sym) {
                        out.push(sym.to_string());
                    }
                }
                None => tracing::debug!(coin = %rec.coin, "no symbol for coin"),
            }
        }
        out
    }
}
