//! miningpoolhub core: upstream wire formats, symbol table, and error types.
//!
//! This crate defines the pool/price payloads, the coin symbol table, the
//! conversion policy and the error surface shared by the exporter. It carries
//! no transport or runtime dependencies so it can be tested without a network.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths surface as `ExporterError`/`Result` so a bad upstream
//! body aborts one scrape instead of the process.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;
pub mod symbols;

pub use error::{Api, ExporterError, Result};
pub use protocol::pool::{BalanceRecord, Status, WalletKind};
pub use protocol::price::PriceTable;
pub use symbols::SymbolTable;
