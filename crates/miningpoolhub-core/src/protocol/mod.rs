//! Upstream wire formats (pool balances + price lookup).
//!
//! Both APIs answer with JSON. Decoders take the raw body and report
//! malformed payloads as `ExporterError::Decode` tagged with the API they came
//! from, so the collector can log the failure and abort the scrape without
//! panicking on hostile or truncated bodies.

pub mod pool;
pub mod price;
