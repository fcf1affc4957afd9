//! MiningPoolHub exporter library entry.
//!
//! This crate wires config, upstream clients, the balance collector and the
//! HTTP surface into one exporter. It is consumed by the binary (`main.rs`)
//! and by integration tests.

pub mod app_state;
pub mod collector;
pub mod config;
pub mod error;
pub mod obs;
pub mod ops;
pub mod router;
pub mod upstream;
