//! In-process metric families rendered as Prometheus text.
//!
//! Families live only for the duration of one scrape; nothing is shared
//! between requests.

pub mod metrics;

pub use metrics::{GaugeVec, Registry};
