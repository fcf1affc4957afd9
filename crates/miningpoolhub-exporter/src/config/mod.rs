//! Exporter config loader (strict parsing).
//!
//! Precedence: CLI flag > YAML file > built-in default.

pub mod cli;
pub mod schema;

use std::fs;
use std::path::Path;

use miningpoolhub_core::error::{ExporterError, Result};

pub use cli::Args;
pub use schema::{ExporterConfig, ScrapeSection, UpstreamSection, WebSection};

pub fn load_from_file(path: &Path) -> Result<ExporterConfig> {
    let cfg = parse(&read(path)?)?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_str(s: &str) -> Result<ExporterConfig> {
    let cfg = parse(s)?;
    cfg.validate()?;
    Ok(cfg)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| ExporterError::Config(format!("read {} failed: {e}", path.display())))
}

fn parse(s: &str) -> Result<ExporterConfig> {
    serde_yaml::from_str(s).map_err(|e| ExporterError::Config(format!("invalid yaml: {e}")))
}

/// Resolve the effective config from flags (and the file they may name).
pub fn load(args: &Args) -> Result<ExporterConfig> {
    let mut cfg = match &args.config {
        Some(path) => parse(&read(path)?)?,
        None => ExporterConfig::default(),
    };
    args.apply(&mut cfg);
    cfg.validate()?;
    Ok(cfg)
}
