//! Per-scrape metrics registry.
//!
//! A `Registry` is built from scratch for every scrape and rendered once, so
//! it needs neither atomics nor interior mutability. Samples are keyed by
//! label values in declaration order and rendered sorted, which keeps the
//! exposition output deterministic.

use std::collections::BTreeMap;
use std::fmt::Write;

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Prometheus text representation of a sample value.
fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".into()
    } else if v.is_infinite() {
        if v > 0.0 { "+Inf".into() } else { "-Inf".into() }
    } else {
        format!("{v}")
    }
}

#[derive(Debug, Clone)]
pub struct GaugeVec {
    name: String,
    help: String,
    label_names: Vec<&'static str>,
    const_labels: Vec<(&'static str, String)>,
    samples: BTreeMap<Vec<String>, f64>,
}

impl GaugeVec {
    pub fn new(name: impl Into<String>, help: impl Into<String>, label_names: &[&'static str]) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            label_names: label_names.to_vec(),
            const_labels: Vec::new(),
            samples: BTreeMap::new(),
        }
    }

    /// Attach a label carried by every sample of this gauge.
    pub fn const_label(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.const_labels.push((name, value.into()));
        self
    }

    /// Set the sample for `values` (one per label name, same order).
    pub fn set(&mut self, values: &[&str], v: f64) {
        if values.len() != self.label_names.len() {
            tracing::warn!(
                metric = %self.name,
                want = self.label_names.len(),
                got = values.len(),
                "label cardinality mismatch, sample dropped"
            );
            return;
        }
        let key = values.iter().map(|s| s.to_string()).collect();
        self.samples.insert(key, v);
    }

    pub fn get(&self, values: &[&str]) -> Option<f64> {
        let key: Vec<String> = values.iter().map(|s| s.to_string()).collect();
        self.samples.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Render in Prometheus text exposition format. Empty gauges render nothing.
    fn render(&self, out: &mut String) {
        if self.samples.is_empty() {
            return;
        }
        let _ = writeln!(out, "# HELP {} {}", self.name, escape_help(&self.help));
        let _ = writeln!(out, "# TYPE {} gauge", self.name);
        for (values, v) in &self.samples {
            let label_str = self
                .const_labels
                .iter()
                .map(|(k, v)| (*k, v.as_str()))
                .chain(self.label_names.iter().copied().zip(values.iter().map(String::as_str)))
                .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
                .collect::<Vec<_>>()
                .join(",");
            if label_str.is_empty() {
                let _ = writeln!(out, "{} {}", self.name, format_value(*v));
            } else {
                let _ = writeln!(out, "{}{{{}}} {}", self.name, label_str, format_value(*v));
            }
        }
    }
}

/// Metric families produced by one scrape.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    gauges: Vec<GaugeVec>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, gauge: GaugeVec) {
        self.gauges.push(gauge);
    }

    pub fn gauge(&self, name: &str) -> Option<&GaugeVec> {
        self.gauges.iter().find(|g| g.name == name)
    }

    /// Total number of samples across all families.
    pub fn sample_count(&self) -> usize {
        self.gauges.iter().map(GaugeVec::len).sum()
    }

    /// Render all registered families.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for g in &self.gauges {
            g.render(&mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_help_type_and_ordered_labels() {
        let mut g = GaugeVec::new("x_balance", "Balances", &["coin", "wallet"]);
        g.set(&["zcash", "normal"], 2.0);
        g.set(&["bitcoin", "auto"], 0.5);
        let mut reg = Registry::new();
        reg.register(g);

        assert_eq!(
            reg.render(),
            "# HELP x_balance Balances\n\
             # TYPE x_balance gauge\n\
             x_balance{coin=\"bitcoin\",wallet=\"auto\"} 0.5\n\
             x_balance{coin=\"zcash\",wallet=\"normal\"} 2\n"
        );
    }

    #[test]
    fn const_labels_come_first_and_values_are_escaped() {
        let mut g = GaugeVec::new("x_info", "Info", &["note"]).const_label("version", "1.0");
        g.set(&["a \"quoted\"\nline\\"], 1.0);
        let mut out = String::new();
        g.render(&mut out);
        assert!(out.contains(r#"x_info{version="1.0",note="a \"quoted\"\nline\\"} 1"#));
    }

    #[test]
    fn unlabeled_gauge_has_no_braces() {
        let mut g = GaugeVec::new("x_up", "Up", &[]);
        g.set(&[], 1.0);
        let mut out = String::new();
        g.render(&mut out);
        assert!(out.ends_with("x_up 1\n"));
    }

    #[test]
    fn empty_families_are_omitted() {
        let mut reg = Registry::new();
        reg.register(GaugeVec::new("x_empty", "Nothing", &["coin"]));
        assert_eq!(reg.render(), "");
        assert_eq!(reg.sample_count(), 0);
    }

    #[test]
    fn wrong_cardinality_is_dropped() {
        let mut g = GaugeVec::new("x", "x", &["a", "b"]);
        g.set(&["only-one"], 1.0);
        assert!(g.is_empty());
    }

    #[test]
    fn special_values_use_prometheus_spelling() {
        assert_eq!(format_value(f64::NAN), "NaN");
        assert_eq!(format_value(f64::INFINITY), "+Inf");
        assert_eq!(format_value(f64::NEG_INFINITY), "-Inf");
        assert_eq!(format_value(0.00005), "0.00005");
    }
}
