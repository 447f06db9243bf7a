//! Cache key derivation metrics.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use crate::aggregation::{NumericalAggregator, Summary};

/// Per-rule derivation timings and sentinel counts.
#[derive(Debug, Clone, Default)]
pub struct KeyMetrics {
    rules: BTreeMap<String, RuleStats>,
}

#[derive(Debug, Clone, Default)]
struct RuleStats {
    durations_us: NumericalAggregator,
    keys: u64,
    sentinel_keys: u64,
}

/// Metrics for a single rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleMetrics {
    /// Rule name.
    pub rule: String,
    /// Keys derived.
    pub keys: u64,
    /// Keys that contained a sentinel marker.
    pub sentinel_keys: u64,
    /// Derivation duration statistics (microseconds).
    pub duration_us: Summary,
}

impl KeyMetrics {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one derived key with its derivation time.
    pub fn record(&mut self, rule: &str, duration: Duration, has_sentinel: bool) {
        let stats = self.count(rule, has_sentinel);
        stats.durations_us.sample(duration.as_secs_f64() * 1_000_000.0);
    }

    /// Record one derived key without a timing sample.
    pub fn record_untimed(&mut self, rule: &str, has_sentinel: bool) {
        self.count(rule, has_sentinel);
    }

    fn count(&mut self, rule: &str, has_sentinel: bool) -> &mut RuleStats {
        let stats = self.rules.entry(rule.to_string()).or_default();
        stats.keys += 1;
        if has_sentinel {
            stats.sentinel_keys += 1;
        }
        stats
    }

    /// Fold another collector into this one.
    pub fn merge(&mut self, other: &KeyMetrics) {
        for (rule, theirs) in &other.rules {
            let ours = self.rules.entry(rule.clone()).or_default();
            ours.durations_us.merge(&theirs.durations_us);
            ours.keys += theirs.keys;
            ours.sentinel_keys += theirs.sentinel_keys;
        }
    }

    /// Total keys recorded across rules.
    pub fn total_keys(&self) -> u64 {
        self.rules.values().map(|s| s.keys).sum()
    }

    /// Per-rule metrics, sorted by rule name.
    pub fn rules(&self) -> Vec<RuleMetrics> {
        self.rules
            .iter()
            .map(|(rule, stats)| RuleMetrics {
                rule: rule.clone(),
                keys: stats.keys,
                sentinel_keys: stats.sentinel_keys,
                duration_us: stats.durations_us.analyze().summary(),
            })
            .collect()
    }

    /// Format as JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.rules()).unwrap_or_default()
    }

    /// Format as human-readable summary.
    pub fn to_summary(&self) -> String {
        let mut lines = Vec::new();

        for rule in self.rules() {
            let d = &rule.duration_us;
            lines.push(format!("Rule: {}", rule.rule));
            lines.push(format!("  Keys: {} ({} with sentinel)", rule.keys, rule.sentinel_keys));
            lines.push(format!(
                "  Duration: mean {:.2}us, median {:.2}us, p90 {:.2}us, p99 {:.2}us, max {:.2}us",
                d.mean, d.median, d.p90, d.p99, d.max
            ));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_summarize() {
        let mut metrics = KeyMetrics::new();
        metrics.record("assets", Duration::from_micros(10), false);
        metrics.record("assets", Duration::from_micros(30), true);
        metrics.record("pdp", Duration::from_micros(5), false);

        let rules = metrics.rules();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].rule, "assets");
        assert_eq!(rules[0].keys, 2);
        assert_eq!(rules[0].sentinel_keys, 1);
        assert!((rules[0].duration_us.mean - 20.0).abs() < 1e-6);
        assert_eq!(metrics.total_keys(), 3);
    }

    #[test]
    fn test_merge() {
        let mut a = KeyMetrics::new();
        a.record("r", Duration::from_micros(1), false);
        let mut b = KeyMetrics::new();
        b.record("r", Duration::from_micros(3), true);
        b.record("s", Duration::from_micros(2), false);

        a.merge(&b);
        assert_eq!(a.total_keys(), 3);
        assert_eq!(a.rules()[0].sentinel_keys, 1);
    }

    #[test]
    fn test_untimed_keys_are_counted() {
        let mut metrics = KeyMetrics::new();
        metrics.record("r", Duration::from_micros(4), false);
        metrics.record_untimed("r", true);
        metrics.record_untimed("r", false);

        let rules = metrics.rules();
        assert_eq!(rules[0].keys, 3);
        assert_eq!(rules[0].sentinel_keys, 1);
        assert_eq!(rules[0].duration_us.count, 1);
    }

    #[test]
    fn test_summary_text() {
        let mut metrics = KeyMetrics::new();
        metrics.record("assets", Duration::from_micros(10), false);
        let text = metrics.to_summary();
        assert!(text.contains("Rule: assets"));
        assert!(text.contains("Keys: 1 (0 with sentinel)"));
        assert!(metrics.to_json().contains("\"rule\":\"assets\""));
    }
}
