//! Numerical aggregation over samples.

use serde::Serialize;

/// Running aggregate of numeric samples.
///
/// Count, mean, min and max are available at any time. Order statistics need
/// [`NumericalAggregator::analyze`], which sorts a copy of the samples.
#[derive(Debug, Clone, Default)]
pub struct NumericalAggregator {
    samples: Vec<f64>,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl NumericalAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sample. Non-finite values are ignored.
    pub fn sample(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.samples.push(value);
        self.sum += value;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    /// Record every sample of another aggregator.
    pub fn merge(&mut self, other: &NumericalAggregator) {
        for &value in &other.samples {
            self.sample(value);
        }
    }

    /// Number of samples.
    pub fn count(&self) -> u64 {
        self.samples.len() as u64
    }

    /// Arithmetic mean, 0 when empty.
    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.sum / self.samples.len() as f64
        }
    }

    /// Smallest sample, 0 when empty.
    pub fn min(&self) -> f64 {
        self.min.unwrap_or(0.0)
    }

    /// Largest sample, 0 when empty.
    pub fn max(&self) -> f64 {
        self.max.unwrap_or(0.0)
    }

    /// Sorted snapshot for order statistics.
    pub fn analyze(&self) -> Analysis {
        let mut sorted = self.samples.clone();
        sorted.sort_by(f64::total_cmp);
        Analysis { sorted }
    }
}

/// Sorted samples.
#[derive(Debug, Clone)]
pub struct Analysis {
    sorted: Vec<f64>,
}

impl Analysis {
    /// Value at quantile `q` in `[0, 1]`: the sorted sample at index
    /// `floor(q * n)`, clamped to the last sample. 0 when empty.
    pub fn quantile(&self, q: f64) -> f64 {
        if self.sorted.is_empty() {
            return 0.0;
        }
        let last = self.sorted.len() - 1;
        let index = (q.clamp(0.0, 1.0) * self.sorted.len() as f64).floor() as usize;
        self.sorted[index.min(last)]
    }

    /// The 0.5 quantile.
    pub fn median(&self) -> f64 {
        self.quantile(0.5)
    }

    /// Most frequent value; ties go to the smallest. 0 when empty.
    pub fn mode(&self) -> f64 {
        let mut best = (0.0, 0usize);
        let mut run = (f64::NAN, 0usize);
        for &value in &self.sorted {
            if value == run.0 {
                run.1 += 1;
            } else {
                run = (value, 1);
            }
            if run.1 > best.1 {
                best = run;
            }
        }
        best.0
    }

    /// Count, mean and common quantiles in one serializable value.
    pub fn summary(&self) -> Summary {
        let count = self.sorted.len() as u64;
        let mean = if self.sorted.is_empty() {
            0.0
        } else {
            self.sorted.iter().sum::<f64>() / self.sorted.len() as f64
        };
        Summary {
            count,
            mean,
            min: self.sorted.first().copied().unwrap_or(0.0),
            max: self.sorted.last().copied().unwrap_or(0.0),
            median: self.median(),
            p90: self.quantile(0.9),
            p99: self.quantile(0.99),
            mode: self.mode(),
        }
    }
}

/// Summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: u64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub p90: f64,
    pub p99: f64,
    pub mode: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate(values: &[f64]) -> NumericalAggregator {
        let mut aggr = NumericalAggregator::new();
        for &v in values {
            aggr.sample(v);
        }
        aggr
    }

    #[test]
    fn test_simple_numerical_aggregation() {
        let aggr = aggregate(&[5.0, 10.0, 15.0]);

        assert_eq!(aggr.count(), 3);
        assert_eq!(aggr.mean(), 10.0);
        assert_eq!(aggr.min(), 5.0);
        assert_eq!(aggr.max(), 15.0);

        let data = aggr.analyze();
        assert_eq!(data.median(), 10.0);
        assert_eq!(data.quantile(0.5), 10.0);
        assert_eq!(data.mode(), 5.0);
    }

    #[test]
    fn test_simple_mode() {
        let data = aggregate(&[5.0, 10.0, 15.0, 5.0, 10.0, 5.0]).analyze();
        assert_eq!(data.mode(), 5.0);
        assert_eq!(data.quantile(0.9), 15.0);
    }

    #[test]
    fn test_empty() {
        let aggr = NumericalAggregator::new();
        assert_eq!(aggr.count(), 0);
        assert_eq!(aggr.mean(), 0.0);
        assert_eq!(aggr.min(), 0.0);
        assert_eq!(aggr.max(), 0.0);

        let data = aggr.analyze();
        assert_eq!(data.median(), 0.0);
        assert_eq!(data.mode(), 0.0);
    }

    #[test]
    fn test_quantile_bounds() {
        let data = aggregate(&[3.0, 1.0, 2.0]).analyze();
        assert_eq!(data.quantile(0.0), 1.0);
        assert_eq!(data.quantile(1.0), 3.0);
        assert_eq!(data.quantile(7.0), 3.0);
    }

    #[test]
    fn test_ignores_non_finite() {
        let aggr = aggregate(&[1.0, f64::NAN, f64::INFINITY, 3.0]);
        assert_eq!(aggr.count(), 2);
        assert_eq!(aggr.mean(), 2.0);
    }

    #[test]
    fn test_merge_and_summary() {
        let mut aggr = aggregate(&[1.0, 2.0]);
        aggr.merge(&aggregate(&[3.0, 4.0]));
        let summary = aggr.analyze().summary();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean, 2.5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 4.0);
        assert_eq!(summary.median, 3.0);
    }
}
