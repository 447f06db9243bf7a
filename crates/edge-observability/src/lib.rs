//! Observability for cache key derivation.
//!
//! This crate provides:
//! - `init_tracing` - Global `tracing` subscriber (human or JSON) on stderr
//! - `NumericalAggregator` - Count, mean and order statistics over samples
//! - `KeyMetrics` - Per-rule derivation timings and sentinel counts

mod aggregation;
mod logging;
mod metrics;

pub use aggregation::*;
pub use logging::*;
pub use metrics::*;
