//! Benchmark template evaluation across threads.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context as _, Result};
use edge_expr::{KeyContext, Sentinel};
use edge_observability::KeyMetrics;
use serde::Serialize;

use super::BenchArgs;
use crate::context::Context;
use crate::output::format_micros;

const RULE: &str = "bench";
const TICK: u64 = 1_000;
/// Timing samples kept per worker; other evaluations are only counted.
const MAX_SAMPLES: u64 = 10_000;

#[derive(Serialize)]
struct BenchOutput {
    template: String,
    threads: usize,
    iterations: u64,
    elapsed_ms: f64,
    evals_per_sec: f64,
    metrics: serde_json::Value,
}

/// Run the bench command.
pub async fn run(args: BenchArgs, ctx: &Context) -> Result<()> {
    if args.threads == 0 || args.iterations == 0 {
        bail!("--threads and --iterations must be at least 1");
    }

    let template = Arc::new(
        ctx.compiler()
            .compile(&args.template)
            .with_context(|| format!("Failed to compile `{}`", args.template))?,
    );
    let key_ctx = Arc::new(KeyContext::new(args.values.clone()));

    let total = args.iterations * args.threads as u64;
    let progress = ctx.output.progress(total, "evaluating");
    let started = Instant::now();

    let mut handles = Vec::with_capacity(args.threads);
    for _ in 0..args.threads {
        let template = Arc::clone(&template);
        let key_ctx = Arc::clone(&key_ctx);
        let progress = progress.clone();
        let iterations = args.iterations;

        handles.push(tokio::task::spawn_blocking(move || {
            let mut metrics = KeyMetrics::new();
            let mut key = String::new();
            let stride = sample_stride(iterations);
            for i in 0..iterations {
                key.clear();
                let start = Instant::now();
                template.evaluate_into(&key_ctx, &mut key);
                let elapsed = start.elapsed();
                let has_sentinel = Sentinel::is_present_in(&key);
                if i % stride == 0 {
                    metrics.record(RULE, elapsed, has_sentinel);
                } else {
                    metrics.record_untimed(RULE, has_sentinel);
                }
                if (i + 1) % TICK == 0 {
                    progress.inc(TICK);
                }
            }
            progress.inc(iterations % TICK);
            metrics
        }));
    }

    let mut metrics = KeyMetrics::new();
    for handle in handles {
        let worker = handle.await.context("Benchmark worker panicked")?;
        metrics.merge(&worker);
    }
    let elapsed = started.elapsed();
    progress.finish_and_clear();

    let output = BenchOutput {
        template: args.template.clone(),
        threads: args.threads,
        iterations: args.iterations,
        elapsed_ms: elapsed.as_secs_f64() * 1_000.0,
        evals_per_sec: throughput(metrics.total_keys(), elapsed),
        metrics: serde_json::to_value(metrics.rules())?,
    };

    if ctx.output.is_json() {
        ctx.output.json(&output);
        return Ok(());
    }

    ctx.output.header("Benchmark");
    ctx.output.kv("template", &output.template);
    ctx.output.kv("key", &template.evaluate(&key_ctx));
    ctx.output.kv(
        "evaluations",
        &format!("{} ({} thread(s) x {})", total, args.threads, args.iterations),
    );
    ctx.output.kv("elapsed", &format_micros(elapsed.as_secs_f64() * 1_000_000.0));
    ctx.output.kv("throughput", &format!("{:.0} evals/s", output.evals_per_sec));

    for rule in metrics.rules() {
        let d = &rule.duration_us;
        ctx.output.kv("mean", &format_micros(d.mean));
        ctx.output.kv("median", &format_micros(d.median));
        ctx.output.kv("p90", &format_micros(d.p90));
        ctx.output.kv("p99", &format_micros(d.p99));
        ctx.output.kv("max", &format_micros(d.max));
        if rule.sentinel_keys > 0 {
            ctx.output.warn(&format!("{} key(s) contained a sentinel", rule.sentinel_keys));
        }
    }
    ctx.output.debug(&metrics.to_summary());

    Ok(())
}

/// Keep every `stride`-th timing so a worker stores at most `MAX_SAMPLES`.
fn sample_stride(iterations: u64) -> u64 {
    iterations.div_ceil(MAX_SAMPLES).max(1)
}

fn throughput(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        count as f64 / secs
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throughput() {
        assert_eq!(throughput(500, Duration::from_millis(500)), 1_000.0);
        assert_eq!(throughput(10, Duration::ZERO), 0.0);
    }

    #[test]
    fn test_sample_stride_bounds_samples() {
        assert_eq!(sample_stride(1), 1);
        assert_eq!(sample_stride(MAX_SAMPLES), 1);
        assert_eq!(sample_stride(MAX_SAMPLES + 1), 2);
        for iterations in [1u64, 9_999, 10_001, 1_000_000, 123_456_789] {
            let kept = iterations.div_ceil(sample_stride(iterations));
            assert!(kept <= MAX_SAMPLES, "{} iterations kept {}", iterations, kept);
        }
    }
}
