//! Validate the configured rules.

use anyhow::{bail, Result};
use edge_cache::CacheKeyRule;
use serde::Serialize;

use super::CheckArgs;
use crate::context::Context;

#[derive(Serialize)]
struct RuleReport {
    name: String,
    template: String,
    inputs: Vec<String>,
    warnings: Vec<String>,
}

impl RuleReport {
    fn new(rule: &CacheKeyRule) -> Self {
        Self {
            name: rule.name().to_string(),
            template: rule.template().source().to_string(),
            inputs: rule.inputs().iter().map(|f| f.to_string()).collect(),
            warnings: rule.warnings().iter().map(|w| w.to_string()).collect(),
        }
    }
}

/// Run the check command.
pub async fn run(args: CheckArgs, ctx: &Context) -> Result<()> {
    if ctx.config.rules.is_empty() {
        ctx.output.warn("No rules configured");
        return Ok(());
    }

    if let Some(path) = &ctx.config_path {
        ctx.output.debug(&format!("Using config {}", path.display()));
    }

    let rules = ctx.rule_set()?;

    let reports: Vec<RuleReport> = rules.iter().map(RuleReport::new).collect();
    let warnings: usize = reports.iter().map(|r| r.warnings.len()).sum();

    if ctx.output.is_json() {
        ctx.output.json(&reports);
    } else {
        ctx.output.header("Checking rules");
        for report in &reports {
            if report.warnings.is_empty() {
                ctx.output.success(&report.name);
            } else {
                ctx.output.warn(&report.name);
            }
            ctx.output.kv("template", &report.template);
            ctx.output.kv("inputs", &report.inputs.join(", "));
            for warning in &report.warnings {
                ctx.output.list_item(warning);
            }
        }
    }

    if args.strict && warnings > 0 {
        bail!("{} warning(s) in {} rule(s)", warnings, reports.len());
    }

    ctx.output
        .success(&format!("{} rule(s) compiled, {} warning(s)", reports.len(), warnings));

    Ok(())
}
