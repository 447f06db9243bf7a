//! Evaluate a template against positional values.

use anyhow::{Context as _, Result};
use edge_expr::{KeyContext, Sentinel};
use serde::Serialize;

use super::EvalArgs;
use crate::context::Context;
use crate::output::styled_key;

#[derive(Serialize)]
struct EvalOutput<'a> {
    template: &'a str,
    values: &'a [String],
    key: &'a str,
    sentinels: Vec<&'static str>,
}

/// Run the eval command.
pub async fn run(args: EvalArgs, ctx: &Context) -> Result<()> {
    let template = ctx
        .compiler()
        .compile(&args.template)
        .with_context(|| format!("Failed to compile `{}`", args.template))?;

    for diagnostic in template.diagnostics() {
        ctx.output.warn(&diagnostic.to_string());
    }

    let key_ctx = KeyContext::new(args.values.clone());
    let key = template.evaluate(&key_ctx);
    let sentinels: Vec<&'static str> = Sentinel::ALL
        .iter()
        .filter(|s| key.contains(s.as_str()))
        .map(|s| s.as_str())
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&EvalOutput {
            template: &args.template,
            values: &args.values,
            key: &key,
            sentinels,
        });
        return Ok(());
    }

    println!("{}", styled_key(&key, !sentinels.is_empty()));
    for sentinel in &sentinels {
        ctx.output.debug(&format!("key contains {}", sentinel));
    }

    Ok(())
}
