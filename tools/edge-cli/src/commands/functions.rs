//! List the builtin functions.

use anyhow::{bail, Result};
use edge_expr::FunctionDef;
use serde::Serialize;

use super::FunctionsArgs;
use crate::context::Context;

#[derive(Serialize)]
struct FunctionInfo {
    name: &'static str,
    arity: String,
    summary: &'static str,
}

impl From<&FunctionDef> for FunctionInfo {
    fn from(def: &FunctionDef) -> Self {
        Self {
            name: def.name(),
            arity: def.arity().to_string(),
            summary: def.summary(),
        }
    }
}

/// Run the functions command.
pub async fn run(args: FunctionsArgs, ctx: &Context) -> Result<()> {
    let registry = ctx.compiler().registry();

    let functions: Vec<FunctionInfo> = match &args.name {
        Some(name) => match registry.get(name) {
            Some(def) => vec![def.into()],
            None => bail!("Unknown function: {}", name),
        },
        None => registry.iter().map(FunctionInfo::from).collect(),
    };

    if ctx.output.is_json() {
        ctx.output.json(&functions);
        return Ok(());
    }

    ctx.output.header("Functions");
    let width = functions.iter().map(|f| f.name.len()).max().unwrap_or(0);
    for function in &functions {
        ctx.output
            .table_row(&[function.name, function.arity.as_str(), function.summary], &[width, 6, 0]);
    }

    Ok(())
}
