//! Configuration management commands.

use std::fs;

use anyhow::{Context as _, Result};
use dialoguer::Confirm;

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { force } => init_config(force, ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    ctx.output.info("[limits]");
    ctx.output.kv("max_depth", &ctx.config.limits.max_depth.to_string());
    ctx.output
        .kv("max_template_len", &ctx.config.limits.max_template_len.to_string());

    ctx.output.info("[logging]");
    ctx.output.kv("format", &ctx.config.logging.format.to_string());
    ctx.output.kv("level", &ctx.config.logging.level);

    for rule in &ctx.config.rules {
        ctx.output.info("[[rules]]");
        ctx.output.kv("name", &rule.name);
        ctx.output.kv("template", &rule.template);
        ctx.output.kv("inputs", &rule.inputs.join(", "));
    }

    Ok(())
}

async fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("edge.toml");

    if config_path.exists() && !force {
        let overwrite = Confirm::new()
            .with_prompt(format!("{} already exists. Overwrite?", config_path.display()))
            .default(false)
            .interact()?;

        if !overwrite {
            ctx.output.warn("Keeping existing config");
            return Ok(());
        }
    }

    fs::write(&config_path, generate_default_config())
        .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}
