//! Edge CLI - Command line tool for cache key templates.
//!
//! Commands:
//! - `edge eval` - Evaluate a template against values
//! - `edge explain` - Show how a template parses
//! - `edge functions` - List the builtin functions
//! - `edge check` - Validate the configured rules
//! - `edge derive` - Derive a key from a rule and a simulated request
//! - `edge bench` - Benchmark template evaluation
//! - `edge config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use edge_observability::{init_tracing, LogFormat};
use tracing::debug;

use commands::{BenchArgs, CheckArgs, ConfigArgs, DeriveArgs, EvalArgs, ExplainArgs, FunctionsArgs};

/// Edge CLI - Evaluate, check and benchmark cache key templates
#[derive(Parser)]
#[command(name = "edge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a template against positional values
    Eval(EvalArgs),

    /// Show how a template parses
    Explain(ExplainArgs),

    /// List the builtin functions
    Functions(FunctionsArgs),

    /// Validate the configured rules
    Check(CheckArgs),

    /// Derive a cache key from a configured rule
    Derive(DeriveArgs),

    /// Benchmark template evaluation
    Bench(BenchArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Eval(_) => "eval",
            Self::Explain(_) => "explain",
            Self::Functions(_) => "functions",
            Self::Check(_) => "check",
            Self::Derive(_) => "derive",
            Self::Bench(_) => "bench",
            Self::Config(_) => "config",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = match context::Context::load(config_path, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let mut logging = ctx.config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    if cli.json {
        logging.format = LogFormat::Json;
    }
    if let Err(e) = init_tracing(&logging) {
        ctx.output.warn(&e.to_string());
    }

    debug!(
        config = ?ctx.config_path,
        rules = ctx.config.rules.len(),
        "configuration loaded"
    );

    // Execute command
    debug!(command = cli.command.name(), "running command");
    let result = match cli.command {
        Commands::Eval(args) => commands::eval::run(args, &ctx).await,
        Commands::Explain(args) => commands::explain::run(args, &ctx).await,
        Commands::Functions(args) => commands::functions::run(args, &ctx).await,
        Commands::Check(args) => commands::check::run(args, &ctx).await,
        Commands::Derive(args) => commands::derive::run(args, &ctx).await,
        Commands::Bench(args) => commands::bench::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_command_names() {
        let cli = Cli::try_parse_from(["edge", "--verbose", "functions"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.command.name(), "functions");

        let cli = Cli::try_parse_from(["edge", "derive", "pdp", "-H", "X-Debug-Cache=1"]).unwrap();
        assert_eq!(cli.command.name(), "derive");
    }
}
