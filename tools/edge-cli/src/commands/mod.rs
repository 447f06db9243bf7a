//! CLI command implementations.

pub mod bench;
pub mod check;
pub mod config;
pub mod derive;
pub mod eval;
pub mod explain;
pub mod functions;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

/// Arguments for the eval command.
#[derive(Args)]
pub struct EvalArgs {
    /// Template to evaluate.
    pub template: String,

    /// Context values, bound to `{0}`, `{1}`, ...
    pub values: Vec<String>,
}

/// Arguments for the explain command.
#[derive(Args)]
pub struct ExplainArgs {
    /// Template to explain.
    pub template: String,
}

/// Arguments for the functions command.
#[derive(Args)]
pub struct FunctionsArgs {
    /// Show only this function.
    pub name: Option<String>,
}

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the derive command.
#[derive(Args)]
pub struct DeriveArgs {
    /// Rule name.
    pub rule: String,

    /// Request method.
    #[arg(short, long, default_value = "GET")]
    pub method: String,

    /// Request path.
    #[arg(short, long, default_value = "/")]
    pub path: String,

    /// Request header (NAME=VALUE, repeatable).
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Query parameter (NAME=VALUE, repeatable).
    #[arg(short, long = "query")]
    pub queries: Vec<String>,

    /// Cookie (NAME=VALUE, repeatable).
    #[arg(long = "cookie")]
    pub cookies: Vec<String>,

    /// Authenticated user id.
    #[arg(short, long)]
    pub user: Option<String>,

    /// Country code.
    #[arg(long)]
    pub country: Option<String>,

    /// Region.
    #[arg(long)]
    pub region: Option<String>,

    /// City.
    #[arg(long)]
    pub city: Option<String>,

    /// Print the debug headers for the derived key (also `-H X-Debug-Cache=1`).
    #[arg(long)]
    pub debug_headers: bool,
}

/// Arguments for the bench command.
#[derive(Args)]
pub struct BenchArgs {
    /// Template to benchmark.
    pub template: String,

    /// Context values, bound to `{0}`, `{1}`, ...
    pub values: Vec<String>,

    /// Evaluations per thread.
    #[arg(short = 'n', long, default_value = "10000")]
    pub iterations: u64,

    /// Worker threads sharing the compiled template.
    #[arg(short, long, default_value = "4")]
    pub threads: usize,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}

/// Split a `NAME=VALUE` argument.
pub fn parse_pair(arg: &str) -> Result<(&str, &str)> {
    match arg.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name, value)),
        _ => bail!("Expected NAME=VALUE, got `{}`", arg),
    }
}
