//! CLI configuration.

use anyhow::{Context, Result};
use edge_cache::RuleConfig;
use edge_expr::ParseLimits;
use edge_observability::LoggingConfig;
use serde::{Deserialize, Serialize};

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Parser limits applied to every template.
    #[serde(default)]
    pub limits: ParseLimits,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Cache key rules.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }
}

/// Generate a default edge.toml config file.
pub fn generate_default_config() -> String {
    let limits = ParseLimits::default();
    format!(
        r#"# Cache key configuration

[limits]
max_depth = {max_depth}
max_template_len = {max_template_len}

[logging]
format = "human"
level = "warn"

[[rules]]
name = "assets"
template = "{{0}}:{{path_dir {{1}}}}/{{lower {{path_base {{1}}}}}}"
inputs = ["method", "path"]

[[rules]]
name = "pdp"
template = "pdp:{{select {{0}} 0}}:{{1}}:{{substr {{2}} 0 2}}"
inputs = ["segment:1", "device", "header:accept-language"]
"#,
        max_depth = limits.max_depth,
        max_template_len = limits.max_template_len,
    )
}
