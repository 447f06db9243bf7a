//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use edge_cache::KeyRuleSet;
use edge_expr::{Compiler, FunctionRegistry};

use crate::config::CliConfig;
use crate::output::Output;

const CONFIG_NAMES: [&str; 3] = ["edge.toml", ".edge.toml", "edge.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// File the configuration was read from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = if let Some(path) = config_path {
            (CliConfig::load(path)?, Some(PathBuf::from(path)))
        } else {
            match find_config(&cwd) {
                Some(path) => {
                    let config = CliConfig::load(&path.to_string_lossy())?;
                    (config, Some(path))
                }
                None => (CliConfig::default(), None),
            }
        };

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Compiler over the builtin functions with the configured limits.
    pub fn compiler(&self) -> Compiler<'static> {
        Compiler::new(FunctionRegistry::builtin()).with_limits(self.config.limits)
    }

    /// Compile every configured rule.
    pub fn rule_set(&self) -> Result<KeyRuleSet> {
        let rules = KeyRuleSet::from_configs(&self.config.rules, &self.compiler())?;
        Ok(rules)
    }
}

/// Find the nearest config file walking up from `start`.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_NAMES {
            let config_path = current.join(name);
            if config_path.exists() {
                return Some(config_path);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("edge.toml"), "").unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config(&nested), Some(dir.path().join("edge.toml")));
    }

    #[test]
    fn test_find_config_prefers_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("edge.json"), "{}").unwrap();
        std::fs::write(dir.path().join("edge.toml"), "").unwrap();

        assert_eq!(find_config(dir.path()), Some(dir.path().join("edge.toml")));
    }
}
