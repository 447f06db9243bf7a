//! Cache key rules: a compiled template bound to request fields.

use std::collections::HashMap;
use std::fmt;

use edge_expr::{CompiledTemplate, Compiler, Diagnostic, KeyContext};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::error::RuleError;
use crate::key::{CacheKey, CacheKeyContext, ContextField};

/// Operator configuration for one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Unique rule name.
    pub name: String,
    /// Key template.
    pub template: String,
    /// Context fields, in positional order.
    #[serde(default)]
    pub inputs: Vec<String>,
}

impl RuleConfig {
    /// Create a rule configuration.
    pub fn new(name: impl Into<String>, template: impl Into<String>, inputs: &[&str]) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A problem that does not stop a rule from registering but will show up as
/// sentinel text in its keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleWarning {
    /// A call with the wrong number of arguments.
    Arity(Diagnostic),
    /// The template reads a context index the rule has no input for.
    MissingInput { index: usize, inputs: usize },
}

impl fmt::Display for RuleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arity(d) => write!(f, "{}", d),
            Self::MissingInput { index, inputs } => write!(
                f,
                "template reads {{{}}} but the rule has {} input(s)",
                index, inputs
            ),
        }
    }
}

/// A registered cache key rule.
#[derive(Debug, Clone)]
pub struct CacheKeyRule {
    name: String,
    template: CompiledTemplate,
    inputs: Vec<ContextField>,
}

impl CacheKeyRule {
    /// Compile a rule with the builtin functions.
    pub fn new(name: impl Into<String>, template: &str, inputs: Vec<ContextField>) -> Result<Self, RuleError> {
        let name = name.into();
        let template = Compiler::default()
            .compile(template)
            .map_err(|source| RuleError::Compile {
                rule: name.clone(),
                source,
            })?;
        Ok(Self {
            name,
            template,
            inputs,
        })
    }

    /// Compile a rule from configuration.
    pub fn from_config(config: &RuleConfig, compiler: &Compiler<'_>) -> Result<Self, RuleError> {
        let inputs = config
            .inputs
            .iter()
            .map(|s| s.parse::<ContextField>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| RuleError::UnknownField {
                rule: config.name.clone(),
                source,
            })?;

        let template = compiler
            .compile(&config.template)
            .map_err(|source| RuleError::Compile {
                rule: config.name.clone(),
                source,
            })?;

        Ok(Self {
            name: config.name.clone(),
            template,
            inputs,
        })
    }

    /// Rule name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compiled template.
    pub fn template(&self) -> &CompiledTemplate {
        &self.template
    }

    /// Input fields in positional order.
    pub fn inputs(&self) -> &[ContextField] {
        &self.inputs
    }

    /// Problems that will render sentinels in every key.
    pub fn warnings(&self) -> Vec<RuleWarning> {
        let mut warnings: Vec<RuleWarning> = self
            .template
            .diagnostics()
            .iter()
            .cloned()
            .map(RuleWarning::Arity)
            .collect();

        if let Some(index) = self.template.max_arg_index() {
            if index >= self.inputs.len() {
                warnings.push(RuleWarning::MissingInput {
                    index,
                    inputs: self.inputs.len(),
                });
            }
        }

        warnings
    }

    /// Resolve the rule's inputs into a template context.
    pub fn context(&self, ctx: &CacheKeyContext) -> KeyContext {
        self.inputs.iter().map(|field| field.resolve(ctx)).collect()
    }

    /// Derive the cache key for a request.
    pub fn derive(&self, ctx: &CacheKeyContext) -> CacheKey {
        let key_ctx = self.context(ctx);
        let key = self.template.evaluate(&key_ctx);
        trace!(rule = %self.name, key = %key, "derived cache key");
        CacheKey::new(key, self.name.clone(), key_ctx.values().to_vec())
    }
}

/// Named rules, compiled once and looked up per request.
#[derive(Debug, Clone, Default)]
pub struct KeyRuleSet {
    rules: Vec<CacheKeyRule>,
    by_name: HashMap<String, usize>,
}

impl KeyRuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a list of rule configurations, stopping at the first error.
    pub fn from_configs(configs: &[RuleConfig], compiler: &Compiler<'_>) -> Result<Self, RuleError> {
        let mut set = Self::new();
        for config in configs {
            let rule = CacheKeyRule::from_config(config, compiler).inspect_err(|e| {
                warn!(rule = %config.name, error = %e, "cache key rule rejected");
            })?;
            set.insert(rule)?;
        }
        info!(rules = set.len(), "cache key rules registered");
        Ok(set)
    }

    /// Add a rule.
    pub fn insert(&mut self, rule: CacheKeyRule) -> Result<(), RuleError> {
        if self.by_name.contains_key(rule.name()) {
            return Err(RuleError::DuplicateRule(rule.name().to_string()));
        }

        for warning in rule.warnings() {
            warn!(rule = %rule.name(), %warning, "cache key rule will render sentinels");
        }
        debug!(rule = %rule.name(), template = %rule.template().source(), "cache key rule registered");

        self.by_name.insert(rule.name().to_string(), self.rules.len());
        self.rules.push(rule);
        Ok(())
    }

    /// Look up a rule.
    pub fn get(&self, name: &str) -> Option<&CacheKeyRule> {
        self.by_name.get(name).map(|&i| &self.rules[i])
    }

    /// Derive a key with the named rule.
    pub fn derive(&self, name: &str, ctx: &CacheKeyContext) -> Option<CacheKey> {
        self.get(name).map(|rule| rule.derive(ctx))
    }

    /// Rules in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CacheKeyRule> {
        self.rules.iter()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use edge_expr::CompileError;

    use super::*;
    use crate::error::UnknownField;

    fn request() -> CacheKeyContext {
        CacheKeyContext::new("GET", "/static/img/Logo.PNG")
            .with_header("Accept-Language", "en-US,en;q=0.9")
            .with_query("v", "3")
    }

    #[test]
    fn test_derive_key() {
        let config = RuleConfig::new(
            "assets",
            "{0}:{path_dir {1}}/{lower {path_base {1}}}?v={2}",
            &["method", "path", "query:v"],
        );
        let rule = CacheKeyRule::from_config(&config, &Compiler::default()).unwrap();
        let key = rule.derive(&request());

        assert_eq!(key.as_str(), "GET:/static/img/logo.png?v=3");
        assert_eq!(key.rule(), "assets");
        assert_eq!(key.components(), &["GET", "/static/img/Logo.PNG", "3"]);
        assert!(!key.has_sentinel());
        assert!(rule.warnings().is_empty());
    }

    #[test]
    fn test_language_selection() {
        let rule = CacheKeyRule::new(
            "lang",
            "{substr {0} 0 2}",
            vec![ContextField::Header("accept-language".into())],
        )
        .unwrap();
        assert_eq!(rule.derive(&request()).as_str(), "en");
    }

    #[test]
    fn test_missing_input_warns_and_renders_sentinel() {
        let rule = CacheKeyRule::new("short", "{0}/{1}", vec![ContextField::Method]).unwrap();
        assert_eq!(
            rule.warnings(),
            vec![RuleWarning::MissingInput { index: 1, inputs: 1 }]
        );
        let key = rule.derive(&request());
        assert_eq!(key.as_str(), "GET/<ARGN>");
        assert!(key.has_sentinel());
    }

    #[test]
    fn test_arity_warning() {
        let rule = CacheKeyRule::new("bad", "{select {0}}", vec![ContextField::Path]).unwrap();
        let warnings = rule.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(&warnings[0], RuleWarning::Arity(d) if d.function == "select"));
    }

    #[test]
    fn test_rule_set_fails_fast() {
        let configs = vec![
            RuleConfig::new("ok", "{0}", &["path"]),
            RuleConfig::new("broken", "{0", &["path"]),
        ];
        let err = KeyRuleSet::from_configs(&configs, &Compiler::default()).unwrap_err();
        assert_eq!(
            err,
            RuleError::Compile {
                rule: "broken".to_string(),
                source: CompileError::UnbalancedBraces { offset: 0 },
            }
        );
        assert_eq!(err.rule(), "broken");
    }

    #[test]
    fn test_rule_set_rejects_unknown_field() {
        let configs = vec![RuleConfig::new("r", "{0}", &["header"])];
        let err = KeyRuleSet::from_configs(&configs, &Compiler::default()).unwrap_err();
        assert_eq!(
            err,
            RuleError::UnknownField {
                rule: "r".to_string(),
                source: UnknownField("header".to_string()),
            }
        );
    }

    #[test]
    fn test_rule_set_rejects_duplicates() {
        let configs = vec![
            RuleConfig::new("r", "{0}", &["path"]),
            RuleConfig::new("r", "{0}", &["method"]),
        ];
        let err = KeyRuleSet::from_configs(&configs, &Compiler::default()).unwrap_err();
        assert_eq!(err, RuleError::DuplicateRule("r".to_string()));
    }

    #[test]
    fn test_rule_set_lookup() {
        let configs = vec![
            RuleConfig::new("by-path", "p:{0}", &["path"]),
            RuleConfig::new("by-device", "d:{0}", &["device"]),
        ];
        let set = KeyRuleSet::from_configs(&configs, &Compiler::default()).unwrap();
        assert_eq!(set.len(), 2);

        let key = set.derive("by-path", &request()).unwrap();
        assert_eq!(key.as_str(), "p:/static/img/Logo.PNG");
        assert_eq!(set.derive("by-device", &request()).unwrap().as_str(), "d:");
        assert!(set.derive("missing", &request()).is_none());

        let names: Vec<_> = set.iter().map(CacheKeyRule::name).collect();
        assert_eq!(names, vec!["by-path", "by-device"]);
    }

    #[test]
    fn test_rule_config_deserializes() {
        let config: RuleConfig = serde_json::from_str(
            r#"{"name": "r", "template": "{0}", "inputs": ["path"]}"#,
        )
        .unwrap();
        assert_eq!(config, RuleConfig::new("r", "{0}", &["path"]));
    }
}
