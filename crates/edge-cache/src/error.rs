//! Cache key rule errors.

use edge_expr::CompileError;
use thiserror::Error;

/// A context field name that is not recognised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown context field `{0}`")]
pub struct UnknownField(pub String);

/// Errors raised while registering cache key rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// The rule's template failed to compile.
    #[error("Rule `{rule}`: {source}")]
    Compile {
        rule: String,
        #[source]
        source: CompileError,
    },

    /// An input names an unknown context field.
    #[error("Rule `{rule}`: {source}")]
    UnknownField {
        rule: String,
        #[source]
        source: UnknownField,
    },

    /// Two rules share a name.
    #[error("Duplicate rule `{0}`")]
    DuplicateRule(String),
}

impl RuleError {
    /// Name of the rule the error belongs to.
    pub fn rule(&self) -> &str {
        match self {
            Self::Compile { rule, .. } | Self::UnknownField { rule, .. } => rule,
            Self::DuplicateRule(rule) => rule,
        }
    }
}
