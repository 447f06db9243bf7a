//! Template compilation.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::ast::Expr;
use crate::error::CompileError;
use crate::parser::{parse_with_limits, ParseLimits};
use crate::registry::{Arity, FunctionRegistry};
use crate::stage::{CompiledTemplate, Stage};

/// A call whose argument count is outside the function's arity.
///
/// Not an error: the call renders the argument-count sentinel at evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Byte offset of the function name.
    pub offset: usize,
    /// Function name.
    pub function: String,
    /// Declared arity.
    pub expected: Arity,
    /// Arguments supplied.
    pub got: usize,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` at offset {} takes {} argument(s), got {}",
            self.function, self.offset, self.expected, self.got
        )
    }
}

/// Compiles templates against a function registry.
#[derive(Debug, Clone)]
pub struct Compiler<'r> {
    registry: &'r FunctionRegistry,
    limits: ParseLimits,
}

impl Default for Compiler<'static> {
    fn default() -> Self {
        Self::new(FunctionRegistry::builtin())
    }
}

impl<'r> Compiler<'r> {
    /// Create a compiler resolving functions in `registry`.
    pub fn new(registry: &'r FunctionRegistry) -> Self {
        Self {
            registry,
            limits: ParseLimits::default(),
        }
    }

    /// Set parse limits.
    pub fn with_limits(mut self, limits: ParseLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The registry functions are resolved in.
    pub fn registry(&self) -> &'r FunctionRegistry {
        self.registry
    }

    /// Compile a template.
    pub fn compile(&self, template: &str) -> Result<CompiledTemplate, CompileError> {
        let nodes = parse_with_limits(template, &self.limits)?;

        let mut diagnostics = Vec::new();
        let stages = nodes
            .into_iter()
            .map(|node| self.lower(node, &mut diagnostics))
            .collect::<Result<Vec<_>, _>>()?;

        for d in &diagnostics {
            warn!(
                template,
                function = %d.function,
                offset = d.offset,
                expected = %d.expected,
                got = d.got,
                "call will render argument-count sentinel"
            );
        }
        debug!(template, stages = stages.len(), "compiled key template");

        Ok(CompiledTemplate::new(template.to_string(), stages, diagnostics))
    }

    fn lower(&self, expr: Expr, diagnostics: &mut Vec<Diagnostic>) -> Result<Stage, CompileError> {
        match expr {
            Expr::Literal(text) => Ok(Stage::Literal(text)),
            Expr::ArgRef(index) => Ok(Stage::ArgRef(index)),
            Expr::Call { name, args, offset } => {
                let function = *self
                    .registry
                    .get(&name)
                    .ok_or_else(|| CompileError::UnknownFunction {
                        name: name.clone(),
                        offset,
                    })?;

                if !function.arity().accepts(args.len()) {
                    diagnostics.push(Diagnostic {
                        offset,
                        function: name,
                        expected: function.arity(),
                        got: args.len(),
                    });
                }

                let args = args
                    .into_iter()
                    .map(|arg| self.lower(arg, diagnostics))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Stage::Call { function, args })
            }
            Expr::Concat(parts) => {
                let parts = parts
                    .into_iter()
                    .map(|part| self.lower(part, diagnostics))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Stage::Concat(parts))
            }
        }
    }
}

/// Compile a template against the builtin registry with default limits.
pub fn compile(template: &str) -> Result<CompiledTemplate, CompileError> {
    Compiler::default().compile(template)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Args, FunctionDef};
    use crate::sentinel::Sentinel;

    #[test]
    fn test_plain_template_compiles_to_one_literal() {
        let template = compile("static/key").unwrap();
        assert_eq!(template.stages().len(), 1);
        assert!(template.is_constant());
        assert_eq!(template.source(), "static/key");
    }

    #[test]
    fn test_unknown_function() {
        let err = compile("a {nope {0}}").unwrap_err();
        assert_eq!(
            err,
            CompileError::UnknownFunction {
                name: "nope".to_string(),
                offset: 3
            }
        );
    }

    #[test]
    fn test_unknown_nested_function() {
        let err = compile("{lower {nope}}").unwrap_err();
        assert!(matches!(err, CompileError::UnknownFunction { ref name, offset: 8 } if name == "nope"));
    }

    #[test]
    fn test_arity_mismatch_is_diagnostic_not_error() {
        let template = compile("{substr 0} {select {0} 1}").unwrap();
        assert_eq!(
            template.diagnostics(),
            &[Diagnostic {
                offset: 1,
                function: "substr".to_string(),
                expected: Arity::between(2, 3),
                got: 1,
            }]
        );
        assert_eq!(
            template.diagnostics()[0].to_string(),
            "`substr` at offset 1 takes 2..=3 argument(s), got 1"
        );
    }

    #[test]
    fn test_custom_registry() {
        fn reverse(args: &Args<'_>) -> Result<String, Sentinel> {
            Ok(args.str(0).chars().rev().collect())
        }
        let registry = FunctionRegistry::builder()
            .register(FunctionDef::new("reverse", Arity::exactly(1), "Reverse text", reverse))
            .build();
        let compiler = Compiler::new(&registry);

        let template = compiler.compile("{reverse {0}}").unwrap();
        assert_eq!(template.evaluate(&["abc"].into_iter().collect()), "cba");
        assert!(compiler.compile("{lower {0}}").is_err());
    }

    #[test]
    fn test_limits_apply() {
        let compiler = Compiler::default().with_limits(ParseLimits {
            max_depth: 1,
            ..Default::default()
        });
        assert!(compiler.compile("{0}").is_ok());
        assert_eq!(
            compiler.compile("{lower {0}}").unwrap_err(),
            CompileError::NestingTooDeep { limit: 1 }
        );
    }
}
