//! Compiled stages and their evaluation.

use std::borrow::Cow;

use smallvec::SmallVec;

use crate::compiler::Diagnostic;
use crate::context::KeyContext;
use crate::registry::{Args, FunctionDef};
use crate::sentinel::Sentinel;

/// Executable form of an expression: a pure function from context to text.
#[derive(Debug, Clone)]
pub enum Stage {
    /// Fixed text.
    Literal(String),
    /// Context lookup, resolved at evaluation.
    ArgRef(usize),
    /// A resolved function applied to argument stages.
    Call {
        function: FunctionDef,
        args: Vec<Stage>,
    },
    /// Concatenation of parts.
    Concat(Vec<Stage>),
}

impl Stage {
    /// Render this stage against `ctx`. Never fails.
    pub fn evaluate<'a>(&'a self, ctx: &'a KeyContext) -> Cow<'a, str> {
        match self {
            Self::Literal(text) => Cow::Borrowed(text),
            Self::ArgRef(index) => Cow::Borrowed(ctx.get(*index).unwrap_or(Sentinel::ArgCount.as_str())),
            Self::Call { function, args } => {
                if !function.arity().accepts(args.len()) {
                    return Cow::Borrowed(Sentinel::ArgCount.as_str());
                }
                let values: SmallVec<[Cow<'_, str>; 4]> = args.iter().map(|a| a.evaluate(ctx)).collect();
                Cow::Owned(function.invoke(&Args::new(&values)))
            }
            Self::Concat(parts) => Cow::Owned(parts.iter().map(|p| p.evaluate(ctx)).collect()),
        }
    }

    fn max_arg_index(&self) -> Option<usize> {
        match self {
            Self::Literal(_) => None,
            Self::ArgRef(index) => Some(*index),
            Self::Call { args: parts, .. } | Self::Concat(parts) => {
                parts.iter().filter_map(Stage::max_arg_index).max()
            }
        }
    }
}

/// A compiled template: stages rendered in order and concatenated.
///
/// Immutable once built; one instance can be shared across threads and
/// evaluated concurrently.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    source: String,
    stages: Vec<Stage>,
    diagnostics: Vec<Diagnostic>,
}

impl CompiledTemplate {
    pub(crate) fn new(source: String, stages: Vec<Stage>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            source,
            stages,
            diagnostics,
        }
    }

    /// Template source this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Top-level stages in source order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Calls whose argument count is outside the declared arity.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Whether the output is the same for every context.
    pub fn is_constant(&self) -> bool {
        self.stages.iter().all(|s| matches!(s, Stage::Literal(_)))
    }

    /// Highest context index the template reads, if any.
    pub fn max_arg_index(&self) -> Option<usize> {
        self.stages.iter().filter_map(Stage::max_arg_index).max()
    }

    /// Render the key for `ctx`.
    pub fn evaluate(&self, ctx: &KeyContext) -> String {
        let mut out = String::with_capacity(self.source.len());
        self.evaluate_into(ctx, &mut out);
        out
    }

    /// Append the key for `ctx` to `out`.
    pub fn evaluate_into(&self, ctx: &KeyContext, out: &mut String) {
        for stage in &self.stages {
            out.push_str(&stage.evaluate(ctx));
        }
    }
}
