//! Parsed template tree.

use std::fmt;

/// A node of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Literal text, reproduced as-is.
    Literal(String),
    /// Positional lookup into the evaluation context (`{0}`).
    ArgRef(usize),
    /// Function call (`{name arg...}`). `offset` points at the name.
    Call {
        name: String,
        args: Vec<Expr>,
        offset: usize,
    },
    /// An argument word mixing literal text and nested expressions (`v{0}`).
    Concat(Vec<Expr>),
}

impl Expr {
    /// Whether the node renders the same text for every context.
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Number of nodes in this subtree, the node itself included.
    pub fn node_count(&self) -> usize {
        match self {
            Self::Literal(_) | Self::ArgRef(_) => 1,
            Self::Call { args, .. } => 1 + args.iter().map(Expr::node_count).sum::<usize>(),
            Self::Concat(parts) => 1 + parts.iter().map(Expr::node_count).sum::<usize>(),
        }
    }

    fn fmt_arg(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) if is_bare_word(text) => f.write_str(text),
            Self::Literal(text) => write_quoted(f, text),
            Self::Concat(parts) => parts.iter().try_for_each(|p| p.fmt_arg(f)),
            other => write!(f, "{}", other),
        }
    }
}

/// Renders the node as template source.
///
/// A top-level literal is written raw unless it holds a brace, in which case
/// it becomes a quoted `{"..."}` group. Literals in argument position are
/// quoted when they would not survive as a bare word.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) if text.contains(['{', '}']) => {
                f.write_str("{")?;
                write_quoted(f, text)?;
                f.write_str("}")
            }
            Self::Literal(text) => f.write_str(text),
            Self::ArgRef(index) => write!(f, "{{{}}}", index),
            Self::Call { name, args, .. } => {
                write!(f, "{{{}", name)?;
                for arg in args {
                    f.write_str(" ")?;
                    arg.fmt_arg(f)?;
                }
                f.write_str("}")
            }
            Self::Concat(parts) => parts.iter().try_for_each(|p| p.fmt_arg(f)),
        }
    }
}

/// Render a parsed template back to source.
pub fn to_template(nodes: &[Expr]) -> String {
    nodes.iter().map(|n| n.to_string()).collect()
}

fn is_bare_word(text: &str) -> bool {
    !text.is_empty()
        && !text
            .chars()
            .any(|c| c.is_ascii_whitespace() || matches!(c, '{' | '}' | '"' | '\\'))
}

fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in text.chars() {
        if matches!(c, '"' | '\\') {
            f.write_str("\\")?;
        }
        write!(f, "{}", c)?;
    }
    f.write_str("\"")
}
