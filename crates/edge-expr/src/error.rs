//! Template compile errors.

use thiserror::Error;

/// Structural problems detected while compiling a template.
///
/// These are fatal at rule registration: a template that fails to compile is
/// never evaluated. Offsets are byte offsets into the template source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// An opening brace was never closed, or a closing brace has no opener.
    #[error("Unbalanced braces at offset {offset}")]
    UnbalancedBraces { offset: usize },

    /// The expression head names a function that is not registered.
    #[error("Unknown function `{name}` at offset {offset}")]
    UnknownFunction { name: String, offset: usize },

    /// A quoted string runs to the end of the template.
    #[error("Unterminated quote at offset {offset}")]
    UnterminatedQuote { offset: usize },

    /// `{}` with nothing but whitespace inside.
    #[error("Empty expression at offset {offset}")]
    EmptyExpression { offset: usize },

    /// A bare integer that does not fit an argument index.
    #[error("Invalid argument index `{text}` at offset {offset}")]
    InvalidArgumentIndex { text: String, offset: usize },

    /// Expressions nested deeper than the configured limit.
    #[error("Expressions nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    /// Template source longer than the configured limit.
    #[error("Template is {len} bytes, limit is {limit}")]
    TemplateTooLong { len: usize, limit: usize },
}

impl CompileError {
    /// Byte offset the error points at, if it has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::UnbalancedBraces { offset }
            | Self::UnknownFunction { offset, .. }
            | Self::UnterminatedQuote { offset }
            | Self::EmptyExpression { offset }
            | Self::InvalidArgumentIndex { offset, .. } => Some(*offset),
            Self::NestingTooDeep { .. } | Self::TemplateTooLong { .. } => None,
        }
    }
}
