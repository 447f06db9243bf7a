//! Recursive-descent template parser.
//!
//! A template is a run of literal text interleaved with `{...}` expressions.
//! Inside braces the content is a whitespace-separated list of items, where the
//! first item decides the kind of expression:
//!
//! - a lone non-negative integer is a context lookup (`{0}`);
//! - a lone quoted string is a literal (`{"a b"}`);
//! - a lone nested expression is that expression (`{{0}}`);
//! - anything else is a function name followed by its arguments.
//!
//! Arguments are bare words (literal text), quoted strings, nested
//! expressions, or a word gluing several of these together.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::ast::Expr;
use crate::error::CompileError;

/// Bounds applied while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseLimits {
    /// Maximum brace nesting depth.
    pub max_depth: usize,
    /// Maximum template length in bytes.
    pub max_template_len: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_depth: 32,
            max_template_len: 8 * 1024,
        }
    }
}

/// Parse a template with the default limits.
pub fn parse(template: &str) -> Result<Vec<Expr>, CompileError> {
    parse_with_limits(template, &ParseLimits::default())
}

/// Parse a template.
///
/// The result is never empty: a template without expressions (including the
/// empty template) yields a single literal node holding the whole input.
pub fn parse_with_limits(template: &str, limits: &ParseLimits) -> Result<Vec<Expr>, CompileError> {
    if template.len() > limits.max_template_len {
        return Err(CompileError::TemplateTooLong {
            len: template.len(),
            limit: limits.max_template_len,
        });
    }

    Parser {
        src: template,
        pos: 0,
        depth: 0,
        limits,
    }
    .parse_template()
}

/// One whitespace-delimited item inside braces.
struct Item {
    offset: usize,
    end: usize,
    kind: ItemKind,
}

enum ItemKind {
    /// Unquoted text with no nested expressions.
    Word(String),
    /// Anything else: quoted text, nested expression, or a mix.
    Expr(Expr),
}

impl Item {
    fn into_expr(self) -> Expr {
        match self.kind {
            ItemKind::Word(text) => Expr::Literal(text),
            ItemKind::Expr(expr) => expr,
        }
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
    limits: &'a ParseLimits,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn parse_template(mut self) -> Result<Vec<Expr>, CompileError> {
        let mut nodes = Vec::new();
        let mut literal_start = 0;

        while let Some(c) = self.peek() {
            match c {
                '{' => {
                    if literal_start < self.pos {
                        nodes.push(Expr::Literal(self.src[literal_start..self.pos].to_string()));
                    }
                    nodes.push(self.parse_braced()?);
                    literal_start = self.pos;
                }
                '}' => return Err(CompileError::UnbalancedBraces { offset: self.pos }),
                _ => {
                    self.bump();
                }
            }
        }

        if literal_start < self.src.len() || nodes.is_empty() {
            nodes.push(Expr::Literal(self.src[literal_start..].to_string()));
        }

        Ok(nodes)
    }

    /// Parse `{...}` starting at the opening brace.
    fn parse_braced(&mut self) -> Result<Expr, CompileError> {
        let open = self.pos;
        self.bump();

        self.depth += 1;
        if self.depth > self.limits.max_depth {
            return Err(CompileError::NestingTooDeep {
                limit: self.limits.max_depth,
            });
        }

        let mut items: SmallVec<[Item; 4]> = SmallVec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(CompileError::UnbalancedBraces { offset: open }),
                Some('}') => {
                    self.bump();
                    break;
                }
                Some(_) => items.push(self.parse_item()?),
            }
        }
        self.depth -= 1;

        self.build_expr(open, items)
    }

    fn build_expr(&self, open: usize, items: SmallVec<[Item; 4]>) -> Result<Expr, CompileError> {
        let mut items = items.into_iter();
        let head = items
            .next()
            .ok_or(CompileError::EmptyExpression { offset: open })?;
        let args: Vec<Expr> = items.map(Item::into_expr).collect();

        match head.kind {
            ItemKind::Word(word) if args.is_empty() && word.bytes().all(|b| b.is_ascii_digit()) => word
                .parse::<usize>()
                .map(Expr::ArgRef)
                .map_err(|_| CompileError::InvalidArgumentIndex {
                    text: word,
                    offset: head.offset,
                }),
            ItemKind::Word(name) => Ok(Expr::Call {
                name,
                args,
                offset: head.offset,
            }),
            ItemKind::Expr(expr) if args.is_empty() => Ok(expr),
            ItemKind::Expr(_) => Err(CompileError::UnknownFunction {
                name: self.src[head.offset..head.end].to_string(),
                offset: head.offset,
            }),
        }
    }

    /// Parse one item, stopping at whitespace or the closing brace.
    fn parse_item(&mut self) -> Result<Item, CompileError> {
        let offset = self.pos;
        let mut parts: SmallVec<[Expr; 2]> = SmallVec::new();
        let mut text: Option<String> = None;
        let mut bare = true;

        while let Some(c) = self.peek() {
            if c.is_ascii_whitespace() || c == '}' {
                break;
            }
            match c {
                '{' => {
                    if let Some(pending) = text.take() {
                        parts.push(Expr::Literal(pending));
                    }
                    parts.push(self.parse_braced()?);
                    bare = false;
                }
                '"' => {
                    let quoted = self.parse_quoted()?;
                    text.get_or_insert_with(String::new).push_str(&quoted);
                    bare = false;
                }
                _ => {
                    text.get_or_insert_with(String::new).push(c);
                    self.bump();
                }
            }
        }
        if let Some(pending) = text.take() {
            parts.push(Expr::Literal(pending));
        }

        let kind = match (bare, parts.len()) {
            (true, _) => match parts.pop() {
                Some(Expr::Literal(word)) => ItemKind::Word(word),
                _ => ItemKind::Word(String::new()),
            },
            (false, 1) => ItemKind::Expr(parts.remove(0)),
            (false, _) => ItemKind::Expr(Expr::Concat(parts.into_vec())),
        };

        Ok(Item {
            offset,
            end: self.pos,
            kind,
        })
    }

    /// Parse `"..."` starting at the opening quote. `\"` and `\\` are escapes.
    fn parse_quoted(&mut self) -> Result<String, CompileError> {
        let open = self.pos;
        self.bump();

        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(CompileError::UnterminatedQuote { offset: open }),
                Some('"') => return Ok(out),
                Some('\\') => match self.peek() {
                    Some(c @ ('"' | '\\')) => {
                        out.push(c);
                        self.bump();
                    }
                    _ => out.push('\\'),
                },
                Some(c) => out.push(c),
            }
        }
    }
}
