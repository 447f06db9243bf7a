//! Cache key template language for the edge caching platform.
//!
//! Operators write cache key rules as templates; each rule is compiled once at
//! registration and evaluated for every request against a positional context.
//!
//! This crate provides:
//! - `compile` / `Compiler` - Template compilation with fail-fast errors
//! - `CompiledTemplate` - Immutable stage tree, evaluated per request
//! - `KeyContext` - Ordered per-request input values
//! - `FunctionRegistry` - Builtin and custom functions with arity contracts
//! - `Sentinel` - Marker text for calls that cannot be evaluated
//!
//! # Template syntax
//!
//! Text outside braces is copied verbatim. `{0}` reads context value 0;
//! `{name arg...}` calls a function, where arguments are bare words, quoted
//! strings, or nested expressions.
//!
//! # Example
//!
//! ```
//! use edge_expr::{compile, KeyContext};
//!
//! let template = compile("{0}:{path_dir {1}}/{lower {path_base {1}}}").unwrap();
//! let ctx: KeyContext = ["GET", "/static/Logo.PNG"].into_iter().collect();
//! assert_eq!(template.evaluate(&ctx), "GET:/static/logo.png");
//!
//! // Wrong argument counts render a marker instead of failing.
//! let template = compile("{substr {0}}").unwrap();
//! assert_eq!(template.evaluate(&ctx), "<ARGN>");
//! ```

mod ast;
mod compiler;
mod context;
mod error;
mod functions;
mod parser;
mod registry;
mod sentinel;
mod stage;

pub use ast::{to_template, Expr};
pub use compiler::{compile, Compiler, Diagnostic};
pub use context::KeyContext;
pub use error::CompileError;
pub use functions::{clean_path, path_base, path_dir, path_ext};
pub use parser::{parse, parse_with_limits, ParseLimits};
pub use registry::{Args, Arity, FunctionDef, FunctionImpl, FunctionRegistry, RegistryBuilder};
pub use sentinel::Sentinel;
pub use stage::{CompiledTemplate, Stage};
