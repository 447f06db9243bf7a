//! Cache key rules for the edge caching platform.
//!
//! This crate provides:
//! - `CacheKeyContext` - Request data available to key rules
//! - `ContextField` - Positional rule inputs (`method`, `header:NAME`, ...)
//! - `CacheKeyRule` - A compiled key template bound to its inputs
//! - `KeyRuleSet` - Named rules compiled from configuration
//! - `CacheKeyHeaders` - Debug headers explaining a derived key
//!
//! # Example
//!
//! ```ignore
//! use edge_cache::{CacheKeyContext, KeyRuleSet, RuleConfig};
//! use edge_expr::Compiler;
//!
//! let rules = KeyRuleSet::from_configs(
//!     &[RuleConfig::new("pdp", "{0}:{lower {1}}", &["path", "header:accept-language"])],
//!     &Compiler::default(),
//! )?;
//!
//! let ctx = CacheKeyContext::from_request(&request);
//! let key = rules.derive("pdp", &ctx);
//! ```

mod error;
mod headers;
mod key;
mod request;
mod rule;

pub use error::*;
pub use headers::*;
pub use key::*;
pub use request::parse_cookies;
pub use rule::*;
