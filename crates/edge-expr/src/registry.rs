//! Function registry.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use serde::Serialize;

use crate::functions;
use crate::sentinel::Sentinel;

/// Number of arguments a function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Arity {
    /// Minimum argument count.
    pub min: usize,
    /// Maximum argument count, `None` for unbounded.
    pub max: Option<usize>,
}

impl Arity {
    /// Exactly `n` arguments.
    pub const fn exactly(n: usize) -> Self {
        Self { min: n, max: Some(n) }
    }

    /// Between `min` and `max` arguments, inclusive.
    pub const fn between(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    /// At least `min` arguments.
    pub const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    /// Whether `count` arguments satisfy this arity.
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{}", max),
            Some(max) => write!(f, "{}..={}", self.min, max),
            None => write!(f, "{}..", self.min),
        }
    }
}

/// Evaluated arguments handed to a function implementation.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    values: &'a [Cow<'a, str>],
}

impl<'a> Args<'a> {
    /// Wrap evaluated argument values.
    pub fn new(values: &'a [Cow<'a, str>]) -> Self {
        Self { values }
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Argument text, if present.
    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.values.get(index).map(|v| v.as_ref())
    }

    /// Argument text, or `""` when absent.
    pub fn str(&self, index: usize) -> &'a str {
        self.get(index).unwrap_or_default()
    }

    /// Argument parsed as a signed integer.
    pub fn int(&self, index: usize) -> Result<i64, Sentinel> {
        self.str(index)
            .trim_matches(|c: char| c.is_ascii_whitespace())
            .parse()
            .map_err(|_| Sentinel::BadType)
    }

    /// Optional argument parsed as a signed integer.
    pub fn opt_int(&self, index: usize) -> Result<Option<i64>, Sentinel> {
        match self.get(index) {
            Some(_) => self.int(index).map(Some),
            None => Ok(None),
        }
    }
}

/// Signature of a function implementation.
///
/// Implementations run only after the argument count has been checked against
/// the declared arity.
pub type FunctionImpl = fn(&Args<'_>) -> Result<String, Sentinel>;

/// A named function with its arity contract.
#[derive(Debug, Clone, Copy)]
pub struct FunctionDef {
    name: &'static str,
    arity: Arity,
    summary: &'static str,
    imp: FunctionImpl,
}

impl FunctionDef {
    /// Define a function.
    pub const fn new(name: &'static str, arity: Arity, summary: &'static str, imp: FunctionImpl) -> Self {
        Self {
            name,
            arity,
            summary,
            imp,
        }
    }

    /// Function name as written in templates.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared arity.
    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// One-line description.
    pub fn summary(&self) -> &'static str {
        self.summary
    }

    /// Run the function. Never fails: problems render as sentinel text.
    pub fn invoke(&self, args: &Args<'_>) -> String {
        if !self.arity.accepts(args.len()) {
            return Sentinel::ArgCount.as_str().to_string();
        }
        (self.imp)(args).unwrap_or_else(|sentinel| sentinel.as_str().to_string())
    }
}

/// Read-only table of functions available to templates.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: BTreeMap<&'static str, FunctionDef>,
}

impl FunctionRegistry {
    /// The shared registry of builtin functions.
    pub fn builtin() -> &'static FunctionRegistry {
        static BUILTIN: OnceLock<FunctionRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| Self::builder().with_builtins().build())
    }

    /// Start building a custom registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Look up a function by name.
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name)
    }

    /// Whether a function is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Number of registered functions.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Registered functions, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &FunctionDef> {
        self.functions.values()
    }
}

/// Builder for a [`FunctionRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    functions: BTreeMap<&'static str, FunctionDef>,
}

impl RegistryBuilder {
    /// Add all builtin functions.
    pub fn with_builtins(mut self) -> Self {
        for def in functions::BUILTINS {
            self.functions.insert(def.name, *def);
        }
        self
    }

    /// Add a function, replacing any existing one with the same name.
    pub fn register(mut self, def: FunctionDef) -> Self {
        self.functions.insert(def.name, def);
        self
    }

    /// Freeze the registry.
    pub fn build(self) -> FunctionRegistry {
        FunctionRegistry {
            functions: self.functions,
        }
    }
}
