//! Per-request evaluation context.

/// Ordered text values a template reads through `{n}`.
///
/// Positions are defined by whoever builds the context, for example index 0 for
/// the method and index 1 for the path. A context is built once per request and
/// not modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyContext {
    values: Vec<String>,
}

impl KeyContext {
    /// Create a context from its values.
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    /// An empty context.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Value at `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the context holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All values in order.
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl From<Vec<String>> for KeyContext {
    fn from(values: Vec<String>) -> Self {
        Self::new(values)
    }
}

impl<S: Into<String>> FromIterator<S> for KeyContext {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}
