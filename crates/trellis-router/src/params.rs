//! Path parameter storage.
//!
//! Names and values live in two index-aligned small vectors so that a
//! request with a handful of parameters never touches the heap for the
//! bookkeeping itself. Names are shared with the trie leaf that declared
//! them.

use smallvec::SmallVec;
use std::sync::Arc;

/// Number of parameters stored inline before spilling to the heap.
pub const INLINE_PARAMS: usize = 4;

/// Parameters bound by a route match.
///
/// Lookups scan linearly; the first name wins when a pattern declares the
/// same name twice.
///
/// # Example
///
/// ```rust
/// use trellis_router::Params;
///
/// let mut params = Params::new();
/// params.push("id", "123");
/// params.set("action", "view");
/// params.set("id", "456");
///
/// assert_eq!(params.get("id"), Some("456"));
/// assert_eq!(params.get("action"), Some("view"));
/// assert_eq!(params.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    names: SmallVec<[Arc<str>; INLINE_PARAMS]>,
    values: SmallVec<[String; INLINE_PARAMS]>,
}

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty parameter set able to hold `capacity` pairs.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            names: SmallVec::with_capacity(capacity),
            values: SmallVec::with_capacity(capacity),
        }
    }

    /// Appends a pair without checking for an existing name.
    pub fn push(&mut self, name: impl Into<Arc<str>>, value: impl Into<String>) {
        self.names.push(name.into());
        self.values.push(value.into());
    }

    /// Overwrites the first pair named `name`, or appends a new one.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        match self.position(name) {
            Some(i) => self.values[i] = value.into(),
            None => self.push(name, value),
        }
    }

    /// Returns the value of the first pair named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.values[i].as_str())
    }

    /// Returns the parameter names in binding order.
    #[must_use]
    pub fn names(&self) -> &[Arc<str>] {
        &self.names
    }

    /// Returns the parameter values in binding order.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Returns true if no parameters are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the number of bound parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Iterates over `(name, value)` pairs in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names
            .iter()
            .zip(self.values.iter())
            .map(|(n, v)| (n.as_ref(), v.as_str()))
    }

    /// Removes every pair, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.names.clear();
        self.values.clear();
    }

    /// Replaces the contents with `names` zipped against `values`.
    pub(crate) fn fill(&mut self, names: &[Arc<str>], values: &[&str]) {
        self.clear();
        for (name, value) in names.iter().zip(values) {
            self.names.push(Arc::clone(name));
            self.values.push((*value).to_string());
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n.as_ref() == name)
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Params {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.push(name, value);
        }
        params
    }
}
