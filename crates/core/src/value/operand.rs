//! Bindings supplied by callers

use std::collections::BTreeMap;

/// A symbol binding: either a bare number or a caller value.
///
/// Numeric literals and catalog defaults are always [`Operand::Scalar`];
/// combining a scalar with a value yields a value of the caller's type.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand<V> {
    Scalar(f64),
    Value(V),
}

impl<V> Operand<V> {
    /// Borrow the value, keeping scalars by copy.
    pub fn as_ref(&self) -> Operand<&V> {
        match self {
            Self::Scalar(s) => Operand::Scalar(*s),
            Self::Value(v) => Operand::Value(v),
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }
}

impl<V> From<V> for Operand<V> {
    fn from(value: V) -> Self {
        Self::Value(value)
    }
}

/// Named parameters for a computation.
///
/// The same type carries both the parameter map and the keyword overrides of
/// a call; overrides win when both name the same symbol.
///
/// ```ignore
/// let params = Params::new()
///     .value("N", nir)
///     .value("R", red)
///     .scalar("L", 0.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Params<V> {
    entries: BTreeMap<String, Operand<V>>,
}

impl<V> Params<V> {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Bind `name` to a caller value.
    pub fn value(mut self, name: impl Into<String>, value: V) -> Self {
        self.entries.insert(name.into(), Operand::Value(value));
        self
    }

    /// Bind `name` to a bare number.
    pub fn scalar(mut self, name: impl Into<String>, value: f64) -> Self {
        self.entries.insert(name.into(), Operand::Scalar(value));
        self
    }

    /// Insert or replace a binding, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, operand: Operand<V>) -> Option<Operand<V>> {
        self.entries.insert(name.into(), operand)
    }

    pub fn get(&self, name: &str) -> Option<&Operand<V>> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Operand<V>> {
        self.entries.remove(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bound names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Operand<V>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<V> Default for Params<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for Params<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), Operand::Value(v)))
                .collect(),
        }
    }
}

impl<K: Into<String>, V, const N: usize> From<[(K, V); N]> for Params<V> {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<V> Extend<(String, Operand<V>)> for Params<V> {
    fn extend<I: IntoIterator<Item = (String, Operand<V>)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}
