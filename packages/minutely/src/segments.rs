use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use serde::Serialize;

/// A set of dimension tags attached to a sample, as `name = value` string pairs.
///
/// Segments are a value type: two sets with the same pairs are equal, hash the same and
/// aggregate into the same statistics regardless of the order in which the pairs were added.
///
/// # Example
///
/// ```
/// use minutely::Segments;
///
/// let a = Segments::from([("endpoint", "/users"), ("method", "GET")]);
/// let b = Segments::new().with("method", "GET").with("endpoint", "/users");
///
/// assert_eq!(a, b);
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Segments {
    // Ordered storage is what makes equality and hashing independent of insertion order.
    pairs: BTreeMap<String, String>,
}

impl Segments {
    /// Creates an empty segment set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pairs: BTreeMap::new(),
        }
    }

    /// Returns the segment set with one more pair added, replacing any existing
    /// value stored under the same name.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds a pair to the set, returning the value previously stored under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.pairs.insert(name.into(), value.into())
    }

    /// The value stored under `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs.get(name).map(String::as_str)
    }

    /// Number of pairs in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the set has no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterates over the pairs in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<N, V> FromIterator<(N, V)> for Segments
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl<N, V, const LEN: usize> From<[(N, V); LEN]> for Segments
where
    N: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(N, V); LEN]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<S> From<HashMap<String, String, S>> for Segments
where
    S: BuildHasher,
{
    fn from(pairs: HashMap<String, String, S>) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<BTreeMap<String, String>> for Segments {
    fn from(pairs: BTreeMap<String, String>) -> Self {
        Self { pairs }
    }
}
