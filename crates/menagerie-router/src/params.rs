//! Placeholder values captured by a route match.

use smallvec::SmallVec;

/// Captured values stored inline before spilling to the heap.
const INLINE_PARAMS: usize = 4;

/// Placeholder values in pattern order.
///
/// # Example
///
/// ```rust
/// use menagerie_router::Params;
///
/// let mut params = Params::new();
/// params.push("petId", "7");
///
/// assert_eq!(params.get("petId"), Some("7"));
/// assert_eq!(params.positional(0), Some("7"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl Params {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a captured value.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the value captured by a placeholder name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the value captured at a placeholder position.
    #[must_use]
    pub fn positional(&self, index: usize) -> Option<&str> {
        self.inner.get(index).map(|(_, v)| v.as_str())
    }

    /// Returns `true` if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of captured values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterates over `(name, value)` pairs in pattern order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Iterates over values keyed by the given names, by position.
    ///
    /// Positions without a binding keep their placeholder name.
    pub fn bind<'a>(&'a self, names: &'a [String]) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.inner.iter().enumerate().map(move |(i, (n, v))| {
            let key = names.get(i).map_or(n.as_str(), String::as_str);
            (key, v.as_str())
        })
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let params = Params::new();
        assert!(params.is_empty());
        assert_eq!(params.positional(0), None);
    }

    #[test]
    fn test_lookup_by_name_and_position() {
        let mut params = Params::new();
        params.push("orgId", "acme");
        params.push("petId", "7");

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("orgId"), Some("acme"));
        assert_eq!(params.positional(1), Some("7"));
        assert_eq!(params.get("nope"), None);
    }

    #[test]
    fn test_bind_renames_by_position() {
        let params: Params = vec![
            ("orgId".to_string(), "acme".to_string()),
            ("petId".to_string(), "7".to_string()),
        ]
        .into_iter()
        .collect();

        let names = vec!["org_id".to_string()];
        let bound: Vec<_> = params.bind(&names).collect();
        assert_eq!(bound, vec![("org_id", "acme"), ("petId", "7")]);
    }
}
