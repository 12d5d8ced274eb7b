//! Parameters captured from, or substituted into, a path.

/// Ordered parameters captured while matching a request path.
///
/// Every placeholder contributes exactly one entry, in the order the
/// placeholders appear in the pattern. Entries are addressable by
/// position or by placeholder name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    /// Creates empty params.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a captured value.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// First value captured under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value captured at `index`.
    pub fn nth(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|(_, v)| v.as_str())
    }

    /// Whether a value was captured under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == name)
    }

    /// Parses a parameter as a specific type.
    pub fn parse<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.get(name).and_then(|v| v.parse().ok())
    }

    /// Captured values in order.
    pub fn values(&self) -> Vec<&str> {
        self.entries.iter().map(|(_, v)| v.as_str()).collect()
    }

    /// Returns an iterator over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Values used to fill placeholders when generating a path.
///
/// Named values are consumed by placeholders carrying that name, one value
/// per occurrence, left to right. Placeholders with no named value left
/// take the next positional value.
#[derive(Debug, Clone, Default)]
pub struct UrlParams {
    named: Vec<(String, Vec<String>)>,
    positional: Vec<String>,
}

impl UrlParams {
    /// Creates empty params.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named value. Repeating a name queues values for repeated
    /// placeholders of that name.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        let name = name.into();
        let value = value.to_string();
        match self.named.iter_mut().find(|(k, _)| *k == name) {
            Some((_, values)) => values.push(value),
            None => self.named.push((name, vec![value])),
        }
        self
    }

    /// Adds several values for the same name.
    #[must_use]
    pub fn with_all<I, V>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        values
            .into_iter()
            .fold(self, |params, value| params.with(name, value))
    }

    /// Adds a positional value.
    #[must_use]
    pub fn push(mut self, value: impl ToString) -> Self {
        self.positional.push(value.to_string());
        self
    }

    pub(crate) fn cursor(&self) -> UrlParamsCursor<'_> {
        UrlParamsCursor {
            params: self,
            named_used: vec![0; self.named.len()],
            positional_used: 0,
        }
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for UrlParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |params, (k, v)| params.with(k, v))
    }
}

/// Consumption state while substituting values into a pattern.
pub(crate) struct UrlParamsCursor<'a> {
    params: &'a UrlParams,
    named_used: Vec<usize>,
    positional_used: usize,
}

impl<'a> UrlParamsCursor<'a> {
    /// Takes the next value for a placeholder known by any of `names`.
    pub(crate) fn take(&mut self, names: &[&str]) -> Option<&'a str> {
        let params = self.params;
        for (i, (key, values)) in params.named.iter().enumerate() {
            if names.contains(&key.as_str()) {
                if let Some(value) = values.get(self.named_used[i]) {
                    self.named_used[i] += 1;
                    return Some(value);
                }
            }
        }
        let value = params.positional.get(self.positional_used)?;
        self.positional_used += 1;
        Some(value)
    }
}
