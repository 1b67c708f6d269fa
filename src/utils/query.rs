//! Query string merging for redirects.

use url::form_urlencoded;

/// A query parameter value: single or repeated (`k=a&k=b`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Single(String),
    Multi(Vec<String>),
}

impl QueryValue {
    fn push(&mut self, value: String) {
        match self {
            QueryValue::Single(first) => {
                let first = std::mem::take(first);
                *self = QueryValue::Multi(vec![first, value]);
            }
            QueryValue::Multi(values) => values.push(value),
        }
    }

    fn values(&self) -> impl Iterator<Item = &str> {
        let values: &[String] = match self {
            QueryValue::Single(v) => std::slice::from_ref(v),
            QueryValue::Multi(vs) => vs,
        };
        values.iter().map(String::as_str)
    }
}

/// Insertion-ordered query map.
///
/// Keys are unique; the first occurrence fixes a key's position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryMap {
    entries: Vec<(String, QueryValue)>,
}

impl QueryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Sets `key`, replacing any existing value in place.
    pub fn set(&mut self, key: impl Into<String>, value: QueryValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Adds a value for `key`, turning it into a repeated parameter if present.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => existing.push(value),
            None => self.entries.push((key, QueryValue::Single(value))),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy with a stray leading `?` stripped from every key.
    ///
    /// Parsing a query string that still carries its `?` yields a first key
    /// like `?ref`; that key must merge with `ref`.
    fn sanitized(&self) -> QueryMap {
        let mut out = QueryMap::new();
        for (key, value) in &self.entries {
            let key = key.strip_prefix('?').unwrap_or(key);
            out.set(key, value.clone());
        }
        out
    }
}

/// Parses a raw query string into a [`QueryMap`].
///
/// Accepts an optional leading `?`. Repeated keys become
/// [`QueryValue::Multi`].
pub fn parse_query(raw: &str) -> QueryMap {
    let raw = raw.strip_prefix('?').unwrap_or(raw);
    let mut map = QueryMap::new();
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        map.append(key.into_owned(), value.into_owned());
    }
    map
}

/// Merges destination and request query parameters.
///
/// Request values override destination values of the same key; the key keeps
/// its destination position. Keys only in the request are appended in request
/// order.
///
/// Returns `""` when nothing remains, otherwise `?` followed by the
/// URL-encoded pairs.
pub fn combine_queries(destination: &QueryMap, request: &QueryMap) -> String {
    let mut merged = destination.sanitized();
    for (key, value) in request.sanitized().iter() {
        merged.set(key, value.clone());
    }

    if merged.is_empty() {
        return String::new();
    }

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in merged.iter() {
        for v in value.values() {
            serializer.append_pair(key, v);
        }
    }

    format!("?{}", serializer.finish())
}
