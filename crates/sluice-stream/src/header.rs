use serde::{Deserialize, Serialize};

/// An HTTP header as a name-value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An ordered collection of HTTP headers.
///
/// Preserves insertion order and supports duplicate header names
/// (e.g., multiple `Set-Cookie` headers). Lookups are
/// case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMap {
    entries: Vec<Header>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push(Header::new(name, value));
    }

    /// Get the first header value matching `name` (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Get all header values matching `name` (case-insensitive).
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
            .collect()
    }

    /// Collapse duplicate names into a single entry whose value is the
    /// duplicates joined by `", "`, preserving first-occurrence order.
    ///
    /// Response heads expose their headers in this joined form so the
    /// script layer sees one value per name.
    pub fn joined(&self) -> HeaderMap {
        let mut out = HeaderMap::new();
        for h in &self.entries {
            match out
                .entries
                .iter_mut()
                .find(|o| o.name.eq_ignore_ascii_case(&h.name))
            {
                Some(existing) => {
                    existing.value.push_str(", ");
                    existing.value.push_str(&h.value);
                }
                None => out.entries.push(h.clone()),
            }
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Header> {
        self.entries
    }
}

impl FromIterator<Header> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = Header>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl FromIterator<(String, String)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(n, v)| Header::new(n, v)).collect(),
        }
    }
}
