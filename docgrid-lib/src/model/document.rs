//! Schema-less document

use std::collections::BTreeMap;
use std::collections::btree_map;

use super::Value;

/// A schema-less document fetched from the store.
///
/// Documents map string keys to [`Value`]s, which may themselves be nested
/// documents. Keys are kept in sorted order so that rendering and comparison
/// are deterministic; the store is the source of truth for content.
///
/// # Example
///
/// ```
/// use docgrid_lib::model::Document;
///
/// let doc = Document::new()
///     .set("_id", 1)
///     .set("address", Document::new().set("city", "Oslo"));
///
/// assert_eq!(doc.get_path("address.city").and_then(|v| v.as_str()), Some("Oslo"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: BTreeMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field and returns the document (builder style).
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Inserts a field, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Removes a field, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// Returns a reference to the top-level field value, if it exists.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Resolves a dotted path such as `"a.b.c"` through embedded documents.
    ///
    /// Returns `None` as soon as a segment is missing or an intermediate
    /// value is not a document.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut value = self.get(segments.next()?)?;
        for segment in segments {
            value = value.as_document()?.get(segment)?;
        }
        Some(value)
    }

    /// Returns `true` if the document contains the given top-level key.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Returns an iterator over the top-level keys, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Returns an iterator over the top-level fields, in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    /// Returns the number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
