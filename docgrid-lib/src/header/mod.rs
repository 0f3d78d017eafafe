//! Incremental column discovery
//!
//! Columns are not known up front. Every fetched document is inspected and
//! any dotted path not seen before becomes a new column. The header stays
//! sorted, so a new key may land in the middle and shift the keys after it.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use log::debug;

use crate::model::Document;
use crate::notify::Observers;

/// Collects the dotted column identifiers present in a document.
///
/// Keys holding an embedded document are expanded into sub-paths while
/// `max_nesting` allows it (0 means top-level keys only). A key that is not
/// expanded stays a single column, even if its value is a document.
///
/// # Example
///
/// ```
/// use docgrid_lib::header::discover_keys;
/// use docgrid_lib::model::Document;
///
/// let doc = Document::new()
///     .set("_id", 1)
///     .set("a", Document::new().set("b", 2).set("c", 3));
///
/// let keys: Vec<_> = discover_keys(&doc, 1).into_iter().collect();
/// assert_eq!(keys, vec!["_id", "a.b", "a.c"]);
/// ```
pub fn discover_keys(doc: &Document, max_nesting: usize) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    collect_keys(doc, max_nesting, None, &mut keys);
    keys
}

fn collect_keys(doc: &Document, depth: usize, root: Option<&str>, keys: &mut BTreeSet<String>) {
    for (key, value) in doc {
        let path = match root {
            Some(root) => format!("{}.{}", root, key),
            None => key.clone(),
        };
        match value.as_document() {
            Some(nested) if depth > 0 => collect_keys(nested, depth - 1, Some(path.as_str()), keys),
            _ => {
                keys.insert(path);
            }
        }
    }
}

/// The sorted set of column identifiers for the current query.
///
/// Starts out holding only the identifier column and grows as documents
/// reveal new paths. Columns are never removed until [`reset`](Self::reset).
#[derive(Debug, Clone)]
pub struct HeaderManager {
    columns: Vec<String>,
    id_field: String,
    max_nesting: usize,
}

impl HeaderManager {
    /// Creates a header holding only `id_field`.
    pub fn new(id_field: impl Into<String>, max_nesting: usize) -> Self {
        let id_field = id_field.into();
        Self {
            columns: vec![id_field.clone()],
            id_field,
            max_nesting,
        }
    }

    /// Returns the column identifiers found in `doc`.
    pub fn discover(&self, doc: &Document) -> BTreeSet<String> {
        discover_keys(doc, self.max_nesting)
    }

    /// Adds every identifier not yet in the header.
    ///
    /// New identifiers are inserted in sorted position. Identifiers that end
    /// up adjacent form one batch, and each batch is applied inside its own
    /// insert-columns bracket, lowest position first, so each reported range
    /// is valid against the header as it stands at that moment.
    ///
    /// Returns the inserted ranges.
    pub fn merge(
        &mut self,
        keys: impl IntoIterator<Item = String>,
        observers: &mut Observers,
    ) -> Vec<RangeInclusive<usize>> {
        let new_keys: BTreeSet<String> = keys
            .into_iter()
            .filter(|key| self.position(key).is_none())
            .collect();
        if new_keys.is_empty() {
            return Vec::new();
        }

        let batches = self.plan_batches(new_keys);
        let mut inserted = Vec::with_capacity(batches.len());
        for (first, batch) in batches {
            let last = first + batch.len() - 1;
            debug!("Inserting columns {}..={}: {:?}", first, last, batch);
            observers.insert_columns(first, last, || {
                self.columns.splice(first..first, batch);
            });
            inserted.push(first..=last);
        }
        inserted
    }

    /// Discovers the identifiers in `doc` and merges them into the header.
    pub fn update(&mut self, doc: &Document, observers: &mut Observers) -> Vec<RangeInclusive<usize>> {
        let keys = self.discover(doc);
        self.merge(keys, observers)
    }

    /// Clears the header back to the identifier column.
    pub fn reset(&mut self) {
        self.columns.clear();
        self.columns.push(self.id_field.clone());
    }

    /// Returns the column identifiers in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the identifier at `index`.
    pub fn column(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(String::as_str)
    }

    /// Returns the index of `key`, if it is a known column.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.columns.binary_search_by(|c| c.as_str().cmp(key)).ok()
    }

    /// Returns `true` if `key` is a known column.
    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the header has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the identifier column name.
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Returns the configured nesting depth.
    pub fn max_nesting(&self) -> usize {
        self.max_nesting
    }

    /// Groups sorted new keys into runs that are contiguous in the final header.
    fn plan_batches(&self, new_keys: BTreeSet<String>) -> Vec<(usize, Vec<String>)> {
        let mut batches: Vec<(usize, Vec<String>)> = Vec::new();
        let mut inserted = 0;
        for key in new_keys {
            let position = self.columns.partition_point(|c| c.as_str() < key.as_str()) + inserted;
            match batches.last_mut() {
                Some((first, batch)) if *first + batch.len() == position => batch.push(key),
                _ => batches.push((position, vec![key])),
            }
            inserted += 1;
        }
        batches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::EventLog;
    use crate::notify::ModelEvent;

    fn observed() -> (Observers, EventLog) {
        let log = EventLog::new();
        let mut observers = Observers::new();
        observers.add(Box::new(log.clone()));
        (observers, log)
    }

    fn keys(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_discover_expands_nested_documents() {
        let doc = Document::new()
            .set("_id", 1)
            .set("a", Document::new().set("b", 2).set("c", 3));
        let found: Vec<_> = discover_keys(&doc, 1).into_iter().collect();
        assert_eq!(found, keys(&["_id", "a.b", "a.c"]));
    }

    #[test]
    fn test_discover_depth_zero_keeps_flat_keys() {
        let doc = Document::new()
            .set("_id", 1)
            .set("a", Document::new().set("b", 2).set("c", 3));
        let found: Vec<_> = discover_keys(&doc, 0).into_iter().collect();
        assert_eq!(found, keys(&["_id", "a"]));
    }

    #[test]
    fn test_discover_stops_at_depth_budget() {
        let doc = Document::new().set(
            "a",
            Document::new().set("b", Document::new().set("c", 1)),
        );
        let found: Vec<_> = discover_keys(&doc, 1).into_iter().collect();
        assert_eq!(found, keys(&["a.b"]));
    }

    #[test]
    fn test_discover_empty_nested_document_contributes_nothing() {
        let doc = Document::new().set("_id", 1).set("a", Document::new());
        let found: Vec<_> = discover_keys(&doc, 2).into_iter().collect();
        assert_eq!(found, keys(&["_id"]));
    }

    #[test]
    fn test_merge_reports_sorted_positions() {
        let (mut observers, log) = observed();
        let mut header = HeaderManager::new("_id", 0);
        header.merge(keys(&["b", "a"]), &mut observers);
        assert_eq!(header.columns(), keys(&["_id", "a", "b"]).as_slice());
        log.take();

        let ranges = header.merge(keys(&["ab", "c", "A"]), &mut observers);

        assert_eq!(header.columns(), keys(&["A", "_id", "a", "ab", "b", "c"]).as_slice());
        assert_eq!(ranges, vec![0..=0, 3..=3, 5..=5]);
        assert_eq!(
            log.take(),
            vec![
                ModelEvent::BeginInsertColumns { first: 0, last: 0 },
                ModelEvent::EndInsertColumns,
                ModelEvent::BeginInsertColumns { first: 3, last: 3 },
                ModelEvent::EndInsertColumns,
                ModelEvent::BeginInsertColumns { first: 5, last: 5 },
                ModelEvent::EndInsertColumns,
            ]
        );
    }

    #[test]
    fn test_merge_groups_adjacent_keys() {
        let (mut observers, log) = observed();
        let mut header = HeaderManager::new("_id", 0);

        let ranges = header.merge(keys(&["x", "y", "z"]), &mut observers);

        assert_eq!(ranges, vec![1..=3]);
        assert_eq!(
            log.events(),
            vec![
                ModelEvent::BeginInsertColumns { first: 1, last: 3 },
                ModelEvent::EndInsertColumns,
            ]
        );
    }

    #[test]
    fn test_merge_known_keys_is_silent() {
        let (mut observers, log) = observed();
        let mut header = HeaderManager::new("_id", 0);
        header.merge(keys(&["a"]), &mut observers);
        log.take();

        let ranges = header.merge(keys(&["a", "_id", "a"]), &mut observers);

        assert!(ranges.is_empty());
        assert!(log.events().is_empty());
        assert_eq!(header.len(), 2);
    }

    #[test]
    fn test_reset_keeps_only_id_column() {
        let (mut observers, _log) = observed();
        let mut header = HeaderManager::new("_id", 0);
        header.merge(keys(&["a", "b"]), &mut observers);

        header.reset();

        assert_eq!(header.columns(), keys(&["_id"]).as_slice());
        assert_eq!(header.position("_id"), Some(0));
        assert!(!header.contains("a"));
    }
}
