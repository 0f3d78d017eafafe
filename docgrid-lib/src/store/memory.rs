//! In-memory document store

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;

use log::debug;

use super::DocumentStore;
use super::ResultSet;
use crate::error::FetchError;
use crate::error::QueryError;
use crate::model::Document;
use crate::model::Value;
use crate::query::Filter;

/// An in-memory document store.
///
/// Collections are kept sorted by the identifier field. Handles returned by
/// [`find`](DocumentStore::find) are live: every fetch re-evaluates the
/// filter against the current collection, so documents deleted through a
/// clone of the store shift later positions down exactly like a remote
/// cursor would.
///
/// Clones share the same data.
///
/// # Example
///
/// ```
/// use docgrid_lib::model::Document;
/// use docgrid_lib::query::Filter;
/// use docgrid_lib::store::{DocumentStore, InMemoryStore};
///
/// let store = InMemoryStore::new();
/// store.insert("people", Document::new().set("_id", 1).set("name", "Ada"));
///
/// assert_eq!(store.count("people", &Filter::all()).unwrap(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
    id_field: Arc<str>,
}

#[derive(Debug)]
struct StoreState {
    collections: HashMap<String, Vec<Document>>,
    online: bool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Creates a new empty store ordering documents by `_id`.
    pub fn new() -> Self {
        Self::with_id_field("_id")
    }

    /// Creates a new empty store ordering documents by the given field.
    pub fn with_id_field(id_field: &str) -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState {
                collections: HashMap::new(),
                online: true,
            })),
            id_field: Arc::from(id_field),
        }
    }

    /// Inserts a document, keeping the collection ordered by identifier.
    pub fn insert(&self, collection: &str, doc: Document) {
        let mut state = self.write();
        let docs = state.collections.entry(collection.to_string()).or_default();
        let id = id_of(&doc, &self.id_field);
        let pos = docs.partition_point(|d| id_of(d, &self.id_field).compare(&id).is_le());
        docs.insert(pos, doc);
    }

    /// Inserts several documents.
    pub fn insert_many(&self, collection: &str, docs: impl IntoIterator<Item = Document>) {
        for doc in docs {
            self.insert(collection, doc);
        }
    }

    /// Deletes every document matching `filter`, returning how many went.
    pub fn delete_where(&self, collection: &str, filter: &Filter) -> usize {
        let mut state = self.write();
        let Some(docs) = state.collections.get_mut(collection) else {
            return 0;
        };
        let before = docs.len();
        docs.retain(|doc| !filter.matches(doc));
        let removed = before - docs.len();
        debug!("Deleted {} documents from '{}'", removed, collection);
        removed
    }

    /// Returns the number of documents in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.read().collections.get(collection).map_or(0, Vec::len)
    }

    /// Returns `true` if the collection holds no documents.
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Simulates losing (or regaining) the connection to the store.
    ///
    /// While offline every query and fetch fails as unavailable.
    pub fn set_online(&self, online: bool) {
        self.write().online = online;
    }

    /// Returns `true` if the store is reachable.
    pub fn is_online(&self) -> bool {
        self.read().online
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn matching(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, FetchError> {
        let state = self.read();
        if !state.online {
            return Err(FetchError::store_unavailable("store is offline"));
        }
        Ok(state
            .collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }
}

impl DocumentStore for InMemoryStore {
    type Query = Filter;

    fn find(&self, collection: &str, query: &Filter) -> Result<Box<dyn ResultSet>, QueryError> {
        if collection.is_empty() {
            return Err(QueryError::invalid("collection name is empty"));
        }
        if !self.is_online() {
            return Err(QueryError::unavailable("store is offline"));
        }
        Ok(Box::new(MemoryResultSet {
            store: self.clone(),
            collection: collection.to_string(),
            filter: query.clone(),
        }))
    }

    fn count(&self, collection: &str, query: &Filter) -> Result<usize, QueryError> {
        if collection.is_empty() {
            return Err(QueryError::invalid("collection name is empty"));
        }
        self.matching(collection, query)
            .map(|docs| docs.len())
            .map_err(|e| QueryError::unavailable(e.to_string()))
    }
}

/// Live result set over an [`InMemoryStore`] collection.
#[derive(Debug)]
struct MemoryResultSet {
    store: InMemoryStore,
    collection: String,
    filter: Filter,
}

impl ResultSet for MemoryResultSet {
    fn get(&self, index: usize) -> Result<Document, FetchError> {
        let state = self.store.read();
        if !state.online {
            return Err(FetchError::store_unavailable("store is offline"));
        }
        state
            .collections
            .get(&self.collection)
            .and_then(|docs| docs.iter().filter(|d| self.filter.matches(d)).nth(index))
            .cloned()
            .ok_or(FetchError::row_unavailable(index))
    }

    fn count(&self) -> Result<usize, FetchError> {
        self.store
            .matching(&self.collection, &self.filter)
            .map(|docs| docs.len())
    }
}

fn id_of(doc: &Document, id_field: &str) -> Value {
    doc.get(id_field).cloned().unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        for id in [3, 1, 2] {
            store.insert("docs", Document::new().set("_id", id).set("n", id * 10));
        }
        store
    }

    #[test]
    fn test_documents_ordered_by_id() {
        let store = seeded();
        let rs = store.find("docs", &Filter::all()).unwrap();
        let ids: Vec<_> = (0..3).map(|i| rs.get(i).unwrap().get("_id").cloned()).collect();
        assert_eq!(ids, vec![Some(Value::Int(1)), Some(Value::Int(2)), Some(Value::Int(3))]);
    }

    #[test]
    fn test_result_set_sees_deletions() {
        let store = seeded();
        let rs = store.find("docs", &Filter::all()).unwrap();
        assert_eq!(rs.count().unwrap(), 3);

        assert_eq!(store.delete_where("docs", &Filter::eq("_id", 2)), 1);

        assert_eq!(rs.count().unwrap(), 2);
        assert_eq!(rs.get(1).unwrap().get("_id"), Some(&Value::Int(3)));
        assert_eq!(rs.get(2), Err(FetchError::row_unavailable(2)));
    }

    #[test]
    fn test_filtered_count() {
        let store = seeded();
        assert_eq!(store.count("docs", &Filter::gt("n", 15)).unwrap(), 2);
        assert_eq!(store.count("missing", &Filter::all()).unwrap(), 0);
    }

    #[test]
    fn test_offline_store() {
        let store = seeded();
        let rs = store.find("docs", &Filter::all()).unwrap();
        store.set_online(false);

        assert!(matches!(rs.get(0), Err(FetchError::StoreUnavailable(_))));
        assert!(store.find("docs", &Filter::all()).is_err());
        assert!(store.count("docs", &Filter::all()).unwrap_err().is_retryable());
    }

    #[test]
    fn test_empty_collection_name_is_invalid() {
        let store = seeded();
        assert!(matches!(
            store.find("", &Filter::all()),
            Err(QueryError::Invalid(_))
        ));
    }
}
