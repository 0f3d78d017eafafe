//! Cursor adapter over a bound result set

use log::trace;

use super::DocumentStore;
use super::ResultSet;
use crate::error::FetchError;
use crate::error::QueryError;
use crate::model::Document;

/// A result set handle bound to one query submission.
///
/// This is the only component that reaches the store after a query has been
/// submitted. It reports row and store failures as [`FetchError`]s and leaves
/// recovery to the table model.
pub struct Cursor {
    handle: Box<dyn ResultSet>,
    collection: String,
}

impl Cursor {
    /// Binds a cursor to `query` and snapshots the matching document count.
    ///
    /// Both store calls happen before anything is returned, so the caller
    /// gets either a usable cursor with its count or the store's error.
    pub fn bind<S: DocumentStore + ?Sized>(
        store: &S,
        collection: &str,
        query: &S::Query,
    ) -> Result<(Self, usize), QueryError> {
        let handle = store.find(collection, query)?;
        let count = store.count(collection, query)?;
        trace!("Bound cursor on '{}' ({} documents)", collection, count);
        Ok((
            Self {
                handle,
                collection: collection.to_string(),
            },
            count,
        ))
    }

    /// Wraps an already opened result set.
    pub fn from_handle(collection: impl Into<String>, handle: Box<dyn ResultSet>) -> Self {
        Self {
            handle,
            collection: collection.into(),
        }
    }

    /// Fetches the document at `index`.
    pub fn fetch(&self, index: usize) -> Result<Document, FetchError> {
        trace!("Fetching row {} from '{}'", index, self.collection);
        self.handle.get(index)
    }

    /// Recounts the documents the bound query currently matches.
    pub fn recount(&self) -> Result<usize, FetchError> {
        self.handle.count()
    }

    /// Returns the collection this cursor reads from.
    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl std::fmt::Debug for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}
