//! Document store collaborators
//!
//! The table model never talks to a store directly. It binds a [`Cursor`]
//! to whatever [`DocumentStore`] the caller hands it and fetches documents
//! by position through the resulting [`ResultSet`] handle.

mod cursor;
mod memory;

pub use cursor::*;
pub use memory::*;

use crate::error::FetchError;
use crate::error::QueryError;
use crate::model::Document;

/// An ordered, countable, randomly indexable view over query results.
///
/// Implementations must keep a single fixed sort order on the unique
/// identifier so that a position stays meaningful between calls as long as
/// no earlier document is removed.
pub trait ResultSet: Send {
    /// Returns the document at `index`.
    ///
    /// Returns [`FetchError::RowUnavailable`] if the position is beyond the
    /// current extent (for example after documents were deleted) and
    /// [`FetchError::StoreUnavailable`] on transport failures.
    fn get(&self, index: usize) -> Result<Document, FetchError>;

    /// Recounts the documents currently matched.
    fn count(&self) -> Result<usize, FetchError>;
}

/// The query interface of a document store.
///
/// The query value is opaque to the table model; it is handed through
/// unchanged from the caller.
pub trait DocumentStore {
    /// The store's query type.
    type Query;

    /// Opens a result set for `query`, sorted by the unique identifier and
    /// without an idle timeout.
    fn find(&self, collection: &str, query: &Self::Query) -> Result<Box<dyn ResultSet>, QueryError>;

    /// Counts the documents in `collection` matching `query`.
    fn count(&self, collection: &str, query: &Self::Query) -> Result<usize, QueryError>;
}
