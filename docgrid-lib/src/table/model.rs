//! Lazily materialized table over a document query

use std::sync::Arc;

use log::debug;
use log::info;
use log::warn;

use super::CellData;
use super::HeaderData;
use super::Orientation;
use super::PresentationMode;
use crate::cache::CacheStats;
use crate::cache::RowCache;
use crate::config::ModelConfig;
use crate::error::CellError;
use crate::error::ConfigError;
use crate::error::FetchError;
use crate::error::QueryError;
use crate::header::HeaderManager;
use crate::model::Document;
use crate::notify::ModelObserver;
use crate::notify::Observers;
use crate::store::Cursor;
use crate::store::DocumentStore;

/// Which column a lookup addresses.
enum ColumnRef<'a> {
    Index(usize),
    Key(&'a str),
}

/// A tabular, randomly indexable view over a document query.
///
/// Rows are documents in identifier order; columns are the dotted field
/// paths discovered so far. Documents are fetched only when a cell of their
/// row is requested and are kept in a bounded per-model cache.
///
/// Reading a cell can grow the header, since the fetched document may expose
/// paths not seen before. It can also shrink the row count: when a row turns
/// out to be gone from the store, the model recounts, announces the removed
/// tail rows and drops its cache.
///
/// # Example
///
/// ```
/// use docgrid_lib::model::Document;
/// use docgrid_lib::query::Filter;
/// use docgrid_lib::store::InMemoryStore;
/// use docgrid_lib::table::{PresentationMode, TableModel};
/// use docgrid_lib::ModelConfig;
///
/// let store = InMemoryStore::new();
/// store.insert("people", Document::new().set("_id", 1).set("name", "Ada"));
///
/// let mut model = TableModel::new(ModelConfig::default()).unwrap();
/// model.submit_query(&store, "people", &Filter::all()).unwrap();
///
/// assert_eq!(model.row_count(), 1);
/// let name = model.value_of(0, "name", PresentationMode::Display);
/// assert_eq!(name.and_then(|c| c.as_text().map(str::to_string)).as_deref(), Some("Ada"));
/// assert_eq!(model.columns(), ["_id", "name"]);
/// ```
#[derive(Debug)]
pub struct TableModel {
    config: ModelConfig,
    cursor: Option<Cursor>,
    row_count: usize,
    cache: RowCache,
    header: HeaderManager,
    observers: Observers,
    generation: u64,
}

impl TableModel {
    /// Creates an empty model with no query bound.
    pub fn new(config: ModelConfig) -> Result<Self, ConfigError> {
        let capacity = config.validate()?;
        Ok(Self {
            cache: RowCache::new(capacity),
            header: HeaderManager::new(config.id_field.clone(), config.max_nesting),
            config,
            cursor: None,
            row_count: 0,
            observers: Observers::new(),
            generation: 0,
        })
    }

    /// Returns the model configuration.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Attaches a structural change observer.
    pub fn add_observer(&mut self, observer: Box<dyn ModelObserver>) {
        self.observers.add(observer);
    }

    // =========================================================================
    // Query binding
    // =========================================================================

    /// Binds the model to a new query.
    ///
    /// The store is queried first; if that fails the error is returned and
    /// the model is left exactly as it was. Otherwise the cursor, row count,
    /// cache and header are all replaced inside a single reset bracket.
    pub fn submit_query<S: DocumentStore + ?Sized>(
        &mut self,
        store: &S,
        collection: &str,
        query: &S::Query,
    ) -> Result<(), QueryError> {
        let (cursor, count) = Cursor::bind(store, collection, query)?;
        debug!("Submitting query on '{}': {} documents", collection, count);
        self.replace_cursor(cursor, count);
        Ok(())
    }

    /// Binds the model to an already opened cursor with a known count.
    pub fn bind_cursor(&mut self, cursor: Cursor, count: usize) {
        debug!("Binding cursor on '{}': {} documents", cursor.collection(), count);
        self.replace_cursor(cursor, count);
    }

    fn replace_cursor(&mut self, cursor: Cursor, count: usize) {
        let Self {
            observers,
            cursor: current,
            row_count,
            cache,
            header,
            generation,
            ..
        } = self;
        observers.reset(|| {
            *current = Some(cursor);
            *row_count = count;
            cache.invalidate_all();
            header.reset();
            *generation += 1;
        });
    }

    // =========================================================================
    // Extents
    // =========================================================================

    /// Returns the number of rows as of the last query or reconciliation.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns the number of known columns.
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Returns `true` if the query matched no documents.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Returns the column identifier at `index`.
    pub fn column_name(&self, index: usize) -> Option<&str> {
        self.header.column(index)
    }

    /// Returns the index of a column identifier.
    pub fn column_index(&self, key: &str) -> Option<usize> {
        self.header.position(key)
    }

    /// Returns all known column identifiers, in order.
    pub fn columns(&self) -> &[String] {
        self.header.columns()
    }

    /// Returns the header label for a section.
    ///
    /// Horizontal sections are column identifiers. Vertical sections are
    /// one-based row numbers, independent of any data.
    pub fn header_data(&self, section: usize, orientation: Orientation) -> Option<HeaderData> {
        match orientation {
            Orientation::Horizontal => self
                .column_name(section)
                .map(|name| HeaderData::Column(name.to_string())),
            Orientation::Vertical => Some(HeaderData::Row(section + 1)),
        }
    }

    /// Returns a counter that changes whenever rows are reset or removed.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // =========================================================================
    // Cell access
    // =========================================================================

    /// Returns the cell at (`row`, `column`), or `None` if it has no value.
    ///
    /// May grow the header as a side effect.
    pub fn cell(&mut self, row: usize, column: usize, mode: PresentationMode) -> Option<CellData> {
        self.try_cell(row, column, mode).ok()
    }

    /// Like [`cell`](Self::cell), but reports why a cell has no value.
    pub fn try_cell(&mut self, row: usize, column: usize, mode: PresentationMode) -> Result<CellData, CellError> {
        self.lookup(row, ColumnRef::Index(column), mode)
    }

    /// Returns the value of a column identifier in `row`.
    pub fn value_of(&mut self, row: usize, key: &str, mode: PresentationMode) -> Option<CellData> {
        self.try_value_of(row, key, mode).ok()
    }

    /// Like [`value_of`](Self::value_of), but reports why there is no value.
    pub fn try_value_of(&mut self, row: usize, key: &str, mode: PresentationMode) -> Result<CellData, CellError> {
        if !self.header.contains(key) {
            return Err(CellError::UnknownColumn(key.to_string()));
        }
        self.lookup(row, ColumnRef::Key(key), mode)
    }

    /// Returns the identifier of the document at `row` as a string.
    pub fn id_of(&mut self, row: usize) -> Option<String> {
        let id_field = self.config.id_field.clone();
        self.value_of(row, &id_field, PresentationMode::Display)
            .map(CellData::into_string)
    }

    /// Returns the document at `row`, fetching it if it is not cached.
    ///
    /// Does not touch the header.
    pub fn document_at(&mut self, row: usize) -> Option<Arc<Document>> {
        self.fetch_row(row).ok()
    }

    /// Returns row cache usage counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Returns the number of rows currently cached.
    pub fn cached_rows(&self) -> usize {
        self.cache.len()
    }

    /// Drops every cached document.
    pub fn invalidate_cache(&mut self) {
        self.cache.invalidate_all();
    }

    fn lookup(&mut self, row: usize, column: ColumnRef<'_>, mode: PresentationMode) -> Result<CellData, CellError> {
        let doc = self.fetch_row(row)?;
        self.header.update(&doc, &mut self.observers);

        // Resolve after the update so the index refers to the current header.
        let key = match column {
            ColumnRef::Index(index) => self
                .header
                .column(index)
                .ok_or_else(|| CellError::UnknownColumn(index.to_string()))?,
            ColumnRef::Key(key) => key,
        };
        let value = doc
            .get_path(key)
            .ok_or_else(|| CellError::PathUnresolved(key.to_string()))?;
        Ok(CellData::render(value, mode, &self.config.json))
    }

    fn fetch_row(&mut self, row: usize) -> Result<Arc<Document>, CellError> {
        if row >= self.row_count {
            return Err(CellError::RowOutOfRange {
                row,
                row_count: self.row_count,
            });
        }
        if let Some(entry) = self.cache.lookup(row) {
            return entry.ok_or(CellError::RowUnavailable(row));
        }
        let Some(cursor) = &self.cursor else {
            return Err(CellError::RowUnavailable(row));
        };

        match cursor.fetch(row) {
            Ok(doc) => {
                let doc = Arc::new(doc);
                self.cache.store(row, Some(Arc::clone(&doc)));
                Ok(doc)
            }
            Err(FetchError::RowUnavailable { .. }) => Err(self.reconcile(row)),
            Err(FetchError::StoreUnavailable(message)) => {
                warn!("Fetching row {} failed: {}", row, message);
                Err(CellError::StoreUnavailable(message))
            }
        }
    }

    /// Brings the row count back in line after `row` vanished from the store.
    ///
    /// Positions shift down when earlier documents are deleted, so the rows
    /// that disappear from the view are always the tail. Every cached row
    /// after the first deletion is stale, so the whole cache goes.
    ///
    /// If the recount itself fails nothing is remembered for `row`, so the
    /// next access fetches and reconciles again. Returns the error to report
    /// for the access.
    fn reconcile(&mut self, row: usize) -> CellError {
        let Some(cursor) = &self.cursor else {
            return CellError::RowUnavailable(row);
        };
        let count = match cursor.recount() {
            Ok(count) => count,
            Err(err) => {
                warn!("Recount after missing row {} failed: {}", row, err);
                self.cache.invalidate_all();
                return match err {
                    FetchError::StoreUnavailable(message) => CellError::StoreUnavailable(message),
                    FetchError::RowUnavailable { .. } => CellError::RowUnavailable(row),
                };
            }
        };

        if count < self.row_count {
            let previous = self.row_count;
            info!(
                "Row {} unavailable: result set shrank from {} to {} rows",
                row, previous, count
            );
            let Self {
                observers, row_count, ..
            } = self;
            observers.remove_rows(count, previous - 1, || *row_count = count);
            self.generation += 1;
        }

        self.cache.invalidate_all();
        self.cache.store(row, None);
        CellError::RowUnavailable(row)
    }
}
