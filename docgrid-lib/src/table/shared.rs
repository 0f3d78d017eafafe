//! Thread-safe handle to a table model

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use super::CellData;
use super::PresentationMode;
use super::TableModel;
use crate::error::QueryError;
use crate::store::DocumentStore;

/// A table model shared between threads.
///
/// Every model operation mutates the cache or header, so the whole model is
/// one critical section. Each method takes the lock for the duration of the
/// call, which also means no reader can see a row count from one query next
/// to a header from another.
///
/// Observers run while the lock is held. An observer holding a clone of this
/// handle must not use it from a notification; it should record the event
/// and let the caller read the model after the triggering call returns.
///
/// Clones refer to the same model.
#[derive(Debug, Clone)]
pub struct SharedTableModel {
    inner: Arc<Mutex<TableModel>>,
}

/// A consistent view of the model extents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extents {
    /// Number of rows.
    pub row_count: usize,
    /// Column identifiers, in order.
    pub columns: Vec<String>,
    /// Row structure generation these extents belong to.
    pub generation: u64,
}

impl SharedTableModel {
    /// Wraps a model for shared use.
    pub fn new(model: TableModel) -> Self {
        Self {
            inner: Arc::new(Mutex::new(model)),
        }
    }

    /// Locks the model for a sequence of operations.
    pub fn lock(&self) -> MutexGuard<'_, TableModel> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` with exclusive access to the model.
    pub fn with<R>(&self, f: impl FnOnce(&mut TableModel) -> R) -> R {
        f(&mut self.lock())
    }

    /// See [`TableModel::submit_query`].
    pub fn submit_query<S: DocumentStore + ?Sized>(
        &self,
        store: &S,
        collection: &str,
        query: &S::Query,
    ) -> Result<(), QueryError> {
        self.lock().submit_query(store, collection, query)
    }

    /// See [`TableModel::row_count`].
    pub fn row_count(&self) -> usize {
        self.lock().row_count()
    }

    /// See [`TableModel::column_count`].
    pub fn column_count(&self) -> usize {
        self.lock().column_count()
    }

    /// See [`TableModel::column_name`].
    pub fn column_name(&self, index: usize) -> Option<String> {
        self.lock().column_name(index).map(str::to_string)
    }

    /// See [`TableModel::is_empty`].
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// See [`TableModel::cell`].
    pub fn cell(&self, row: usize, column: usize, mode: PresentationMode) -> Option<CellData> {
        self.lock().cell(row, column, mode)
    }

    /// See [`TableModel::value_of`].
    pub fn value_of(&self, row: usize, key: &str, mode: PresentationMode) -> Option<CellData> {
        self.lock().value_of(row, key, mode)
    }

    /// See [`TableModel::id_of`].
    pub fn id_of(&self, row: usize) -> Option<String> {
        self.lock().id_of(row)
    }

    /// Returns row count and header taken under one lock.
    pub fn extents(&self) -> Extents {
        let model = self.lock();
        Extents {
            row_count: model.row_count(),
            columns: model.columns().to_vec(),
            generation: model.generation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::ModelConfig;
    use crate::model::Document;
    use crate::notify::EventLog;
    use crate::notify::ModelEvent;
    use crate::query::Filter;
    use crate::store::InMemoryStore;

    #[test]
    fn test_shared_across_threads() {
        let store = InMemoryStore::new();
        for id in 0..20 {
            store.insert("docs", Document::new().set("_id", id).set(format!("f{}", id % 3), id));
        }
        let model = SharedTableModel::new(TableModel::new(ModelConfig::default()).unwrap());
        model.submit_query(&store, "docs", &Filter::all()).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let model = model.clone();
                thread::spawn(move || {
                    for row in (t..20).step_by(4) {
                        assert!(model.cell(row, 0, PresentationMode::Display).is_some());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let extents = model.extents();
        assert_eq!(extents.row_count, 20);
        assert_eq!(extents.columns, vec!["_id", "f0", "f1", "f2"]);
    }

    #[test]
    fn test_observer_events_read_after_call() {
        let store = InMemoryStore::new();
        for id in 0..3 {
            store.insert("docs", Document::new().set("_id", id).set("n", id));
        }
        let log = EventLog::new();
        let mut inner = TableModel::new(ModelConfig::default()).unwrap();
        inner.add_observer(Box::new(log.clone()));
        let model = SharedTableModel::new(inner);

        model.submit_query(&store, "docs", &Filter::all()).unwrap();
        model.cell(0, 0, PresentationMode::Raw);

        // The lock is free again once the call returns, so the queued
        // events can be replayed against the model.
        for event in log.take() {
            if let ModelEvent::BeginInsertColumns { first, last } = event {
                assert!(last < model.column_count());
                assert!(model.column_name(first).is_some());
            }
        }
        assert_eq!(model.extents().columns, vec!["_id", "n"]);
    }
}
