//! Recording observer

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use super::ModelObserver;

/// A structural notification, as recorded by [`EventLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelEvent {
    BeginReset,
    EndReset,
    BeginInsertColumns { first: usize, last: usize },
    EndInsertColumns,
    BeginRemoveRows { first: usize, last: usize },
    EndRemoveRows,
}

/// An observer that records every notification it receives.
///
/// Clones share the same log, so a clone can be attached to a model while
/// this handle is kept for inspection.
///
/// # Example
///
/// ```
/// use docgrid_lib::notify::{EventLog, ModelEvent, ModelObserver};
///
/// let log = EventLog::new();
/// let mut sink = log.clone();
/// sink.begin_reset();
/// sink.end_reset();
///
/// assert_eq!(log.take(), vec![ModelEvent::BeginReset, ModelEvent::EndReset]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<ModelEvent>>>,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    pub fn events(&self) -> Vec<ModelEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the recorded events and clears the log.
    pub fn take(&self) -> Vec<ModelEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn push(&self, event: ModelEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl ModelObserver for EventLog {
    fn begin_reset(&mut self) {
        self.push(ModelEvent::BeginReset);
    }

    fn end_reset(&mut self) {
        self.push(ModelEvent::EndReset);
    }

    fn begin_insert_columns(&mut self, first: usize, last: usize) {
        self.push(ModelEvent::BeginInsertColumns { first, last });
    }

    fn end_insert_columns(&mut self) {
        self.push(ModelEvent::EndInsertColumns);
    }

    fn begin_remove_rows(&mut self, first: usize, last: usize) {
        self.push(ModelEvent::BeginRemoveRows { first, last });
    }

    fn end_remove_rows(&mut self) {
        self.push(ModelEvent::EndRemoveRows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Observers;

    #[test]
    fn test_brackets_surround_mutation() {
        let log = EventLog::new();
        let mut observers = Observers::new();
        observers.add(Box::new(log.clone()));

        let mut columns = vec!["_id"];
        let len = observers.insert_columns(1, 1, || {
            assert_eq!(log.events(), vec![ModelEvent::BeginInsertColumns { first: 1, last: 1 }]);
            columns.push("a");
            columns.len()
        });

        assert_eq!(len, 2);
        assert_eq!(
            log.take(),
            vec![
                ModelEvent::BeginInsertColumns { first: 1, last: 1 },
                ModelEvent::EndInsertColumns,
            ]
        );
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_every_observer_is_notified() {
        let first = EventLog::new();
        let second = EventLog::new();
        let mut observers = Observers::new();
        observers.add(Box::new(first.clone()));
        observers.add(Box::new(second.clone()));

        observers.remove_rows(2, 4, || ());

        let expected = vec![
            ModelEvent::BeginRemoveRows { first: 2, last: 4 },
            ModelEvent::EndRemoveRows,
        ];
        assert_eq!(first.events(), expected);
        assert_eq!(second.events(), expected);
        assert_eq!(observers.len(), 2);
    }
}
