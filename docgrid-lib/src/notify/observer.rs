//! Observer trait and bracketing dispatcher

/// Receives structural change notifications from a table model.
///
/// All methods default to doing nothing, so implementors only override what
/// they care about. A `begin_*` call is always followed by the matching
/// `end_*` call once the model has applied the change.
///
/// Notifications are delivered from inside the model call that caused them.
/// An observer must not call back into the model: behind a
/// [`SharedTableModel`](crate::table::SharedTableModel) the lock is still held
/// and a second lock on the same thread deadlocks. Queue the events (as
/// [`EventLog`](super::EventLog) does) and read the model once the call has
/// returned.
pub trait ModelObserver: Send {
    /// The whole model is about to be replaced.
    fn begin_reset(&mut self) {}

    /// The model has been replaced; every previous index is invalid.
    fn end_reset(&mut self) {}

    /// Columns `first..=last` are about to be inserted.
    fn begin_insert_columns(&mut self, _first: usize, _last: usize) {}

    /// The announced columns have been inserted.
    fn end_insert_columns(&mut self) {}

    /// Rows `first..=last` are about to be removed.
    fn begin_remove_rows(&mut self, _first: usize, _last: usize) {}

    /// The announced rows have been removed.
    fn end_remove_rows(&mut self) {}
}

/// The observers attached to one model.
///
/// Each bracketing method runs `mutate` between the begin and end
/// notifications and hands back its result.
#[derive(Default)]
pub struct Observers {
    sinks: Vec<Box<dyn ModelObserver>>,
}

impl Observers {
    /// Creates an empty observer list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches an observer.
    pub fn add(&mut self, observer: Box<dyn ModelObserver>) {
        self.sinks.push(observer);
    }

    /// Returns the number of attached observers.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Returns `true` if no observer is attached.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Brackets a full model reset.
    pub fn reset<R>(&mut self, mutate: impl FnOnce() -> R) -> R {
        self.sinks.iter_mut().for_each(|s| s.begin_reset());
        let result = mutate();
        self.sinks.iter_mut().for_each(|s| s.end_reset());
        result
    }

    /// Brackets the insertion of columns `first..=last`.
    pub fn insert_columns<R>(&mut self, first: usize, last: usize, mutate: impl FnOnce() -> R) -> R {
        self.sinks
            .iter_mut()
            .for_each(|s| s.begin_insert_columns(first, last));
        let result = mutate();
        self.sinks.iter_mut().for_each(|s| s.end_insert_columns());
        result
    }

    /// Brackets the removal of rows `first..=last`.
    pub fn remove_rows<R>(&mut self, first: usize, last: usize, mutate: impl FnOnce() -> R) -> R {
        self.sinks
            .iter_mut()
            .for_each(|s| s.begin_remove_rows(first, last));
        let result = mutate();
        self.sinks.iter_mut().for_each(|s| s.end_remove_rows());
        result
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.sinks.len())
            .finish()
    }
}
