//! Sorting proxy over a table model

use std::cmp::Ordering;
use std::sync::Arc;

use log::debug;

use super::RowFilter;
use super::SortOrder;
use crate::error::CellError;
use crate::error::QueryError;
use crate::model::Document;
use crate::model::Value;
use crate::notify::ModelObserver;
use crate::store::DocumentStore;
use crate::table::CellData;
use crate::table::HeaderData;
use crate::table::Orientation;
use crate::table::PresentationMode;
use crate::table::TableModel;

/// Presents the rows of a [`TableModel`] sorted and filtered.
///
/// Header queries go straight to the source: column identifiers and row
/// numbers are the same whatever the sort order. Row-addressed calls map the
/// proxy row to its source row and forward.
///
/// The sort is keyed on a column *identifier*, captured when
/// [`sort`](Self::sort) is called, so columns discovered later cannot
/// retarget it. The row mapping is built lazily and rebuilt whenever the
/// source's row structure changes. Building it reads every source row.
#[derive(Debug)]
pub struct SortFilterProxy {
    source: TableModel,
    sort: Option<(String, SortOrder)>,
    filter: Option<RowFilter>,
    mapping: Option<Vec<usize>>,
    mapped_generation: Option<u64>,
}

impl SortFilterProxy {
    /// Wraps a source model, initially unsorted and unfiltered.
    pub fn new(source: TableModel) -> Self {
        Self {
            source,
            sort: None,
            filter: None,
            mapping: None,
            mapped_generation: None,
        }
    }

    /// Returns the source model.
    pub fn source(&self) -> &TableModel {
        &self.source
    }

    /// Returns the source model mutably.
    pub fn source_mut(&mut self) -> &mut TableModel {
        &mut self.source
    }

    /// Unwraps the source model.
    pub fn into_source(self) -> TableModel {
        self.source
    }

    // =========================================================================
    // Sorting and filtering
    // =========================================================================

    /// Sorts by the column currently at `column`.
    ///
    /// An out-of-range column clears the sort.
    pub fn sort(&mut self, column: usize, order: SortOrder) {
        match self.source.column_name(column).map(str::to_string) {
            Some(key) => self.sort_by_key(key, order),
            None => self.clear_sort(),
        }
    }

    /// Sorts by a column identifier.
    pub fn sort_by_key(&mut self, key: impl Into<String>, order: SortOrder) {
        let key = key.into();
        debug!("Sorting by '{}' {:?}", key, order);
        self.sort = Some((key, order));
        self.invalidate();
    }

    /// Restores source order.
    pub fn clear_sort(&mut self) {
        self.sort = None;
        self.invalidate();
    }

    /// Returns the identifier and order of the active sort.
    pub fn sort_key(&self) -> Option<(&str, SortOrder)> {
        self.sort.as_ref().map(|(key, order)| (key.as_str(), *order))
    }

    /// Returns the current index of the sort column.
    pub fn sort_column(&self) -> Option<usize> {
        let (key, _) = self.sort.as_ref()?;
        self.source.column_index(key)
    }

    /// Hides rows the filter does not accept.
    pub fn set_filter(&mut self, filter: RowFilter) {
        self.filter = Some(filter);
        self.invalidate();
    }

    /// Shows all rows again.
    pub fn clear_filter(&mut self) {
        self.filter = None;
        self.invalidate();
    }

    /// Returns the active filter.
    pub fn filter(&self) -> Option<&RowFilter> {
        self.filter.as_ref()
    }

    /// Forces the row mapping to be rebuilt on next access.
    pub fn invalidate(&mut self) {
        self.mapped_generation = None;
    }

    // =========================================================================
    // Row mapping
    // =========================================================================

    /// Returns the source row shown at proxy `row`.
    pub fn map_to_source(&mut self, row: usize) -> Option<usize> {
        self.ensure_mapping();
        match &self.mapping {
            Some(mapping) => mapping.get(row).copied(),
            None => (row < self.source.row_count()).then_some(row),
        }
    }

    /// Returns the proxy row showing source `row`, if it is visible.
    pub fn map_from_source(&mut self, row: usize) -> Option<usize> {
        self.ensure_mapping();
        match &self.mapping {
            Some(mapping) => mapping.iter().position(|&r| r == row),
            None => (row < self.source.row_count()).then_some(row),
        }
    }

    fn ensure_mapping(&mut self) {
        let generation = self.source.generation();
        if self.mapped_generation == Some(generation) {
            return;
        }
        self.mapping = self.build_mapping();
        self.mapped_generation = Some(generation);
    }

    fn build_mapping(&mut self) -> Option<Vec<usize>> {
        if self.sort.is_none() && self.filter.is_none() {
            return None;
        }

        let max_nesting = self.source.config().max_nesting;
        let mut rows: Vec<(usize, Option<Value>)> = Vec::new();
        for row in 0..self.source.row_count() {
            let Some(doc) = self.source.document_at(row) else {
                continue;
            };
            if self.filter.as_ref().is_some_and(|f| !f.accepts(&doc, max_nesting)) {
                continue;
            }
            let key = self.sort.as_ref().and_then(|(key, _)| sort_value(&doc, key));
            rows.push((row, key));
        }

        if let Some((_, order)) = &self.sort {
            let order = *order;
            rows.sort_by(|(_, a), (_, b)| {
                let ord = compare_keys(a.as_ref(), b.as_ref());
                match order {
                    SortOrder::Ascending => ord,
                    SortOrder::Descending => ord.reverse(),
                }
            });
        }

        // A reconciliation during the scan may have shrunk the source; the
        // changed generation makes the next access rebuild.
        let row_count = self.source.row_count();
        Some(
            rows.into_iter()
                .map(|(row, _)| row)
                .filter(|&row| row < row_count)
                .collect(),
        )
    }

    // =========================================================================
    // Forwarded row access
    // =========================================================================

    /// Returns the number of visible rows.
    pub fn row_count(&mut self) -> usize {
        self.ensure_mapping();
        match &self.mapping {
            Some(mapping) => mapping.len(),
            None => self.source.row_count(),
        }
    }

    /// Returns `true` if no row is visible.
    pub fn is_empty(&mut self) -> bool {
        self.row_count() == 0
    }

    /// See [`TableModel::cell`], with `row` in proxy order.
    pub fn cell(&mut self, row: usize, column: usize, mode: PresentationMode) -> Option<CellData> {
        self.try_cell(row, column, mode).ok()
    }

    /// See [`TableModel::try_cell`], with `row` in proxy order.
    pub fn try_cell(&mut self, row: usize, column: usize, mode: PresentationMode) -> Result<CellData, CellError> {
        let source_row = self.source_row(row)?;
        self.source.try_cell(source_row, column, mode)
    }

    /// See [`TableModel::value_of`], with `row` in proxy order.
    pub fn value_of(&mut self, row: usize, key: &str, mode: PresentationMode) -> Option<CellData> {
        self.try_value_of(row, key, mode).ok()
    }

    /// See [`TableModel::try_value_of`], with `row` in proxy order.
    pub fn try_value_of(&mut self, row: usize, key: &str, mode: PresentationMode) -> Result<CellData, CellError> {
        let source_row = self.source_row(row)?;
        self.source.try_value_of(source_row, key, mode)
    }

    /// See [`TableModel::id_of`], with `row` in proxy order.
    pub fn id_of(&mut self, row: usize) -> Option<String> {
        let source_row = self.map_to_source(row)?;
        self.source.id_of(source_row)
    }

    /// See [`TableModel::document_at`], with `row` in proxy order.
    pub fn document_at(&mut self, row: usize) -> Option<Arc<Document>> {
        let source_row = self.map_to_source(row)?;
        self.source.document_at(source_row)
    }

    fn source_row(&mut self, row: usize) -> Result<usize, CellError> {
        match self.map_to_source(row) {
            Some(source_row) => Ok(source_row),
            None => {
                let row_count = self.row_count();
                Err(CellError::RowOutOfRange { row, row_count })
            }
        }
    }

    // =========================================================================
    // Forwarded header and model access
    // =========================================================================

    /// See [`TableModel::column_count`].
    pub fn column_count(&self) -> usize {
        self.source.column_count()
    }

    /// See [`TableModel::column_name`].
    pub fn column_name(&self, index: usize) -> Option<&str> {
        self.source.column_name(index)
    }

    /// See [`TableModel::columns`].
    pub fn columns(&self) -> &[String] {
        self.source.columns()
    }

    /// See [`TableModel::column_index`].
    pub fn column_index(&self, key: &str) -> Option<usize> {
        self.source.column_index(key)
    }

    /// See [`TableModel::header_data`].
    ///
    /// Row numbers are not remapped: section `n` is always labelled `n + 1`.
    pub fn header_data(&self, section: usize, orientation: Orientation) -> Option<HeaderData> {
        self.source.header_data(section, orientation)
    }

    /// See [`TableModel::submit_query`].
    pub fn submit_query<S: DocumentStore + ?Sized>(
        &mut self,
        store: &S,
        collection: &str,
        query: &S::Query,
    ) -> Result<(), QueryError> {
        self.source.submit_query(store, collection, query)
    }

    /// See [`TableModel::add_observer`].
    pub fn add_observer(&mut self, observer: Box<dyn ModelObserver>) {
        self.source.add_observer(observer);
    }
}

fn sort_value(doc: &Document, key: &str) -> Option<Value> {
    doc.get_path(key).cloned()
}

fn compare_keys(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.compare(b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModelConfig;
    use crate::query::Filter;
    use crate::store::InMemoryStore;

    fn proxy_over(store: &InMemoryStore) -> SortFilterProxy {
        let mut model = TableModel::new(ModelConfig::default()).unwrap();
        model.submit_query(store, "docs", &Filter::all()).unwrap();
        SortFilterProxy::new(model)
    }

    fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.insert("docs", Document::new().set("_id", 1).set("name", "carol"));
        store.insert("docs", Document::new().set("_id", 2).set("name", "alice"));
        store.insert("docs", Document::new().set("_id", 3));
        store.insert("docs", Document::new().set("_id", 4).set("name", "bob"));
        store
    }

    fn ids(proxy: &mut SortFilterProxy) -> Vec<String> {
        (0..proxy.row_count())
            .filter_map(|row| proxy.id_of(row))
            .collect()
    }

    #[test]
    fn test_unsorted_is_identity() {
        let store = seeded();
        let mut proxy = proxy_over(&store);
        assert_eq!(proxy.row_count(), 4);
        assert_eq!(proxy.map_to_source(2), Some(2));
        assert_eq!(proxy.map_to_source(4), None);
    }

    #[test]
    fn test_sort_ascending_puts_missing_first() {
        let store = seeded();
        let mut proxy = proxy_over(&store);
        proxy.sort_by_key("name", SortOrder::Ascending);
        assert_eq!(ids(&mut proxy), vec!["3", "2", "4", "1"]);
    }

    #[test]
    fn test_sort_descending() {
        let store = seeded();
        let mut proxy = proxy_over(&store);
        proxy.sort_by_key("name", SortOrder::Descending);
        assert_eq!(ids(&mut proxy), vec!["1", "4", "2", "3"]);
        assert_eq!(proxy.map_from_source(0), Some(0));
        assert_eq!(proxy.map_from_source(2), Some(3));
    }

    #[test]
    fn test_sort_by_column_index_captures_key() {
        let store = seeded();
        let mut proxy = proxy_over(&store);
        proxy.cell(0, 0, PresentationMode::Raw);
        assert_eq!(proxy.columns(), ["_id", "name"]);

        proxy.sort(1, SortOrder::Ascending);
        assert_eq!(proxy.sort_key(), Some(("name", SortOrder::Ascending)));
        assert_eq!(proxy.sort_column(), Some(1));

        proxy.sort(7, SortOrder::Ascending);
        assert_eq!(proxy.sort_key(), None);
    }

    #[test]
    fn test_filter_hides_rows() {
        let store = seeded();
        let mut proxy = proxy_over(&store);
        proxy.set_filter(RowFilter::new("B").in_column("name"));
        assert_eq!(ids(&mut proxy), vec!["4"]);

        proxy.clear_filter();
        assert_eq!(proxy.row_count(), 4);
    }

    #[test]
    fn test_header_is_not_remapped() {
        let store = seeded();
        let mut proxy = proxy_over(&store);
        proxy.sort_by_key("name", SortOrder::Descending);
        proxy.row_count();

        for section in 0..4 {
            assert_eq!(
                proxy.header_data(section, Orientation::Vertical),
                proxy.source().header_data(section, Orientation::Vertical)
            );
        }
    }

    #[test]
    fn test_mapping_rebuilt_after_new_query() {
        let store = seeded();
        let mut proxy = proxy_over(&store);
        proxy.sort_by_key("name", SortOrder::Ascending);
        assert_eq!(proxy.row_count(), 4);

        proxy
            .submit_query(&store, "docs", &Filter::exists("name"))
            .unwrap();

        assert_eq!(ids(&mut proxy), vec!["2", "4", "1"]);
    }

    #[test]
    fn test_out_of_range_row() {
        let store = seeded();
        let mut proxy = proxy_over(&store);
        proxy.set_filter(RowFilter::new("alice"));
        assert_eq!(
            proxy.try_cell(1, 0, PresentationMode::Raw),
            Err(CellError::RowOutOfRange { row: 1, row_count: 1 })
        );
    }
}
