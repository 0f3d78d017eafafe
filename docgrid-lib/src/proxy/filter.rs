//! Row filters for the sorting proxy

use crate::header::discover_keys;
use crate::model::Document;

/// Accepts rows whose display text contains a pattern.
///
/// # Example
///
/// ```
/// use docgrid_lib::proxy::RowFilter;
///
/// // Any column containing "oslo", ignoring case
/// let filter = RowFilter::new("oslo");
///
/// // Only the city column, exact case
/// let filter = RowFilter::new("Oslo").in_column("address.city").case_sensitive(true);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter {
    pattern: String,
    column: Option<String>,
    case_sensitive: bool,
}

impl RowFilter {
    /// Creates a case-insensitive filter matching any column.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            column: None,
            case_sensitive: false,
        }
    }

    /// Restricts matching to one column identifier.
    pub fn in_column(mut self, key: impl Into<String>) -> Self {
        self.column = Some(key.into());
        self
    }

    /// Sets whether matching respects case.
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Returns the pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the column identifier, if restricted to one.
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    /// Returns `true` if the document passes the filter.
    ///
    /// Without a column restriction every path up to `max_nesting` is tried.
    pub fn accepts(&self, doc: &Document, max_nesting: usize) -> bool {
        match &self.column {
            Some(key) => self.matches_path(doc, key),
            None => discover_keys(doc, max_nesting)
                .iter()
                .any(|key| self.matches_path(doc, key)),
        }
    }

    fn matches_path(&self, doc: &Document, key: &str) -> bool {
        let Some(value) = doc.get_path(key) else {
            return false;
        };
        let text = value.to_string();
        if self.case_sensitive {
            text.contains(&self.pattern)
        } else {
            text.to_lowercase().contains(&self.pattern.to_lowercase())
        }
    }
}
