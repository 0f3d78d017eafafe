//! Filter conditions for document queries.

use std::cmp::Ordering;

use crate::model::Document;
use crate::model::Value;

/// A filter condition selecting documents from a collection.
///
/// Field names are dotted paths resolved through embedded documents, so
/// `Filter::eq("address.city", "Oslo")` matches `{"address": {"city": "Oslo"}}`.
/// Comparisons use the store's cross-type ordering, and a comparison against
/// a missing field never matches.
///
/// # Example
///
/// ```
/// use docgrid_lib::query::Filter;
///
/// // Simple equality filter
/// let filter = Filter::eq("status", "active");
///
/// // Combined filter
/// let filter = Filter::and([
///     Filter::eq("status", "active"),
///     Filter::gt("revenue", 1_000_000),
/// ]);
///
/// // Using combinators
/// let filter = Filter::eq("status", "active")
///     .and_also(Filter::exists("email"));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Filter {
    /// Matches every document.
    #[default]
    All,
    /// Equality: `field == value`
    Eq(String, Value),
    /// Not equal: `field != value` (also matches when the field is missing)
    Ne(String, Value),
    /// Greater than: `field > value`
    Gt(String, Value),
    /// Greater than or equal: `field >= value`
    Ge(String, Value),
    /// Less than: `field < value`
    Lt(String, Value),
    /// Less than or equal: `field <= value`
    Le(String, Value),
    /// String field contains substring.
    Contains(String, String),
    /// String field starts with prefix.
    StartsWith(String, String),
    /// String field ends with suffix.
    EndsWith(String, String),
    /// Field is present (may be null).
    Exists(String),
    /// Field is absent.
    Missing(String),
    /// Logical AND of multiple filters.
    And(Vec<Filter>),
    /// Logical OR of multiple filters.
    Or(Vec<Filter>),
}

impl Filter {
    /// Creates a filter matching every document.
    pub fn all() -> Self {
        Filter::All
    }

    /// Creates an equality filter: `field == value`.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    /// Creates a not-equal filter: `field != value`.
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Ne(field.into(), value.into())
    }

    /// Creates a greater-than filter: `field > value`.
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Gt(field.into(), value.into())
    }

    /// Creates a greater-than-or-equal filter: `field >= value`.
    pub fn ge(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Ge(field.into(), value.into())
    }

    /// Creates a less-than filter: `field < value`.
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Lt(field.into(), value.into())
    }

    /// Creates a less-than-or-equal filter: `field <= value`.
    pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Le(field.into(), value.into())
    }

    /// Creates a contains filter on a string field.
    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Contains(field.into(), value.into())
    }

    /// Creates a starts-with filter on a string field.
    pub fn starts_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::StartsWith(field.into(), value.into())
    }

    /// Creates an ends-with filter on a string field.
    pub fn ends_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::EndsWith(field.into(), value.into())
    }

    /// Creates a field-present filter.
    pub fn exists(field: impl Into<String>) -> Self {
        Filter::Exists(field.into())
    }

    /// Creates a field-absent filter.
    pub fn missing(field: impl Into<String>) -> Self {
        Filter::Missing(field.into())
    }

    /// Creates a logical AND of multiple filters.
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::And(filters.into_iter().collect())
    }

    /// Creates a logical OR of multiple filters.
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Or(filters.into_iter().collect())
    }

    /// Combines this filter with another using logical AND.
    pub fn and_also(self, other: Filter) -> Self {
        match self {
            Filter::And(mut filters) => {
                filters.push(other);
                Filter::And(filters)
            }
            _ => Filter::And(vec![self, other]),
        }
    }

    /// Combines this filter with another using logical OR.
    pub fn or_else(self, other: Filter) -> Self {
        match self {
            Filter::Or(mut filters) => {
                filters.push(other);
                Filter::Or(filters)
            }
            _ => Filter::Or(vec![self, other]),
        }
    }

    /// Returns `true` if the document satisfies this filter.
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(field, value) => compare(doc, field, value) == Some(Ordering::Equal),
            Filter::Ne(field, value) => compare(doc, field, value) != Some(Ordering::Equal),
            Filter::Gt(field, value) => compare(doc, field, value) == Some(Ordering::Greater),
            Filter::Ge(field, value) => matches!(
                compare(doc, field, value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Filter::Lt(field, value) => compare(doc, field, value) == Some(Ordering::Less),
            Filter::Le(field, value) => matches!(
                compare(doc, field, value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Filter::Contains(field, needle) => {
                string_at(doc, field).is_some_and(|s| s.contains(needle.as_str()))
            }
            Filter::StartsWith(field, prefix) => {
                string_at(doc, field).is_some_and(|s| s.starts_with(prefix.as_str()))
            }
            Filter::EndsWith(field, suffix) => {
                string_at(doc, field).is_some_and(|s| s.ends_with(suffix.as_str()))
            }
            Filter::Exists(field) => doc.get_path(field).is_some(),
            Filter::Missing(field) => doc.get_path(field).is_none(),
            Filter::And(filters) => filters.iter().all(|f| f.matches(doc)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(doc)),
        }
    }
}

fn compare(doc: &Document, field: &str, value: &Value) -> Option<Ordering> {
    doc.get_path(field).map(|actual| actual.compare(value))
}

fn string_at<'a>(doc: &'a Document, field: &str) -> Option<&'a str> {
    doc.get_path(field).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Document {
        Document::new()
            .set("_id", 1)
            .set("name", "Contoso Ltd")
            .set("revenue", 2_000_000i64)
            .set("address", Document::new().set("city", "Oslo"))
    }

    #[test]
    fn test_simple_filters() {
        let doc = account();
        assert!(Filter::eq("name", "Contoso Ltd").matches(&doc));
        assert!(Filter::gt("revenue", 1_000_000).matches(&doc));
        assert!(!Filter::lt("revenue", 1_000_000).matches(&doc));
        assert!(Filter::le("revenue", 2_000_000).matches(&doc));
    }

    #[test]
    fn test_nested_path() {
        let doc = account();
        assert!(Filter::eq("address.city", "Oslo").matches(&doc));
        assert!(!Filter::eq("address.zip", "0150").matches(&doc));
    }

    #[test]
    fn test_string_functions() {
        let doc = account();
        assert!(Filter::contains("name", "toso").matches(&doc));
        assert!(Filter::starts_with("name", "Con").matches(&doc));
        assert!(Filter::ends_with("name", "Ltd").matches(&doc));
        assert!(!Filter::contains("revenue", "2").matches(&doc));
    }

    #[test]
    fn test_missing_fields() {
        let doc = account();
        assert!(Filter::ne("email", "x").matches(&doc));
        assert!(!Filter::gt("email", "x").matches(&doc));
        assert!(Filter::missing("email").matches(&doc));
        assert!(Filter::exists("address").matches(&doc));
    }

    #[test]
    fn test_combined_filters() {
        let doc = account();
        let filter = Filter::eq("name", "Contoso Ltd").and_also(Filter::gt("revenue", 5));
        assert!(filter.matches(&doc));

        let filter = Filter::eq("name", "Fabrikam").or_else(Filter::exists("_id"));
        assert!(filter.matches(&doc));

        assert!(!Filter::and([Filter::all(), Filter::missing("_id")]).matches(&doc));
    }
}
