//! Errors raised by result set handles

/// Error returned when a single document cannot be fetched.
///
/// The two variants must stay distinct: a missing row means the result set
/// shrank and the row count needs reconciling, while a store failure is
/// transient and says nothing about the row count.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The position no longer resolves to a document.
    #[error("Row {index} is no longer available")]
    RowUnavailable { index: usize },

    /// The store could not be reached or failed the request.
    #[error("Document store unavailable: {0}")]
    StoreUnavailable(String),
}

impl FetchError {
    /// Creates a new row unavailable error.
    pub fn row_unavailable(index: usize) -> Self {
        Self::RowUnavailable { index }
    }

    /// Creates a new store unavailable error.
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable(message.into())
    }

    /// Returns `true` if the row vanished from the result set.
    pub fn is_row_unavailable(&self) -> bool {
        matches!(self, Self::RowUnavailable { .. })
    }
}
