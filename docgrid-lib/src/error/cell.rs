//! Cell lookup failures

use super::FetchError;

/// Why a cell lookup produced no value.
///
/// None of these are fatal. The infallible accessors on the table model map
/// every variant to `None`; the `try_` accessors expose the reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CellError {
    /// The row index is outside `[0, row_count)`.
    #[error("Row {row} is out of range (row count {row_count})")]
    RowOutOfRange { row: usize, row_count: usize },

    /// The column index or identifier is not part of the header.
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    /// The document at this row was removed from the result set.
    #[error("Row {0} is no longer available")]
    RowUnavailable(usize),

    /// The store failed while fetching the row.
    #[error("Document store unavailable: {0}")]
    StoreUnavailable(String),

    /// The document has no value at this path.
    #[error("Path '{0}' not present in document")]
    PathUnresolved(String),
}

impl From<FetchError> for CellError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::RowUnavailable { index } => Self::RowUnavailable(index),
            FetchError::StoreUnavailable(message) => Self::StoreUnavailable(message),
        }
    }
}
