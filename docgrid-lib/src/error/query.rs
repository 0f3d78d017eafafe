//! Query submission errors

/// Errors that can occur when binding a query to the store.
///
/// Unlike cell access, query submission is not lazy, so these propagate to
/// the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The query is malformed.
    #[error("Invalid query: {0}")]
    Invalid(String),

    /// The store refused to run the query.
    #[error("Query rejected by store: {0}")]
    Rejected(String),

    /// The store could not be reached.
    #[error("Document store unavailable: {0}")]
    Unavailable(String),
}

impl QueryError {
    /// Creates a new invalid query error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    /// Creates a new rejected query error.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Creates a new store unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Returns `true` if retrying later might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
