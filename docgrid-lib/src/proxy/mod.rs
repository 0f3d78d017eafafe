//! Sorting and filtering in front of a table model
//!
//! The proxy only reorders and hides rows. Column identity always comes
//! from the source model, so headers never change under sorting.

mod filter;
mod model;

pub use filter::*;
pub use model::*;

/// Sort direction for proxy rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Smallest value first; rows without a value come first.
    #[default]
    Ascending,
    /// Largest value first; rows without a value come last.
    Descending,
}
