//! Query filters for selecting documents.

mod filter;

pub use filter::*;
