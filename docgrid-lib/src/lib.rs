//! Document grid library
//!
//! Presents the result of a document store query as a lazily materialized
//! table: rows are documents, columns are the field paths discovered as
//! documents are read, and rows that vanish from the store are reconciled
//! away on access.

pub mod cache;
pub mod error;
pub mod header;
pub mod model;
pub mod notify;
pub mod proxy;
pub mod query;
pub mod store;
pub mod table;

mod config;

pub use config::*;
