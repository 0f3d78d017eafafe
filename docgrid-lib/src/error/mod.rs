//! Error types

mod cell;
mod config;
mod fetch;
mod query;

pub use cell::*;
pub use config::*;
pub use fetch::*;
pub use query::*;
