//! Tabular access over document queries

mod cell;
mod model;
mod shared;

pub use cell::*;
pub use model::*;
pub use shared::*;
