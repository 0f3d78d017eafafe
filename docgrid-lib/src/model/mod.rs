//! Document and value types

mod document;
mod json;
mod value;

pub use document::*;
pub use json::*;
pub use value::*;
