//! Row document caching
//!
//! Provides the bounded least-recently-used cache the table model keeps in
//! front of its cursor. Each model owns its own cache; nothing is shared
//! between instances.

mod rows;

pub use rows::*;

/// Default number of documents kept per model.
pub const DEFAULT_CACHE_CAPACITY: usize = 50;
