//! Structural change notifications
//!
//! Observers learn about row and column extent changes through begin/end
//! pairs that bracket the actual mutation. Every pair is emitted exactly
//! once per mutation and pairs never nest.

mod observer;
mod recorder;

pub use observer::*;
pub use recorder::*;
