//! Domain layer: pure value types describing one injection run.
//!
//! Nothing in here performs I/O.  The infrastructure layer of the `typewire`
//! crate fills these types from live OS state and the application layer
//! consumes them.

pub mod event;
pub mod mode;
pub mod pacing;
pub mod target;
