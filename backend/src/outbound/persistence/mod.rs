//! Persistence adapters.

mod memory;

pub use memory::{InMemoryActivityLog, InMemoryStore};
