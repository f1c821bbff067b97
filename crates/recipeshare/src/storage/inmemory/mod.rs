//! In-memory table store implementation.

mod store;

pub use store::InMemoryTableStore;
