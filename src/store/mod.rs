//! Document-store abstraction layer.
//!
//! The hosted backend is modeled as named collections of id-addressed JSON
//! documents with nested sub-collections, a bounded `in`-set query, and an
//! atomic multi-document batch write. The in-memory backend doubles as the
//! reference implementation and the test double.

pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use traits::{DocumentStore, IN_QUERY_LIMIT};
pub use types::{collections, Document, Filter, WriteBatch};
