//! Core trait definition for the document store seam.

use async_trait::async_trait;

use super::error::StoreResult;
use super::types::{Document, Filter, WriteBatch};

/// Enforced ceiling on `in`-set query size.
pub const IN_QUERY_LIMIT: usize = 10;

/// Contract consumed from the hosted document database.
///
/// Implementations must treat [`DocumentStore::commit`] as all-or-nothing;
/// everything else in the crate leans on that guarantee instead of doing
/// its own cleanup.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point lookup by document id.
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Filtered collection query. No ordering guarantee; callers sort.
    async fn query(&self, collection: &str, filters: &[Filter]) -> StoreResult<Vec<Document>>;

    /// Query a sub-collection scoped to one parent document.
    async fn query_nested(
        &self,
        collection: &str,
        parent_id: &str,
        subcollection: &str,
        filters: &[Filter],
    ) -> StoreResult<Vec<Document>>;

    /// Atomically commit a multi-document batch.
    async fn commit(&self, batch: WriteBatch) -> StoreResult<()>;

    /// Upper bound the store enforces on `FieldIn`/`IdIn` sets.
    fn in_query_limit(&self) -> usize {
        IN_QUERY_LIMIT
    }
}
