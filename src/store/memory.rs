//! In-memory store backend.
//!
//! Reference implementation of the store contract, also used as the test
//! double: commits can be failed on demand and per-collection query
//! outages can be injected.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::error::{StoreError, StoreResult};
use super::traits::{DocumentStore, IN_QUERY_LIMIT};
use super::types::{Document, Filter, WriteBatch, WriteOp};

type Collection = BTreeMap<String, Value>;

#[derive(Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
    /// Keyed `collection/parent_id/subcollection`.
    nested: Arc<RwLock<HashMap<String, Collection>>>,
    fail_next_commit: AtomicBool,
    failing_collections: RwLock<HashSet<String>>,
    query_counts: RwLock<HashMap<String, usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn nested_key(collection: &str, parent_id: &str, subcollection: &str) -> String {
        format!("{collection}/{parent_id}/{subcollection}")
    }

    /// Seed a top-level document.
    pub async fn insert<T: Serialize>(
        &self,
        collection: &str,
        id: &str,
        value: &T,
    ) -> StoreResult<()> {
        let data = serde_json::to_value(value)?;
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);
        Ok(())
    }

    /// Seed a document in a sub-collection.
    pub async fn insert_nested<T: Serialize>(
        &self,
        collection: &str,
        parent_id: &str,
        subcollection: &str,
        id: &str,
        value: &T,
    ) -> StoreResult<()> {
        let data = serde_json::to_value(value)?;
        self.nested
            .write()
            .await
            .entry(Self::nested_key(collection, parent_id, subcollection))
            .or_default()
            .insert(id.to_string(), data);
        Ok(())
    }

    /// Fail the next `commit` call with a transaction error.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Make every query against `collection` fail until lifted.
    pub async fn fail_queries_on(&self, collection: &str) {
        self.failing_collections
            .write()
            .await
            .insert(collection.to_string());
    }

    pub async fn lift_query_failures(&self, collection: &str) {
        self.failing_collections.write().await.remove(collection);
    }

    /// Number of documents currently in a top-level collection.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|c| c.len())
            .unwrap_or(0)
    }

    /// Snapshot of a top-level collection, for assertions.
    pub async fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|c| {
                c.iter()
                    .map(|(id, data)| Document::new(id.clone(), data.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// How many queries have been issued against a collection.
    pub async fn queries_issued(&self, collection: &str) -> usize {
        self.query_counts
            .read()
            .await
            .get(collection)
            .copied()
            .unwrap_or(0)
    }

    async fn record_query(&self, collection: &str) -> StoreResult<()> {
        *self
            .query_counts
            .write()
            .await
            .entry(collection.to_string())
            .or_insert(0) += 1;
        if self.failing_collections.read().await.contains(collection) {
            return Err(StoreError::unavailable(format!(
                "collection {collection} is offline"
            )));
        }
        Ok(())
    }

    fn check_filters(&self, filters: &[Filter]) -> StoreResult<()> {
        for filter in filters {
            let in_size = match filter {
                Filter::FieldIn { values, .. } => Some(values.len()),
                Filter::IdIn { ids } => Some(ids.len()),
                _ => None,
            };
            if let Some(n) = in_size {
                if n > self.in_query_limit() {
                    return Err(StoreError::rejected(format!(
                        "in-set of {n} keys exceeds limit {}",
                        self.in_query_limit()
                    )));
                }
            }
        }
        Ok(())
    }

    fn time_field(data: &Value, field: &str) -> Option<chrono::DateTime<chrono::Utc>> {
        data.get(field)
            .and_then(Value::as_str)
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&chrono::Utc))
    }

    fn matches(id: &str, data: &Value, filter: &Filter) -> bool {
        match filter {
            Filter::FieldEq { field, value } => {
                data.get(field).and_then(Value::as_str) == Some(value.as_str())
            }
            Filter::FieldIn { field, values } => data
                .get(field)
                .and_then(Value::as_str)
                .map(|v| values.iter().any(|w| w == v))
                .unwrap_or(false),
            Filter::IdIn { ids } => ids.iter().any(|candidate| candidate == id),
            Filter::TimeAtOrAfter { field, value } => Self::time_field(data, field)
                .map(|t| t >= *value)
                .unwrap_or(false),
            Filter::TimeAtOrBefore { field, value } => Self::time_field(data, field)
                .map(|t| t <= *value)
                .unwrap_or(false),
        }
    }

    fn select(collection: Option<&Collection>, filters: &[Filter]) -> Vec<Document> {
        collection
            .map(|docs| {
                docs.iter()
                    .filter(|(id, data)| filters.iter().all(|f| Self::matches(id, data, f)))
                    .map(|(id, data)| Document::new(id.clone(), data.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        self.record_query(collection).await?;
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|c| c.get(id))
            .map(|data| Document::new(id, data.clone())))
    }

    async fn query(&self, collection: &str, filters: &[Filter]) -> StoreResult<Vec<Document>> {
        self.record_query(collection).await?;
        self.check_filters(filters)?;
        let guard = self.collections.read().await;
        Ok(Self::select(guard.get(collection), filters))
    }

    async fn query_nested(
        &self,
        collection: &str,
        parent_id: &str,
        subcollection: &str,
        filters: &[Filter],
    ) -> StoreResult<Vec<Document>> {
        self.record_query(collection).await?;
        self.check_filters(filters)?;
        let guard = self.nested.read().await;
        Ok(Self::select(
            guard.get(&Self::nested_key(collection, parent_id, subcollection)),
            filters,
        ))
    }

    async fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::transaction("injected commit failure"));
        }
        // Single write guard: the whole batch lands or none of it does.
        let mut guard = self.collections.write().await;
        for op in batch.into_ops() {
            match op {
                WriteOp::Set {
                    collection,
                    id,
                    data,
                } => {
                    let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
                    guard.entry(collection).or_default().insert(id, data);
                }
            }
        }
        Ok(())
    }

    fn in_query_limit(&self) -> usize {
        IN_QUERY_LIMIT
    }
}
