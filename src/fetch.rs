//! Chunked query planner.
//!
//! The remote store caps `in`-set queries at a fixed key count, so any bulk
//! fetch first partitions its key set into bounded chunks, fans the chunks
//! out concurrently, waits for every chunk to settle, and only then merges.
//! Result merging is keyed by the callers; nothing here depends on chunk
//! completion order.

use std::collections::HashSet;
use std::future::Future;
use std::hash::Hash;

use futures::future::join_all;
use tracing::debug;

use crate::store::StoreResult;

/// Partition `keys` into order-preserving, duplicate-free chunks of at most
/// `limit` keys. `⌈N/L⌉` chunks cover the deduplicated set exactly.
pub fn chunk_keys<K: Clone + Eq + Hash>(keys: &[K], limit: usize) -> Vec<Vec<K>> {
    let limit = limit.max(1);
    let mut seen = HashSet::with_capacity(keys.len());
    let mut chunks: Vec<Vec<K>> = Vec::new();
    for key in keys {
        if !seen.insert(key.clone()) {
            continue;
        }
        match chunks.last_mut() {
            Some(chunk) if chunk.len() < limit => chunk.push(key.clone()),
            _ => chunks.push(vec![key.clone()]),
        }
    }
    chunks
}

/// Issue one query per chunk concurrently and concatenate the results.
///
/// An empty key set returns immediately without contacting the store. All
/// chunk queries run to completion before anything is returned; if any
/// failed, the first observed error propagates. Callers needing per-record
/// tolerance apply it while merging the returned rows.
pub async fn fetch_chunked<K, T, F, Fut>(
    keys: &[K],
    limit: usize,
    query: F,
) -> StoreResult<Vec<T>>
where
    K: Clone + Eq + Hash,
    F: Fn(Vec<K>) -> Fut,
    Fut: Future<Output = StoreResult<Vec<T>>>,
{
    if keys.is_empty() {
        return Ok(Vec::new());
    }
    let chunks = chunk_keys(keys, limit);
    debug!(keys = keys.len(), chunks = chunks.len(), "fanning out chunked query");

    let results = join_all(chunks.into_iter().map(query)).await;
    let mut merged = Vec::new();
    for result in results {
        merged.extend(result?);
    }
    Ok(merged)
}
