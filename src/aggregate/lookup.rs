//! Bulk name, profile, and course-metadata lookups.
//!
//! All three fan out through the chunked planner to respect the store's
//! `in`-set ceiling. Unresolvable records degrade per entry: a missing or
//! corrupt profile becomes a placeholder name, a malformed document is
//! skipped with a warning.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use lru::LruCache;
use tokio::sync::Mutex;
use tracing::warn;

use crate::config::CoreConfig;
use crate::error::{CoreError, Result};
use crate::fetch::fetch_chunked;
use crate::model::{CourseMeta, UserProfile};
use crate::store::{collections, DocumentStore, Filter};

/// Resolve display names for a set of user ids.
///
/// Every requested uid appears in the result: ids whose profile is absent,
/// nameless, or undecodable map to the configured placeholder rather than
/// failing the fetch.
pub async fn bulk_display_names(
    store: &dyn DocumentStore,
    config: &CoreConfig,
    uids: &[String],
) -> Result<HashMap<String, String>> {
    let docs = fetch_chunked(uids, config.batch_limit, |chunk| async move {
        store
            .query(collections::USERS, &[Filter::id_in(chunk)])
            .await
    })
    .await
    .map_err(CoreError::QueryFailed)?;

    let mut names: HashMap<String, String> = HashMap::with_capacity(uids.len());
    for doc in docs {
        let name = match doc.field_str("name") {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                warn!(uid = %doc.id, "profile has no usable name, substituting placeholder");
                config.unknown_name_placeholder.clone()
            }
        };
        names.insert(doc.id, name);
    }
    // Ids the store never returned resolve to the placeholder too.
    for uid in uids {
        names
            .entry(uid.clone())
            .or_insert_with(|| config.unknown_name_placeholder.clone());
    }
    Ok(names)
}

/// Fetch full profiles for a set of user ids (grading rosters).
///
/// Malformed profile documents are skipped, not fatal.
pub async fn bulk_profiles(
    store: &dyn DocumentStore,
    config: &CoreConfig,
    uids: &[String],
) -> Result<Vec<UserProfile>> {
    let docs = fetch_chunked(uids, config.batch_limit, |chunk| async move {
        store
            .query(collections::USERS, &[Filter::id_in(chunk)])
            .await
    })
    .await
    .map_err(CoreError::QueryFailed)?;

    let mut profiles = Vec::with_capacity(docs.len());
    for doc in docs {
        match doc.decode::<UserProfile>() {
            Ok(mut profile) => {
                // The document id is authoritative for the uid.
                profile.uid = doc.id;
                profiles.push(profile);
            }
            Err(err) => {
                let mapping = CoreError::mapping(collections::USERS, &doc.id, err);
                warn!(error = %mapping, "skipping malformed profile");
            }
        }
    }
    Ok(profiles)
}

/// Fetch course reference data keyed by course code.
pub async fn course_meta_by_codes(
    store: &dyn DocumentStore,
    config: &CoreConfig,
    course_codes: &[String],
) -> Result<HashMap<String, CourseMeta>> {
    let docs = fetch_chunked(course_codes, config.batch_limit, |chunk| async move {
        store
            .query(
                collections::COURSES,
                &[Filter::field_in("courseCode", chunk)],
            )
            .await
    })
    .await
    .map_err(CoreError::QueryFailed)?;

    let mut meta = HashMap::with_capacity(docs.len());
    for doc in docs {
        match doc.decode::<CourseMeta>() {
            Ok(m) => {
                meta.insert(m.course_code.clone(), m);
            }
            Err(err) => {
                let mapping = CoreError::mapping(collections::COURSES, &doc.id, err);
                warn!(error = %mapping, "skipping malformed course meta");
            }
        }
    }
    Ok(meta)
}

/// Program ids available for the enrollment form.
pub async fn program_codes(store: &dyn DocumentStore) -> Result<Vec<String>> {
    let docs = store
        .query(collections::PROGRAMS, &[])
        .await
        .map_err(CoreError::QueryFailed)?;
    // The form only shows a page worth of programs.
    Ok(docs.into_iter().take(50).map(|d| d.id).collect())
}

/// Explicit uid -> display-name cache in front of [`bulk_display_names`].
///
/// Owned by whoever needs memoized names; there is no ambient static
/// state, and stale entries are dropped through [`NameCache::invalidate`].
pub struct NameCache {
    inner: Mutex<LruCache<String, String>>,
}

impl NameCache {
    pub fn new(config: &CoreConfig) -> Self {
        let capacity = NonZeroUsize::new(config.name_cache_capacity.max(1))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Resolve names, serving cached entries and fetching only the misses.
    pub async fn display_names(
        &self,
        store: &dyn DocumentStore,
        config: &CoreConfig,
        uids: &[String],
    ) -> Result<HashMap<String, String>> {
        let mut resolved = HashMap::with_capacity(uids.len());
        let mut misses = Vec::new();
        {
            let mut cache = self.inner.lock().await;
            for uid in uids {
                match cache.get(uid) {
                    Some(name) => {
                        resolved.insert(uid.clone(), name.clone());
                    }
                    None => misses.push(uid.clone()),
                }
            }
        }

        if !misses.is_empty() {
            let fetched = bulk_display_names(store, config, &misses).await?;
            let mut cache = self.inner.lock().await;
            for (uid, name) in fetched {
                cache.put(uid.clone(), name.clone());
                resolved.insert(uid, name);
            }
        }
        Ok(resolved)
    }

    pub async fn invalidate(&self, uid: &str) {
        self.inner.lock().await.pop(uid);
    }

    pub async fn invalidate_all(&self) {
        self.inner.lock().await.clear();
    }
}
