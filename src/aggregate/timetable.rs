//! Ranged session lookup across a student's enrollments.
//!
//! Resolves enrolled course codes, then fans a time-bounded session query
//! out through the chunked planner and merges into one time-sorted list.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::config::CoreConfig;
use crate::error::{CoreError, Result};
use crate::fetch::fetch_chunked;
use crate::model::SessionInstance;
use crate::store::{collections, DocumentStore, Filter};

use super::enrolled_course_codes;

/// All sessions for the student's courses with `session_time` inside
/// `[start, end]`, ascending. The enrollment enumeration failing aborts
/// the whole fetch; malformed session documents are skipped.
pub async fn sessions_in_range(
    store: &dyn DocumentStore,
    config: &CoreConfig,
    student_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<SessionInstance>> {
    let codes = enrolled_course_codes(store, student_id).await?;
    if codes.is_empty() {
        return Ok(Vec::new());
    }

    let docs = fetch_chunked(&codes, config.batch_limit, |chunk| async move {
        store
            .query(
                collections::SESSIONS,
                &[
                    Filter::field_in("courseCode", chunk),
                    Filter::at_or_after("sessionTime", start),
                    Filter::at_or_before("sessionTime", end),
                ],
            )
            .await
    })
    .await
    .map_err(CoreError::QueryFailed)?;

    let mut sessions = Vec::with_capacity(docs.len());
    for doc in docs {
        match doc.decode::<SessionInstance>() {
            Ok(session) => sessions.push(session),
            Err(err) => {
                let mapping = CoreError::mapping(collections::SESSIONS, &doc.id, err);
                warn!(error = %mapping, "skipping malformed session");
            }
        }
    }
    sessions.sort_by_key(|s| s.session_time);
    Ok(sessions)
}
