//! Scatter-gather aggregators.
//!
//! Each public operation fans out its sub-queries concurrently, waits for
//! every one to settle, and merges keyed results; nothing is streamed
//! partially and there is no cancellation of in-flight work. Per-record
//! decode failures degrade (warn and skip) instead of aborting, since the
//! source data is known to contain malformed entries.

pub mod attendance;
pub mod grades;
pub mod lookup;
pub mod timetable;

use tracing::debug;

use crate::error::{CoreError, Result};
use crate::store::{collections, DocumentStore, Filter};

/// Course codes a student is currently enrolled in.
///
/// This is the enumeration step in front of most aggregates: its failure
/// aborts the whole operation rather than degrading.
pub async fn enrolled_course_codes(
    store: &dyn DocumentStore,
    student_id: &str,
) -> Result<Vec<String>> {
    let docs = store
        .query(
            collections::ENROLLMENTS,
            &[Filter::field_eq("studentId", student_id)],
        )
        .await
        .map_err(CoreError::QueryFailed)?;

    let codes: Vec<String> = docs
        .iter()
        .filter_map(|d| d.field_str("courseCode").map(str::to_string))
        .collect();
    debug!(student = student_id, courses = codes.len(), "resolved enrollments");
    Ok(codes)
}
