//! Attendance statistics.
//!
//! Sessions live in a flat collection filtered by course; each session
//! carries an `attendance` sub-collection of per-student marks. Counting
//! fans out per course, and inside a course per session; a course's counts
//! are only folded once every one of its sub-fetches has settled.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::{CoreError, Result};
use crate::model::{AttendanceMark, PresenceValue, SessionInstance};
use crate::store::{collections, Document, DocumentStore, Filter};

/// Per-course attendance counts. The percentage is the caller's division.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseAttendance {
    pub total_sessions: u32,
    pub attended_sessions: u32,
}

/// Compute attendance counts for a student across courses.
///
/// A session counts toward the total when it is not in the future, or when
/// it already carries marks (back-dated logging). It counts as attended
/// when the student's mark normalizes to present.
pub async fn compute_attendance(
    store: &dyn DocumentStore,
    clock: &dyn Clock,
    student_id: &str,
    course_codes: &[String],
) -> Result<HashMap<String, CourseAttendance>> {
    if course_codes.is_empty() {
        return Ok(HashMap::new());
    }
    let now = clock.now();

    let per_course = course_codes.iter().map(|code| async move {
        let counts = course_attendance(store, now, student_id, code).await?;
        Ok::<_, CoreError>((code.clone(), counts))
    });

    let results = join_all(per_course).await;
    let mut stats = HashMap::with_capacity(course_codes.len());
    for result in results {
        let (code, counts) = result?;
        stats.insert(code, counts);
    }
    Ok(stats)
}

async fn course_attendance(
    store: &dyn DocumentStore,
    now: DateTime<Utc>,
    student_id: &str,
    course_code: &str,
) -> Result<CourseAttendance> {
    let sessions = store
        .query(
            collections::SESSIONS,
            &[Filter::field_eq("courseCode", course_code)],
        )
        .await
        .map_err(CoreError::QueryFailed)?;
    debug!(course = course_code, sessions = sessions.len(), "counting attendance");

    let per_session = sessions.iter().map(|session| async move {
        let is_past = session
            .field_time("sessionTime")
            .map(|t| t <= now)
            .unwrap_or(false);
        let marks = store
            .query_nested(collections::SESSIONS, &session.id, collections::ATTENDANCE, &[])
            .await?;
        Ok::<_, crate::store::StoreError>((is_past, marks))
    });

    let results = join_all(per_session).await;
    let mut counts = CourseAttendance::default();
    for result in results {
        let (is_past, marks) = result.map_err(CoreError::QueryFailed)?;
        if !is_past && marks.is_empty() {
            continue;
        }
        counts.total_sessions += 1;
        if find_student_mark(&marks, student_id) == Some(true) {
            counts.attended_sessions += 1;
        }
    }
    Ok(counts)
}

/// Locate the student's mark and normalize it to a presence flag.
///
/// All three legal document shapes are matched: the mark's document id
/// equals the student uid, its `studentId` field does, or a roster
/// document's `entries` map contains the uid. An id or field match wins
/// even when its `status` is missing (treated as absent); the roster map
/// counts present only on the literal string `"present"`. Marks that fail
/// to decode are skipped with a warning.
fn find_student_mark(marks: &[Document], student_id: &str) -> Option<bool> {
    for doc in marks {
        let id_matches = doc.id == student_id;
        let mark: AttendanceMark = match doc.decode() {
            Ok(mark) => mark,
            Err(err) => {
                let mapping =
                    CoreError::mapping(collections::ATTENDANCE, &doc.id, err);
                warn!(error = %mapping, "skipping malformed attendance mark");
                continue;
            }
        };
        if id_matches || mark.student_id.as_deref() == Some(student_id) {
            return Some(
                mark.status
                    .as_ref()
                    .map(PresenceValue::is_present)
                    .unwrap_or(false),
            );
        }
        if let Some(value) = mark.entries.as_ref().and_then(|e| e.get(student_id)) {
            return Some(roster_present(value));
        }
    }
    None
}

fn roster_present(value: &PresenceValue) -> bool {
    matches!(value, PresenceValue::Text(s) if s.trim().eq_ignore_ascii_case("present"))
}

/// One session's attendance status for the per-course drill-down view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAttendanceRow {
    pub session_id: String,
    pub session: SessionInstance,
    /// `None` when no mark exists for the student.
    pub present: Option<bool>,
}

/// Detailed per-session attendance for one course, sorted by time.
pub async fn attendance_sessions_for_course(
    store: &dyn DocumentStore,
    student_id: &str,
    course_code: &str,
) -> Result<Vec<SessionAttendanceRow>> {
    let sessions = store
        .query(
            collections::SESSIONS,
            &[Filter::field_eq("courseCode", course_code)],
        )
        .await
        .map_err(CoreError::QueryFailed)?;

    let per_session = sessions.iter().map(|doc| async move {
        let marks = store
            .query_nested(collections::SESSIONS, &doc.id, collections::ATTENDANCE, &[])
            .await
            .map_err(CoreError::QueryFailed)?;
        Ok::<_, CoreError>((doc, marks))
    });

    let results = join_all(per_session).await;
    let mut rows = Vec::with_capacity(sessions.len());
    for result in results {
        let (doc, marks) = result?;
        let session: SessionInstance = match doc.decode() {
            Ok(session) => session,
            Err(err) => {
                let mapping = CoreError::mapping(collections::SESSIONS, &doc.id, err);
                warn!(error = %mapping, "skipping malformed session");
                continue;
            }
        };
        rows.push(SessionAttendanceRow {
            session_id: doc.id.clone(),
            present: find_student_mark(&marks, student_id),
            session,
        });
    }
    rows.sort_by_key(|row| row.session.session_time);
    Ok(rows)
}
