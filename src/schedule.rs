//! Recurrence expansion for weekly class schedules.
//!
//! A blueprint describes a weekly repeating meeting; expansion walks every
//! calendar day of the blueprint's date range in its own timezone and
//! materializes one dated session per matching weekday. Persistence is a
//! single atomic batch: blueprint plus all of its sessions.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use tracing::info;
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::model::{ScheduleBlueprint, SessionInstance};
use crate::store::{collections, DocumentStore, WriteBatch};

/// Outcome of a persisted schedule creation.
#[derive(Debug, Clone)]
pub struct ScheduleReceipt {
    pub schedule_id: String,
    pub session_count: usize,
}

/// Parse a 24-hour `HH:MM` clock time. Only ASCII digits are accepted;
/// `str::parse` alone would let a leading sign through.
fn parse_start_time(raw: &str) -> Result<(u32, u32)> {
    let invalid = || CoreError::InvalidTimeFormat(raw.to_string());
    let (h, m) = raw.split_once(':').ok_or_else(invalid)?;
    if h.is_empty() || m.is_empty() || !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let hour: u32 = h.parse().map_err(|_| invalid())?;
    let minute: u32 = m.parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok((hour, minute))
}

/// Expand a blueprint into the ordered list of sessions it implies.
///
/// Walks each calendar day from `start_date` to `end_date` inclusive in the
/// blueprint's timezone; days whose weekday is listed get one session at
/// `start_time` (seconds zeroed), converted back to UTC. The day-by-day
/// walk makes the output ascending by session time with at most one
/// session per calendar day. An empty weekday set or an inverted date
/// range yields an empty list, not an error.
pub fn expand_sessions(
    blueprint: &ScheduleBlueprint,
    schedule_id: &str,
) -> Result<Vec<SessionInstance>> {
    let (hour, minute) = parse_start_time(&blueprint.start_time)?;

    let mut sessions = Vec::new();
    if blueprint.days_of_week.is_empty() {
        return Ok(sessions);
    }

    let tz = blueprint.timezone;
    let wanted: HashSet<chrono::Weekday> = blueprint
        .days_of_week
        .iter()
        .map(|d| d.to_chrono())
        .collect();

    let mut day: NaiveDate = blueprint.start_date.with_timezone(&tz).date_naive();
    let last: NaiveDate = blueprint.end_date.with_timezone(&tz).date_naive();

    while day <= last {
        if wanted.contains(&day.weekday()) {
            let local = day
                .and_hms_opt(hour, minute, 0)
                .ok_or_else(|| CoreError::InvalidTimeFormat(blueprint.start_time.clone()))?;
            sessions.push(SessionInstance {
                schedule_id: schedule_id.to_string(),
                course_code: blueprint.course_code.clone(),
                faculty_id: blueprint.faculty_id.clone(),
                session_time: to_utc(local, tz),
                venue: blueprint.venue.clone(),
                kind: blueprint.kind.clone(),
                topic: None,
            });
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    Ok(sessions)
}

fn to_utc(local: chrono::NaiveDateTime, tz: chrono::FixedOffset) -> DateTime<Utc> {
    // Fixed offsets have no DST gaps, so the shift is unambiguous.
    Utc.from_utc_datetime(&(local - Duration::seconds(tz.local_minus_utc() as i64)))
}

/// Persists schedule blueprints together with their expanded sessions.
pub struct ScheduleWriter {
    store: Arc<dyn DocumentStore>,
}

impl ScheduleWriter {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Expand `blueprint` and commit it plus every session in one atomic
    /// batch. The store's atomicity guarantee means a failure leaves
    /// neither the blueprint nor any session behind.
    pub async fn create_schedule(&self, blueprint: &ScheduleBlueprint) -> Result<ScheduleReceipt> {
        let schedule_id = Uuid::new_v4().to_string();
        let sessions = expand_sessions(blueprint, &schedule_id)?;

        let mut batch = WriteBatch::new();
        batch
            .set(collections::SCHEDULES, &schedule_id, blueprint)
            .map_err(CoreError::BatchWriteFailed)?;
        for session in &sessions {
            batch
                .add(collections::SESSIONS, session)
                .map_err(CoreError::BatchWriteFailed)?;
        }

        self.store
            .commit(batch)
            .await
            .map_err(CoreError::BatchWriteFailed)?;
        info!(
            schedule_id = %schedule_id,
            course = %blueprint.course_code,
            sessions = sessions.len(),
            "schedule blueprint persisted"
        );
        Ok(ScheduleReceipt {
            schedule_id,
            session_count: sessions.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Weekday;
    use chrono::{FixedOffset, TimeZone, Timelike};

    fn blueprint(days: Vec<Weekday>, start_time: &str, offset_secs: i32) -> ScheduleBlueprint {
        ScheduleBlueprint {
            course_code: "CS101".into(),
            faculty_id: "fac-1".into(),
            days_of_week: days,
            start_time: start_time.into(),
            venue: "Room 501".into(),
            kind: "lecture".into(),
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
            timezone: FixedOffset::east_opt(offset_secs).unwrap(),
        }
    }

    #[test]
    fn expands_monday_wednesday_range() {
        // 2024-01-01 is a Monday.
        let bp = blueprint(vec![Weekday::Mon, Weekday::Wed], "09:00", 0);
        let sessions = expand_sessions(&bp, "sched-1").unwrap();
        let days: Vec<u32> = sessions.iter().map(|s| s.session_time.day()).collect();
        assert_eq!(days, vec![1, 3, 8, 10]);
        for s in &sessions {
            assert_eq!(s.session_time.hour(), 9);
            assert_eq!(s.session_time.minute(), 0);
            assert_eq!(s.session_time.second(), 0);
            assert_eq!(s.schedule_id, "sched-1");
        }
    }

    #[test]
    fn sessions_are_ordered_and_match_requested_weekdays() {
        let bp = blueprint(vec![Weekday::Tue, Weekday::Fri], "14:30", 0);
        let sessions = expand_sessions(&bp, "sched-2").unwrap();
        assert!(!sessions.is_empty());
        for pair in sessions.windows(2) {
            assert!(pair[0].session_time < pair[1].session_time);
        }
        for s in &sessions {
            let wd = s.session_time.weekday();
            assert!(wd == chrono::Weekday::Tue || wd == chrono::Weekday::Fri);
        }
    }

    #[test]
    fn start_time_is_anchored_in_blueprint_offset() {
        // 09:00 at +05:30 is 03:30 UTC.
        let bp = blueprint(vec![Weekday::Mon], "09:00", (5 * 60 + 30) * 60);
        let sessions = expand_sessions(&bp, "s").unwrap();
        assert_eq!(sessions[0].session_time.hour(), 3);
        assert_eq!(sessions[0].session_time.minute(), 30);
    }

    #[test]
    fn empty_weekdays_yield_empty_list() {
        let bp = blueprint(vec![], "09:00", 0);
        assert!(expand_sessions(&bp, "s").unwrap().is_empty());
    }

    #[test]
    fn inverted_range_yields_empty_list() {
        let mut bp = blueprint(vec![Weekday::Mon], "09:00", 0);
        std::mem::swap(&mut bp.start_date, &mut bp.end_date);
        assert!(expand_sessions(&bp, "s").unwrap().is_empty());
    }

    #[test]
    fn malformed_start_times_are_rejected() {
        for bad in ["9am", "24:00", "09:60", "0900", "9", ":30", "aa:bb", "+9:00", "09:+5", " 9:00"] {
            let bp = blueprint(vec![Weekday::Mon], bad, 0);
            let err = expand_sessions(&bp, "s").unwrap_err();
            assert!(matches!(err, CoreError::InvalidTimeFormat(_)), "{bad}");
        }
    }

    #[test]
    fn single_digit_components_parse() {
        let bp = blueprint(vec![Weekday::Mon], "9:05", 0);
        let sessions = expand_sessions(&bp, "s").unwrap();
        assert_eq!(sessions[0].session_time.hour(), 9);
        assert_eq!(sessions[0].session_time.minute(), 5);
    }

    #[tokio::test]
    async fn create_schedule_commits_blueprint_and_sessions_atomically() {
        use crate::store::MemoryStore;

        let store = Arc::new(MemoryStore::new());
        let writer = ScheduleWriter::new(store.clone());
        let bp = blueprint(vec![Weekday::Mon, Weekday::Wed], "09:00", 0);

        let receipt = writer.create_schedule(&bp).await.unwrap();
        assert_eq!(receipt.session_count, 4);
        assert_eq!(store.count(collections::SCHEDULES).await, 1);
        assert_eq!(store.count(collections::SESSIONS).await, 4);
    }

    #[tokio::test]
    async fn create_schedule_failure_leaves_nothing() {
        use crate::store::MemoryStore;

        let store = Arc::new(MemoryStore::new());
        store.fail_next_commit();
        let writer = ScheduleWriter::new(store.clone());
        let bp = blueprint(vec![Weekday::Mon], "09:00", 0);

        let err = writer.create_schedule(&bp).await.unwrap_err();
        assert!(matches!(err, CoreError::BatchWriteFailed(_)));
        assert_eq!(store.count(collections::SCHEDULES).await, 0);
        assert_eq!(store.count(collections::SESSIONS).await, 0);
    }
}
