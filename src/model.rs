//! Wire-compatible document model.
//!
//! Field names mirror the backend schema exactly (camelCase, and the
//! `"sem<N>"` curriculum keys), so decoded documents round-trip against
//! data written by the other clients of the same database.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Weekday as stored in schedule blueprints (`"MON"`..`"SUN"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub fn to_chrono(self) -> chrono::Weekday {
        match self {
            Weekday::Mon => chrono::Weekday::Mon,
            Weekday::Tue => chrono::Weekday::Tue,
            Weekday::Wed => chrono::Weekday::Wed,
            Weekday::Thu => chrono::Weekday::Thu,
            Weekday::Fri => chrono::Weekday::Fri,
            Weekday::Sat => chrono::Weekday::Sat,
            Weekday::Sun => chrono::Weekday::Sun,
        }
    }
}

/// Recurrence rule for a weekly repeating class meeting.
///
/// Immutable once created; superseding a blueprint means writing a new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleBlueprint {
    pub course_code: String,
    pub faculty_id: String,
    pub days_of_week: Vec<Weekday>,
    /// Local clock time in 24-hour `HH:MM`; validated at expansion.
    pub start_time: String,
    pub venue: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// UTC offset the blueprint's dates and start time are anchored to.
    #[serde(with = "offset_format")]
    pub timezone: FixedOffset,
}

/// One concrete dated occurrence materialized from a blueprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInstance {
    pub schedule_id: String,
    pub course_code: String,
    pub faculty_id: String,
    pub session_time: DateTime<Utc>,
    pub venue: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Set later by the faculty side; never written by the expander.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Active,
    Dropped,
    Completed,
}

/// One (student, course) membership record.
///
/// Only ever created alongside its sibling profile write; see
/// [`crate::enrollment::EnrollmentWriter`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub student_id: String,
    pub course_code: String,
    pub program_id: String,
    pub semester: u32,
    pub academic_year: i32,
    pub status: EnrollmentStatus,
}

/// Presence value as found in attendance sub-documents.
///
/// The source data carries three encodings of present/absent; decoding into
/// a tagged union at the store boundary keeps the probing out of the
/// aggregation logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PresenceValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl PresenceValue {
    /// Normalize to a boolean presence flag.
    ///
    /// Strings `"present"`, `"p"`, `"1"` (case-insensitive) are present and
    /// any other string is absent; booleans pass through; numbers are
    /// present iff equal to 1.
    pub fn is_present(&self) -> bool {
        match self {
            PresenceValue::Bool(b) => *b,
            PresenceValue::Number(n) => *n == 1.0,
            PresenceValue::Text(s) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("present") || s.eq_ignore_ascii_case("p") || s == "1"
            }
        }
    }
}

/// Attendance mark nested under a session.
///
/// Three document shapes are legal: the document id carries the student
/// uid, a `studentId` field does, or one roster document holds an
/// `entries` map keyed by uid. All three are matched by the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceMark {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PresenceValue>,
    /// Roster shape: uid -> value, present only on the literal string
    /// `"present"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<HashMap<String, PresenceValue>>,
}

/// Exam roll-up nested under a course; the exam title is the document id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamScoreRecord {
    pub max_points: f64,
    /// studentId -> obtained points.
    pub scores: HashMap<String, f64>,
}

/// Reference data for a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseMeta {
    pub course_code: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub credits: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Faculty,
    Admin,
}

/// Profile document in the `users` collection, keyed by auth uid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub uid: String,
    pub email: String,
    pub role: Role,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub contact_info: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_semester: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Program curriculum blueprint.
///
/// `semesterCourses` is keyed `"sem1"`, `"sem2"`, ... - a deliberate but
/// fragile schema preserved verbatim for compatibility with existing data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub semester_courses: HashMap<String, Vec<String>>,
}

impl Program {
    /// Key under which a 1-based semester's course list is stored.
    pub fn semester_key(semester: u32) -> String {
        format!("sem{semester}")
    }
}

mod offset_format {
    use chrono::FixedOffset;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(offset: &FixedOffset, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&offset.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<FixedOffset, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_string_forms_normalize() {
        for s in ["present", "Present", "P", "p", "1"] {
            assert!(PresenceValue::Text(s.to_string()).is_present(), "{s}");
        }
        for s in ["absent", "0", "", "yes", "late"] {
            assert!(!PresenceValue::Text(s.to_string()).is_present(), "{s}");
        }
    }

    #[test]
    fn presence_bool_and_number_forms() {
        assert!(PresenceValue::Bool(true).is_present());
        assert!(!PresenceValue::Bool(false).is_present());
        assert!(PresenceValue::Number(1.0).is_present());
        assert!(!PresenceValue::Number(0.0).is_present());
        assert!(!PresenceValue::Number(2.0).is_present());
    }

    #[test]
    fn presence_decodes_untagged() {
        let m: AttendanceMark = serde_json::from_value(serde_json::json!({
            "studentId": "u1", "status": true
        }))
        .unwrap();
        assert_eq!(m.status, Some(PresenceValue::Bool(true)));

        let m: AttendanceMark =
            serde_json::from_value(serde_json::json!({ "status": 1 })).unwrap();
        assert_eq!(m.status, Some(PresenceValue::Number(1.0)));
        assert!(m.student_id.is_none());

        let m: AttendanceMark =
            serde_json::from_value(serde_json::json!({ "status": "P" })).unwrap();
        assert!(m.status.unwrap().is_present());
    }

    #[test]
    fn roster_entries_shape_decodes() {
        let m: AttendanceMark = serde_json::from_value(serde_json::json!({
            "entries": { "u1": "present", "u2": "absent" }
        }))
        .unwrap();
        assert!(m.status.is_none());
        let entries = m.entries.unwrap();
        assert_eq!(entries["u1"], PresenceValue::Text("present".into()));
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn blueprint_round_trips_wire_names() {
        let json = serde_json::json!({
            "courseCode": "CS101",
            "facultyId": "fac-1",
            "daysOfWeek": ["MON", "WED"],
            "startTime": "09:00",
            "venue": "Room 501",
            "type": "lecture",
            "startDate": "2024-01-01T00:00:00Z",
            "endDate": "2024-01-10T00:00:00Z",
            "timezone": "+05:30"
        });
        let bp: ScheduleBlueprint = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(bp.days_of_week, vec![Weekday::Mon, Weekday::Wed]);
        assert_eq!(bp.timezone.local_minus_utc(), (5 * 60 + 30) * 60);

        let back = serde_json::to_value(&bp).unwrap();
        assert_eq!(back["type"], "lecture");
        assert_eq!(back["daysOfWeek"][0], "MON");
        assert_eq!(back["timezone"], "+05:30");
    }

    #[test]
    fn semester_key_is_one_based_convention() {
        assert_eq!(Program::semester_key(2), "sem2");
    }
}
