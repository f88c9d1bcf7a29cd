//! Shared fixtures: a seeded in-memory store and document builders.

#![allow(dead_code)]

use std::sync::Once;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use acadex::store::{collections, MemoryStore};

static TRACING: Once = Once::new();

/// Install a test subscriber once so warn-path assertions show their logs
/// under `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

pub async fn seed_program(store: &MemoryStore, id: &str, sem_key: &str, courses: &[&str]) {
    store
        .insert(
            collections::PROGRAMS,
            id,
            &json!({ "semesterCourses": { sem_key: courses } }),
        )
        .await
        .unwrap();
}

pub async fn seed_user(store: &MemoryStore, uid: &str, name: &str) {
    store
        .insert(
            collections::USERS,
            uid,
            &json!({
                "uid": uid,
                "email": format!("{uid}@example.edu"),
                "role": "student",
                "name": name,
                "createdAt": "2024-01-01T00:00:00Z"
            }),
        )
        .await
        .unwrap();
}

pub async fn seed_course(store: &MemoryStore, code: &str, title: &str, credits: u32) {
    store
        .insert(
            collections::COURSES,
            code,
            &json!({ "courseCode": code, "title": title, "credits": credits }),
        )
        .await
        .unwrap();
}

pub async fn seed_enrollment(store: &MemoryStore, id: &str, student_id: &str, course_code: &str) {
    store
        .insert(
            collections::ENROLLMENTS,
            id,
            &json!({
                "studentId": student_id,
                "courseCode": course_code,
                "programId": "BSC-CS",
                "semester": 2,
                "academicYear": 2024,
                "status": "active"
            }),
        )
        .await
        .unwrap();
}

pub async fn seed_session(store: &MemoryStore, id: &str, course_code: &str, time: DateTime<Utc>) {
    store
        .insert(
            collections::SESSIONS,
            id,
            &json!({
                "scheduleId": "sched-1",
                "courseCode": course_code,
                "facultyId": "fac-1",
                "sessionTime": time.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
                "venue": "Room 501",
                "type": "lecture"
            }),
        )
        .await
        .unwrap();
}

/// Mark whose document id carries the student uid.
pub async fn seed_mark_by_doc_id(
    store: &MemoryStore,
    session_id: &str,
    student_id: &str,
    status: Value,
) {
    store
        .insert_nested(
            collections::SESSIONS,
            session_id,
            collections::ATTENDANCE,
            student_id,
            &json!({ "status": status }),
        )
        .await
        .unwrap();
}

/// Mark stored under an arbitrary id with a `studentId` field.
pub async fn seed_mark_by_field(
    store: &MemoryStore,
    session_id: &str,
    doc_id: &str,
    student_id: &str,
    status: Value,
) {
    store
        .insert_nested(
            collections::SESSIONS,
            session_id,
            collections::ATTENDANCE,
            doc_id,
            &json!({ "studentId": student_id, "status": status }),
        )
        .await
        .unwrap();
}

/// Roster-shaped mark: one document holding a uid -> value map.
pub async fn seed_mark_roster(
    store: &MemoryStore,
    session_id: &str,
    doc_id: &str,
    entries: &[(&str, &str)],
) {
    let entries: serde_json::Map<String, Value> = entries
        .iter()
        .map(|(uid, status)| (uid.to_string(), json!(status)))
        .collect();
    store
        .insert_nested(
            collections::SESSIONS,
            session_id,
            collections::ATTENDANCE,
            doc_id,
            &json!({ "entries": entries }),
        )
        .await
        .unwrap();
}

pub async fn seed_exam(
    store: &MemoryStore,
    course_code: &str,
    exam_title: &str,
    max_points: f64,
    scores: &[(&str, f64)],
) {
    let scores: serde_json::Map<String, Value> = scores
        .iter()
        .map(|(uid, points)| (uid.to_string(), json!(points)))
        .collect();
    store
        .insert_nested(
            collections::COURSES,
            course_code,
            collections::EXAM_SCORES,
            exam_title,
            &json!({ "maxPoints": max_points, "scores": scores }),
        )
        .await
        .unwrap();
}
