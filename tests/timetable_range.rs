//! Ranged timetable queries across a student's enrollments.

mod common;

use acadex::aggregate::timetable::sessions_in_range;
use acadex::config::CoreConfig;
use acadex::store::{collections, MemoryStore};

use common::{seed_enrollment, seed_session, ts};

#[tokio::test]
async fn bounds_are_inclusive_and_results_time_sorted() {
    let store = MemoryStore::new();
    seed_enrollment(&store, "e1", "stu-1", "CS101").await;
    seed_enrollment(&store, "e2", "stu-1", "MA101").await;

    let start = ts(2024, 5, 6, 0, 0);
    let end = ts(2024, 5, 10, 23, 59);

    seed_session(&store, "before", "CS101", ts(2024, 5, 5, 9, 0)).await;
    seed_session(&store, "at-start", "CS101", start).await;
    seed_session(&store, "mid", "MA101", ts(2024, 5, 8, 11, 0)).await;
    seed_session(&store, "at-end", "CS101", end).await;
    seed_session(&store, "after", "MA101", ts(2024, 5, 11, 9, 0)).await;
    // In range but not one of the student's courses.
    seed_session(&store, "other", "PH101", ts(2024, 5, 8, 9, 0)).await;

    let sessions = sessions_in_range(&store, &CoreConfig::default(), "stu-1", start, end)
        .await
        .unwrap();

    let times: Vec<_> = sessions.iter().map(|s| s.session_time).collect();
    assert_eq!(times, [start, ts(2024, 5, 8, 11, 0), end]);
    assert!(sessions.iter().all(|s| s.course_code != "PH101"));
}

#[tokio::test]
async fn no_enrollments_short_circuits_the_session_query() {
    let store = MemoryStore::new();

    let sessions = sessions_in_range(
        &store,
        &CoreConfig::default(),
        "stu-1",
        ts(2024, 5, 1, 0, 0),
        ts(2024, 5, 31, 0, 0),
    )
    .await
    .unwrap();

    assert!(sessions.is_empty());
    assert_eq!(store.queries_issued(collections::ENROLLMENTS).await, 1);
    assert_eq!(store.queries_issued(collections::SESSIONS).await, 0);
}

#[tokio::test]
async fn twelve_enrollments_query_sessions_in_two_chunks() {
    let store = MemoryStore::new();
    for i in 1..=12 {
        let code = format!("C{i:02}");
        seed_enrollment(&store, &format!("e{i:02}"), "stu-1", &code).await;
        seed_session(&store, &format!("s{i:02}"), &code, ts(2024, 5, i, 9, 0)).await;
    }

    let sessions = sessions_in_range(
        &store,
        &CoreConfig::default(),
        "stu-1",
        ts(2024, 5, 1, 0, 0),
        ts(2024, 5, 31, 0, 0),
    )
    .await
    .unwrap();

    assert_eq!(sessions.len(), 12);
    assert!(sessions.windows(2).all(|w| w[0].session_time <= w[1].session_time));
    assert_eq!(store.queries_issued(collections::SESSIONS).await, 2);
}

#[tokio::test]
async fn enrollment_failure_aborts_instead_of_returning_empty() {
    let store = MemoryStore::new();
    store.fail_queries_on(collections::ENROLLMENTS).await;

    let err = sessions_in_range(
        &store,
        &CoreConfig::default(),
        "stu-1",
        ts(2024, 5, 1, 0, 0),
        ts(2024, 5, 31, 0, 0),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, acadex::CoreError::QueryFailed(_)));
}
