//! Exam-score roll-up and weighted grade average.
//!
//! Scores live as per-exam documents nested under each course, each
//! holding a studentId -> points map. The roll-up fans out per course; a
//! course whose fetch fails contributes nothing instead of aborting the
//! others, and missing course metadata degrades to a default credit
//! weight.

use std::collections::HashMap;

use futures::future::join_all;
use serde::Serialize;
use tracing::warn;

use crate::config::CoreConfig;
use crate::error::{CoreError, Result};
use crate::model::ExamScoreRecord;
use crate::store::{collections, DocumentStore};

use super::lookup::course_meta_by_codes;

/// One exam row for the results table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamScore {
    pub course_code: String,
    pub exam_title: String,
    pub obtained: f64,
    pub max_points: f64,
    pub percentage: f64,
}

/// Grade point on the 0-10 scale derived from a percentage.
pub fn grade_point(percentage: f64) -> f64 {
    (percentage / 10.0).clamp(0.0, 10.0)
}

/// Fetch every exam score recorded for the student across courses.
///
/// Exams the student has no entry in are omitted. A course whose
/// sub-collection fetch fails is logged and contributes no rows.
pub async fn fetch_exam_scores(
    store: &dyn DocumentStore,
    student_id: &str,
    course_codes: &[String],
) -> Result<Vec<ExamScore>> {
    let per_course = course_codes.iter().map(|code| async move {
        let docs = match store
            .query_nested(collections::COURSES, code, collections::EXAM_SCORES, &[])
            .await
        {
            Ok(docs) => docs,
            Err(err) => {
                warn!(course = %code, error = %err, "exam score fetch failed, skipping course");
                return Vec::new();
            }
        };

        let mut rows = Vec::new();
        for doc in docs {
            let record: ExamScoreRecord = match doc.decode() {
                Ok(record) => record,
                Err(err) => {
                    let mapping =
                        CoreError::mapping(collections::EXAM_SCORES, &doc.id, err);
                    warn!(error = %mapping, "skipping malformed exam record");
                    continue;
                }
            };
            if let Some(obtained) = record.scores.get(student_id) {
                rows.push(ExamScore {
                    course_code: code.clone(),
                    exam_title: doc.id,
                    obtained: *obtained,
                    max_points: record.max_points,
                    percentage: if record.max_points > 0.0 {
                        obtained * 100.0 / record.max_points
                    } else {
                        0.0
                    },
                });
            }
        }
        rows
    });

    Ok(join_all(per_course).await.into_iter().flatten().collect())
}

/// Credit-weighted grade average over all scored courses, in `[0, 10]`.
///
/// Per course: `percentage = Σobtained * 100 / max(Σmax, 1)`, grade point
/// clamped to the 0-10 scale, weighted by the course's credits (default
/// applies when metadata is unavailable). Returns 0 when nothing is
/// scored.
pub async fn compute_weighted_average(
    store: &dyn DocumentStore,
    config: &CoreConfig,
    student_id: &str,
    course_codes: &[String],
) -> Result<f64> {
    let scores = fetch_exam_scores(store, student_id, course_codes).await?;
    let meta = match course_meta_by_codes(store, config, course_codes).await {
        Ok(meta) => meta,
        Err(err) => {
            warn!(error = %err, "course meta lookup failed, using default credits");
            HashMap::new()
        }
    };

    // (obtainedSum, maxSum) per course.
    let mut by_course: HashMap<&str, (f64, f64)> = HashMap::new();
    for score in &scores {
        let entry = by_course.entry(score.course_code.as_str()).or_insert((0.0, 0.0));
        entry.0 += score.obtained;
        entry.1 += score.max_points;
    }

    let mut weighted_sum = 0.0;
    let mut total_credits = 0.0;
    for (code, (obtained, max)) in &by_course {
        let percentage = obtained * 100.0 / max.max(1.0);
        let credits = meta
            .get(*code)
            .map(|m| m.credits)
            .unwrap_or(config.default_course_credits) as f64;
        weighted_sum += grade_point(percentage) * credits;
        total_credits += credits;
    }

    if total_credits == 0.0 {
        return Ok(0.0);
    }
    Ok(weighted_sum / total_credits)
}
