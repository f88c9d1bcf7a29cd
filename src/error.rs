use thiserror::Error;

use crate::store::StoreError;

/// Errors crossing the crate's public boundary.
///
/// Validation variants are produced before any I/O; store-backed variants
/// wrap the underlying [`StoreError`] verbatim and are never retried here.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("student registration requires a program id")]
    MissingProgram,

    #[error("program not found: {0}")]
    ProgramNotFound(String),

    #[error("program {0} data is corrupt (missing semesterCourses map)")]
    CorruptProgramData(String),

    #[error("no courses defined for sem{semester} in program {program_id}")]
    NoCoursesForSemester { program_id: String, semester: u32 },

    #[error("invalid start time {0:?}: expected 24-hour HH:MM")]
    InvalidTimeFormat(String),

    #[error("batch write failed: {0}")]
    BatchWriteFailed(#[source] StoreError),

    #[error("query failed: {0}")]
    QueryFailed(#[source] StoreError),

    #[error("failed to map {collection} document {id}: {reason}")]
    MappingFailed {
        collection: String,
        id: String,
        reason: String,
    },
}

impl CoreError {
    /// A fetched document could not be decoded into its expected shape.
    pub fn mapping(
        collection: impl Into<String>,
        id: impl Into<String>,
        err: impl std::fmt::Display,
    ) -> Self {
        Self::MappingFailed {
            collection: collection.into(),
            id: id.into(),
            reason: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
