//! Shared types for the store abstraction layer.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::error::StoreResult;

/// Collection names, matching the backend schema case exactly.
pub mod collections {
    pub const USERS: &str = "users";
    pub const ENROLLMENTS: &str = "Enrollments";
    pub const PROGRAMS: &str = "programs";
    pub const COURSES: &str = "Courses";
    pub const SCHEDULES: &str = "schedules";
    pub const SESSIONS: &str = "sessions";

    /// Sub-collection of `sessions`.
    pub const ATTENDANCE: &str = "attendance";
    /// Sub-collection of `Courses`.
    pub const EXAM_SCORES: &str = "exam_scores";
}

/// One fetched document: its id plus the raw JSON payload.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Decode the payload into its expected shape.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.clone())
    }

    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Read an RFC 3339 timestamp field.
    pub fn field_time(&self, key: &str) -> Option<DateTime<Utc>> {
        self.field_str(key)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Query predicates supported by the store contract.
///
/// `FieldIn` and `IdIn` are bounded by [`super::traits::IN_QUERY_LIMIT`];
/// larger key sets must go through the chunked planner in [`crate::fetch`].
#[derive(Debug, Clone)]
pub enum Filter {
    FieldEq { field: String, value: String },
    FieldIn { field: String, values: Vec<String> },
    IdIn { ids: Vec<String> },
    TimeAtOrAfter { field: String, value: DateTime<Utc> },
    TimeAtOrBefore { field: String, value: DateTime<Utc> },
}

impl Filter {
    pub fn field_eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::FieldEq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn field_in(field: impl Into<String>, values: Vec<String>) -> Self {
        Self::FieldIn {
            field: field.into(),
            values,
        }
    }

    pub fn id_in(ids: Vec<String>) -> Self {
        Self::IdIn { ids }
    }

    pub fn at_or_after(field: impl Into<String>, value: DateTime<Utc>) -> Self {
        Self::TimeAtOrAfter {
            field: field.into(),
            value,
        }
    }

    pub fn at_or_before(field: impl Into<String>, value: DateTime<Utc>) -> Self {
        Self::TimeAtOrBefore {
            field: field.into(),
            value,
        }
    }
}

/// Pending write operation inside a batch.
#[derive(Debug, Clone)]
pub enum WriteOp {
    Set {
        collection: String,
        /// `None` asks the store to mint a fresh id.
        id: Option<String>,
        data: Value,
    },
}

/// Atomic multi-document write: every operation commits or none does.
#[derive(Debug, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a write at a known document id.
    pub fn set<T: Serialize>(
        &mut self,
        collection: &str,
        id: &str,
        value: &T,
    ) -> StoreResult<()> {
        self.ops.push(WriteOp::Set {
            collection: collection.to_string(),
            id: Some(id.to_string()),
            data: serde_json::to_value(value)?,
        });
        Ok(())
    }

    /// Stage a write with a store-generated id.
    pub fn add<T: Serialize>(&mut self, collection: &str, value: &T) -> StoreResult<()> {
        self.ops.push(WriteOp::Set {
            collection: collection.to_string(),
            id: None,
            data: serde_json::to_value(value)?,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub(crate) fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}
