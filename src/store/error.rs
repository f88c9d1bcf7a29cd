//! Error types for the store abstraction layer.

use std::fmt;

use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The store refused the query as written (e.g. oversized `in` set).
    #[error("query rejected: {0}")]
    QueryRejected(String),

    /// A query failed transiently (network, permission, backend).
    #[error("query failed: {0}")]
    Query(String),

    /// An atomic batch commit failed; the store guarantees no partial
    /// application.
    #[error("transaction failed: {0}")]
    Transaction(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn rejected<E: fmt::Display>(msg: E) -> Self {
        Self::QueryRejected(msg.to_string())
    }

    pub fn query<E: fmt::Display>(msg: E) -> Self {
        Self::Query(msg.to_string())
    }

    pub fn transaction<E: fmt::Display>(msg: E) -> Self {
        Self::Transaction(msg.to_string())
    }

    pub fn unavailable<E: fmt::Display>(msg: E) -> Self {
        Self::Unavailable(msg.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
