//! # Acadex
//!
//! Aggregation core for an academic-records application backed by a hosted
//! document database. The surrounding app shell (UI, auth flows, file
//! uploads, single-document CRUD) lives elsewhere; this crate owns the parts
//! that actually compute:
//!
//! - expanding weekly schedule blueprints into concrete dated sessions
//! - atomically writing a student profile together with its enrollments
//! - scatter-gather aggregation over a batch-limited remote query interface
//!   (attendance statistics, weighted grade averages, bulk lookups)
//!
//! ## Modules
//!
//! - `store` - Document-store abstraction layer with an in-memory backend
//! - `model` - Wire-compatible document model (camelCase serde)
//! - `schedule` - Recurrence expander and atomic schedule writer
//! - `enrollment` - Atomic profile + enrollment batch writer
//! - `fetch` - Chunked query planner for batch-limited `in` queries
//! - `aggregate` - Attendance, grade, lookup, and timetable aggregators
//! - `clock` - Injectable clock for "now" decisions and year stamping
//! - `config` - Read-only runtime configuration

pub mod aggregate;
pub mod clock;
pub mod config;
pub mod enrollment;
pub mod error;
pub mod fetch;
pub mod model;
pub mod schedule;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::CoreConfig;
pub use error::{CoreError, Result};
