//! Injectable clock.
//!
//! "Now" feeds two decisions: whether a session counts as past for
//! attendance totals, and the academic-year stamp on new enrollments.

use chrono::{DateTime, Datelike, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar year used for `academicYear` stamping.
    fn academic_year(&self) -> i32 {
        self.now().year()
    }
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a fixed instant, for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
