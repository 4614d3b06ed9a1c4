//! Attendance aggregate: daily session records and validation.

mod record;
mod validation;

pub use record::{AttendanceDraft, AttendanceRecord, GeoPoint, SessionMark};
pub use validation::AttendanceValidationError;

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
